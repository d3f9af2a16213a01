//! Root-only game metadata: board size, komi, initial player and ranks.

use std::fmt;
use std::str::FromStr;

use crate::color::Color;
use crate::constants::{DEFAULT_BOARD_SIZE, MAX_BOARD_SIZE, MIN_BOARD_SIZE};
use crate::error::PropertyError;

#[derive(Clone, Debug, PartialEq)]
pub struct GameInfo {
    pub size: usize,
    pub komi: Option<Komi>,
    pub initial_player: Option<Color>,
    pub black_rank: Option<Rank>,
    pub white_rank: Option<Rank>,
}

impl Default for GameInfo {
    fn default() -> Self {
        Self {
            size: DEFAULT_BOARD_SIZE,
            komi: None,
            initial_player: None,
            black_rank: None,
            white_rank: None,
        }
    }
}

/// Parse an `SZ` value.
pub fn parse_size(s: &str) -> Result<usize, PropertyError> {
    match s.trim().parse::<usize>() {
        Ok(n) if (MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&n) => Ok(n),
        _ => Err(PropertyError::BoardSize(s.to_string())),
    }
}

/// Parse a `PL` value.
pub fn parse_initial_player(s: &str) -> Result<Color, PropertyError> {
    match s.trim() {
        "B" | "b" => Ok(Color::Black),
        "W" | "w" => Ok(Color::White),
        _ => Err(PropertyError::InitialPlayer(s.to_string())),
    }
}

/// Komi, stored in half points so only `.0` and `.5` are representable.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Komi {
    halves: i32,
}

impl Komi {
    pub fn from_halves(halves: i32) -> Self {
        Komi { halves }
    }

    pub fn value(&self) -> f64 {
        self.halves as f64 / 2.0
    }
}

impl FromStr for Komi {
    type Err = PropertyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || PropertyError::Komi(s.to_string());
        let t = s.trim();
        let (neg, digits) = match t.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, t),
        };
        let (whole, frac) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };
        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad());
        }
        let whole: i32 = whole.parse().map_err(|_| bad())?;
        let half = match frac.trim_end_matches('0') {
            "" => 0,
            "5" => 1,
            _ => return Err(bad()),
        };
        if !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad());
        }
        let halves = whole.checked_mul(2).and_then(|h| h.checked_add(half)).ok_or_else(bad)?;
        Ok(Komi::from_halves(if neg { -halves } else { halves }))
    }
}

impl fmt::Display for Komi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.halves < 0 { "-" } else { "" };
        let abs = self.halves.abs();
        let frac = if abs % 2 == 0 { "0" } else { "5" };
        write!(f, "{sign}{}.{frac}", abs / 2)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RankKind {
    Kyu,
    Dan,
    Pro,
}

/// A player rank such as `5k`, `3d` or `9p`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rank {
    pub kind: RankKind,
    pub value: u8,
}

impl FromStr for Rank {
    type Err = PropertyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || PropertyError::Rank(s.to_string());
        let t = s.trim();
        let suffix = t.chars().last().ok_or_else(bad)?;
        let digits = &t[..t.len() - suffix.len_utf8()];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad());
        }
        let value: u8 = digits.parse().map_err(|_| bad())?;
        let (kind, max) = match suffix.to_ascii_lowercase() {
            'k' => (RankKind::Kyu, 30),
            'd' => (RankKind::Dan, 9),
            'p' => (RankKind::Pro, 9),
            _ => return Err(bad()),
        };
        if value == 0 || value > max {
            return Err(bad());
        }
        Ok(Rank { kind, value })
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = match self.kind {
            RankKind::Kyu => 'k',
            RankKind::Dan => 'd',
            RankKind::Pro => 'p',
        };
        write!(f, "{}{suffix}", self.value)
    }
}
