use std::fmt;

use crate::error::{Error, Result};

/// Stone color of an intersection or a move.
///
/// Variant order is the ordinal used when sorting move lists.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Color {
    #[default]
    Empty,
    Black,
    White,
}

impl Color {
    /// The other player's color. `Empty` stays `Empty`.
    pub fn opposite(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
            Color::Empty => Color::Empty,
        }
    }

    /// Map a move or placement property tag to the color it plays.
    ///
    /// `B`/`AB` are black and `W`/`AW` are white; any other tag is an error.
    pub fn from_sgf_prop(tag: &str) -> Result<Color> {
        match tag {
            "B" | "AB" => Ok(Color::Black),
            "W" | "AW" => Ok(Color::White),
            _ => Err(Error::Conversion(format!("no color for property {tag:?}"))),
        }
    }

    /// The move-property tag for this color (`B` or `W`).
    pub fn move_tag(self) -> Option<&'static str> {
        match self {
            Color::Black => Some("B"),
            Color::White => Some("W"),
            Color::Empty => None,
        }
    }

    /// The placement-property tag for this color (`AB` or `AW`).
    pub fn placement_tag(self) -> Option<&'static str> {
        match self {
            Color::Black => Some("AB"),
            Color::White => Some("AW"),
            Color::Empty => None,
        }
    }

    /// Single-character form used by board dumps.
    pub fn as_char(self) -> char {
        match self {
            Color::Black => 'B',
            Color::White => 'W',
            Color::Empty => '.',
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}
