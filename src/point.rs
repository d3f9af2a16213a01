//! Board coordinates and their SGF-letter form.
//!
//! Points are 0-indexed from the top-left corner. SGF writes each axis as one
//! letter from `a`..`z` followed by `A`..`Z`, so only coordinates `0..=51`
//! have a textual form.

use std::fmt;

use crate::constants::{MAX_SGF_COORD, SGF_ALPHABET};
use crate::error::{Error, Result};

/// An immutable board coordinate.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }

    /// Parse a two-letter SGF coordinate such as `pd`.
    pub fn from_sgf(s: &str) -> Result<Point> {
        let chars: Vec<char> = s.chars().collect();
        if chars.len() != 2 {
            return Err(Error::Conversion(format!("sgf point {s:?} must be exactly 2 characters")));
        }
        let index = |c: char| {
            letter_index(c)
                .ok_or_else(|| Error::Conversion(format!("bad sgf letter {c:?} in {s:?}")))
        };
        Ok(Point::new(index(chars[0])?, index(chars[1])?))
    }

    /// Render this point as a two-letter SGF coordinate.
    pub fn to_sgf(&self) -> Result<String> {
        let mut out = String::with_capacity(2);
        for v in [self.x, self.y] {
            if !(0..=MAX_SGF_COORD).contains(&v) {
                return Err(Error::Conversion(format!(
                    "{self} has no sgf form, coordinates must be in 0..={MAX_SGF_COORD}"
                )));
            }
            out.push(SGF_ALPHABET[v as usize] as char);
        }
        Ok(out)
    }
}

fn letter_index(c: char) -> Option<i32> {
    match c {
        'a'..='z' => Some(c as i32 - 'a' as i32),
        'A'..='Z' => Some(c as i32 - 'A' as i32 + 26),
        _ => None,
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}
