//! Error types shared across the crate.
//!
//! Every fallible operation returns [`Result`]. Board legality failures are
//! [`MoveError`], SGF syntax failures are [`ParseError`], treepath grammar
//! failures are [`TreepathError`] and typed-property failures are
//! [`PropertyError`]. They all convert into the top-level [`Error`].

use std::fmt;

use thiserror::Error;

use crate::point::Point;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("coordinate conversion error: {0}")]
    Conversion(String),

    #[error("illegal move: {0}")]
    IllegalMove(#[from] MoveError),

    #[error("invalid board state: captured on arrival at {}", format_points(.0))]
    InvalidBoardState(Vec<Point>),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("treepath error: {0}")]
    Treepath(#[from] TreepathError),

    #[error("property error: {0}")]
    Property(#[from] PropertyError),

    #[error("replay failed at step {step} (move {move_num}): {source}")]
    Replay {
        step: usize,
        move_num: usize,
        source: Box<Error>,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

/// Reasons the board engine refuses a stone.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error("{point} is outside the {size}x{size} board")]
    OutOfBounds { point: Point, size: usize },

    #[error("{0} is already occupied")]
    Occupied(Point),

    #[error("{0} is suicide")]
    Suicide(Point),

    #[error("{0} retakes ko")]
    Ko(Point),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreepathError {
    #[error("unexpected character {ch:?} at index {index}")]
    UnexpectedChar { ch: char, index: usize },

    #[error("malformed separator {ch:?} at index {index}")]
    Separator { ch: char, index: usize },

    #[error("number too large at index {index}")]
    Overflow { index: usize },

    #[error("path longer than {max} indices at index {index}")]
    TooLong { index: usize, max: usize },
}

/// Typed-property conversion failures, owned by the converter registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PropertyError {
    #[error("{key}: expected a value")]
    MissingValue { key: String },

    #[error("{key}: expected exactly one value, got {count}")]
    TooManyValues { key: String, count: usize },

    #[error("node already has a move, cannot add {key}")]
    DuplicateMove { key: String },

    #[error("board size {0} is outside 1..=25")]
    BoardSize(String),

    #[error("komi {0} must end in .0 or .5")]
    Komi(String),

    #[error("initial player must be B or W, got {0:?}")]
    InitialPlayer(String),

    #[error("malformed rank {0:?}")]
    Rank(String),

    #[error("{key}: {message}")]
    Value { key: String, message: String },
}

/// Parser states, reported in every [`ParseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    Beginning,
    Between,
    Property,
    PropertyData,
}

impl fmt::Display for ParserState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParserState::Beginning => "beginning",
            ParserState::Between => "between",
            ParserState::Property => "property",
            ParserState::PropertyData => "propertyData",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    UnexpectedChar,
    EmptyVariation,
    PropertyWithoutKey,
    TrailingInput,
    UnexpectedEnd,
    Property(PropertyError),
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::UnexpectedChar => f.write_str("unexpected character"),
            ParseErrorKind::EmptyVariation => f.write_str("empty variation"),
            ParseErrorKind::PropertyWithoutKey => f.write_str("property data without a key"),
            ParseErrorKind::TrailingInput => f.write_str("input after end of game tree"),
            ParseErrorKind::UnexpectedEnd => f.write_str("unexpected end of input"),
            ParseErrorKind::Property(e) => write!(f, "{e}"),
        }
    }
}

/// A fatal SGF syntax error with the position it occurred at.
#[derive(Error, Debug, Clone, PartialEq)]
#[error(
    "sgf parse error: {kind} in state {state} at index {index} (line {line}, column {column}), char {}",
    describe_char(.ch)
)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub state: ParserState,
    /// Byte offset into the input.
    pub index: usize,
    pub line: usize,
    pub column: usize,
    /// `None` at end of input.
    pub ch: Option<char>,
}

fn describe_char(ch: &Option<char>) -> String {
    match ch {
        Some(c) => format!("{c:?}"),
        None => "<eof>".to_string(),
    }
}

fn format_points(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
