//! Kifu: SGF game records for Go.
//!
//! This crate reads and writes Smart Game Format records, navigates their
//! move trees with compact treepaths, and replays positions on a board that
//! enforces captures, suicide and ko.
//!
//! ## Modules
//!
//! - [`point`], [`color`], [`moves`] - Coordinates, stone colors and moves
//! - [`board`] - Board engine with capture, suicide and ko rules
//! - [`movetree`] - Arena-backed branching move tree
//! - [`treepath`] - Addresses into a move tree and board replay
//! - [`parser`], [`serializer`], [`props`] - SGF text in and out
//! - [`analysis`], [`problems`] - Attached engine analysis, blunders and
//!   flattened problem positions
//!
//! ## Example
//!
//! ```
//! use kifu::board::Board;
//! use kifu::parser::parse;
//! use kifu::treepath::Treepath;
//!
//! let tree = parse("(;GM[1];B[pd];W[dd];B[qp])").unwrap();
//! let path: Treepath = "0:3".parse().unwrap();
//! let (board, captures) = path
//!     .apply_to_board(&tree, tree.root(), &Board::new(19))
//!     .unwrap();
//! assert_eq!(board.stone_state().len(), 3);
//! assert!(captures.is_empty());
//! ```

pub mod analysis;
pub mod board;
pub mod color;
pub mod config;
pub mod constants;
pub mod error;
pub mod game_info;
pub mod moves;
pub mod movetree;
pub mod parser;
pub mod point;
pub mod problems;
pub mod props;
pub mod serializer;
pub mod treepath;

pub use error::{Error, Result};
