//! Turning a position in a game into a stand-alone problem.

use tracing::debug;

use crate::board::Board;
use crate::error::Result;
use crate::movetree::{MoveTree, Node};
use crate::serializer::serialize;
use crate::treepath::Treepath;

/// Number of trailing path indices dropped before replaying: the blunder
/// and the reply it was judged against.
pub const FLATTEN_BACKOFF: usize = 2;

/// Replay `path` minus its last two indices and capture the result as a
/// single-node tree of setup stones.
///
/// The new root copies the source root's game info and raw properties.
pub fn flatten(tree: &MoveTree, path: &Treepath) -> Result<(Board, MoveTree)> {
    let source = tree.node(tree.root());
    let info = tree.game_info();
    let cut = path.truncated(FLATTEN_BACKOFF);
    let (board, _) = cut.apply_to_board(tree, tree.root(), &Board::new(info.size))?;

    let mut root = Node::new();
    root.game_info = source.game_info.clone();
    root.sgf_properties = source.sgf_properties.clone();
    root.placements = board.stone_state();
    debug!(path = %path, cut = %cut, stones = root.placements.len(), "flattened position");

    Ok((board, MoveTree::with_root(root)))
}

/// [`flatten`], then serialize the problem tree.
pub fn flatten_to_sgf(tree: &MoveTree, path: &Treepath) -> Result<String> {
    let (_, problem) = flatten(tree, path)?;
    serialize(&problem)
}
