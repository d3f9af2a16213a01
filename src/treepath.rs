//! Treepaths: addresses into a move tree as a list of child indices.
//!
//! The string form is a dotted list of indices where `N:k` stands for the
//! index `N` repeated `k` times, so `0:4` is `[0, 0, 0, 0]` and
//! `1.2:1.0.3:3` is `[1, 2, 0, 3, 3, 3]`. An optional leading `.` is
//! accepted and the empty path is written `.`.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::board::Board;
use crate::color::Color;
use crate::constants::MAX_TREEPATH_LEN;
use crate::error::{Error, Result, TreepathError};
use crate::moves::{MoveList, sort_moves};
use crate::movetree::{MoveTree, NodeId};

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Treepath(Vec<usize>);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum PathState {
    Variation,
    Repeat,
}

impl Treepath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, index: usize) {
        self.0.push(index);
    }

    /// Parse a path string.
    pub fn parse(s: &str) -> Result<Treepath, TreepathError> {
        let mut out = Vec::new();
        let mut state = PathState::Variation;
        let mut buf = String::new();
        let mut repeated: Option<usize> = None;
        // Set once a `.` has closed a segment, so another segment must follow.
        let mut needs_segment = false;

        let chars = s.char_indices().map(|(i, c)| (i, Some(c)));
        for (index, ch) in chars.chain(std::iter::once((s.len(), None))) {
            match (state, ch) {
                (_, Some(c)) if c.is_ascii_digit() => buf.push(c),

                (PathState::Variation, Some('.')) => {
                    if buf.is_empty() {
                        // Only a leading dot may stand alone.
                        if index != 0 {
                            return Err(TreepathError::Separator { ch: '.', index });
                        }
                    } else {
                        out.push(parse_number(&buf, index)?);
                        buf.clear();
                        needs_segment = true;
                    }
                }
                (PathState::Variation, Some(':')) => {
                    if buf.is_empty() {
                        return Err(TreepathError::Separator { ch: ':', index });
                    }
                    repeated = Some(parse_number(&buf, index)?);
                    buf.clear();
                    state = PathState::Repeat;
                }
                (PathState::Variation, None) => {
                    if !buf.is_empty() {
                        out.push(parse_number(&buf, index)?);
                    } else if needs_segment {
                        return Err(TreepathError::Separator { ch: '.', index });
                    }
                }

                (PathState::Repeat, Some(':')) => {
                    return Err(TreepathError::Separator { ch: ':', index });
                }
                (PathState::Repeat, Some('.') | None) => {
                    if buf.is_empty() {
                        return Err(TreepathError::Separator { ch: ch.unwrap_or('.'), index });
                    }
                    let count = parse_number(&buf, index)?;
                    buf.clear();
                    if let Some(v) = repeated.take() {
                        match out.len().checked_add(count) {
                            Some(len) if len <= MAX_TREEPATH_LEN => {
                                out.extend(std::iter::repeat_n(v, count))
                            }
                            _ => {
                                return Err(TreepathError::TooLong {
                                    index,
                                    max: MAX_TREEPATH_LEN,
                                });
                            }
                        }
                    }
                    needs_segment = ch.is_some();
                    state = PathState::Variation;
                }

                (_, Some(c)) => return Err(TreepathError::UnexpectedChar { ch: c, index }),
            }
        }
        Ok(Treepath(out))
    }

    /// Render with runs of two or more equal indices collapsed to `N:count`.
    pub fn compact_string(&self) -> String {
        if self.0.is_empty() {
            return ".".to_string();
        }
        let mut out = String::new();
        let mut i = 0;
        while i < self.0.len() {
            let v = self.0[i];
            let mut run = 1;
            while i + run < self.0.len() && self.0[i + run] == v {
                run += 1;
            }
            out.push('.');
            if run > 1 {
                out.push_str(&format!("{v}:{run}"));
            } else {
                out.push_str(&v.to_string());
            }
            i += run;
        }
        out
    }

    /// This path without its last `n` indices.
    pub fn truncated(&self, n: usize) -> Treepath {
        let keep = self.0.len().saturating_sub(n);
        Treepath(self.0[..keep].to_vec())
    }

    /// Follow the path from `start`, stopping at the deepest node that exists.
    pub fn apply(&self, tree: &MoveTree, start: NodeId) -> NodeId {
        let mut current = start;
        for (step, &variation) in self.0.iter().enumerate() {
            match tree.next(current, variation) {
                Some(next) => current = next,
                None => {
                    debug!(path = %self, step, "treepath overran the tree");
                    break;
                }
            }
        }
        current
    }

    /// Replay the path from `start` onto a copy of `board`.
    ///
    /// The start node is always applied; after that each index picks the
    /// next child to apply. Returns the resulting board and every capture
    /// made along the way, sorted.
    pub fn apply_to_board(
        &self,
        tree: &MoveTree,
        start: NodeId,
        board: &Board,
    ) -> Result<(Board, MoveList)> {
        self.replay(tree, start, board, false)
    }

    /// Like [`Treepath::apply_to_board`] but setup stones must leave every
    /// group with a liberty.
    pub fn apply_to_board_strict(
        &self,
        tree: &MoveTree,
        start: NodeId,
        board: &Board,
    ) -> Result<(Board, MoveList)> {
        self.replay(tree, start, board, true)
    }

    fn replay(
        &self,
        tree: &MoveTree,
        start: NodeId,
        board: &Board,
        strict: bool,
    ) -> Result<(Board, MoveList)> {
        let mut board = board.clone();
        let mut captures = MoveList::new();
        let mut current = Some(start);
        let mut step = 0;

        while let Some(id) = current {
            let node = tree.node(id);
            let wrap = |e: Error| Error::Replay {
                step,
                move_num: node.move_num(),
                source: Box::new(e),
            };

            if !node.placements.is_empty() {
                let placed = if strict {
                    board.set_placements_strict(&node.placements)
                } else {
                    board.set_placements(&node.placements)
                };
                placed.map_err(wrap)?;
            }
            if let Some(mv) = node.mv.filter(|m| m.color() != Color::Empty) {
                let caps = board.place_stone(&mv).map_err(wrap)?;
                captures.extend(caps);
            }

            current = match self.0.get(step) {
                Some(&variation) => tree.next(id, variation),
                None => None,
            };
            step += 1;
        }

        sort_moves(&mut captures);
        Ok((board, captures))
    }
}

fn parse_number(buf: &str, index: usize) -> Result<usize, TreepathError> {
    buf.parse::<usize>()
        .map_err(|_| TreepathError::Overflow { index })
}

impl From<Vec<usize>> for Treepath {
    fn from(v: Vec<usize>) -> Self {
        Treepath(v)
    }
}

impl FromStr for Treepath {
    type Err = TreepathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Treepath::parse(s)
    }
}

impl fmt::Display for Treepath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.compact_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MoveError;
    use crate::moves::Move;
    use crate::movetree::Node;
    use crate::point::Point;

    fn path(s: &str) -> Vec<usize> {
        Treepath::parse(s).unwrap().indices().to_vec()
    }

    #[test]
    fn test_parse_examples() {
        assert_eq!(path("0:4"), vec![0, 0, 0, 0]);
        assert_eq!(path("1.2:1.0.3:3"), vec![1, 2, 0, 3, 3, 3]);
        assert_eq!(path(""), Vec::<usize>::new());
        assert_eq!(path("."), Vec::<usize>::new());
        assert_eq!(path(".1.2"), vec![1, 2]);
        assert_eq!(path("12"), vec![12]);
        assert_eq!(path("0:0"), Vec::<usize>::new());
    }

    #[test]
    fn test_parse_separator_errors() {
        assert!(matches!(
            Treepath::parse("1::2"),
            Err(TreepathError::Separator { ch: ':', .. })
        ));
        assert!(matches!(
            Treepath::parse("1..2"),
            Err(TreepathError::Separator { ch: '.', .. })
        ));
        for bad in ["..", ":", ":3", "1.", "1:", "1:2:3", "1:."] {
            assert!(
                matches!(Treepath::parse(bad), Err(TreepathError::Separator { .. })),
                "{bad:?} should fail with a separator error"
            );
        }
    }

    #[test]
    fn test_parse_unexpected_chars() {
        assert_eq!(
            Treepath::parse("-1"),
            Err(TreepathError::UnexpectedChar { ch: '-', index: 0 })
        );
        assert_eq!(
            Treepath::parse("1.a"),
            Err(TreepathError::UnexpectedChar { ch: 'a', index: 2 })
        );
        assert!(Treepath::parse("99999999999999999999999").is_err());
    }

    #[test]
    fn test_parse_rejects_huge_repeats() {
        assert_eq!(
            Treepath::parse("0:1152921504606846976"),
            Err(TreepathError::TooLong {
                index: 21,
                max: MAX_TREEPATH_LEN,
            })
        );
        assert!(matches!(
            Treepath::parse("0:99999999999"),
            Err(TreepathError::TooLong { .. })
        ));
        // The limit applies to the whole path, not each repeat.
        let half = MAX_TREEPATH_LEN / 2 + 1;
        assert!(matches!(
            Treepath::parse(&format!("0:{half}.1:{half}")),
            Err(TreepathError::TooLong { .. })
        ));
        let path = Treepath::parse(&format!("0:{MAX_TREEPATH_LEN}")).unwrap();
        assert_eq!(path.len(), MAX_TREEPATH_LEN);
    }

    #[test]
    fn test_compact_string() {
        assert_eq!(Treepath::new().compact_string(), ".");
        assert_eq!(Treepath::from(vec![0, 0, 0, 0]).compact_string(), ".0:4");
        assert_eq!(
            Treepath::from(vec![1, 2, 0, 3, 3, 3]).compact_string(),
            ".1.2.0.3:3"
        );
        assert_eq!(Treepath::from(vec![10]).compact_string(), ".10");
    }

    #[test]
    fn test_compact_string_inverse_random() {
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..500 {
            let len = rng.usize(0..30);
            let p = Treepath::from((0..len).map(|_| rng.usize(0..4)).collect::<Vec<_>>());
            assert_eq!(Treepath::parse(&p.compact_string()).unwrap(), p, "{p}");
        }
    }

    #[test]
    fn test_truncated() {
        let p = Treepath::from(vec![0, 1, 2]);
        assert_eq!(p.truncated(2), Treepath::from(vec![0]));
        assert_eq!(p.truncated(5), Treepath::new());
    }

    fn sample_tree() -> MoveTree {
        // root -> B(3,3) -> W(15,15)
        //              \-> W(4,4)
        let mut tree = MoveTree::new();
        let root = tree.root();
        let mut n = Node::new();
        n.mv = Some(Move::new(Color::Black, Point::new(3, 3)));
        let a = tree.add_child(root, n);
        let mut n = Node::new();
        n.mv = Some(Move::new(Color::White, Point::new(15, 15)));
        tree.add_child(a, n);
        let mut n = Node::new();
        n.mv = Some(Move::new(Color::White, Point::new(4, 4)));
        tree.add_child(a, n);
        tree
    }

    #[test]
    fn test_apply_stops_at_deepest_node() {
        let tree = sample_tree();
        let root = tree.root();
        let target = Treepath::parse("0.1").unwrap().apply(&tree, root);
        assert_eq!(tree.node(target).var_num(), 1);
        assert_eq!(tree.node(target).move_num(), 2);

        let overrun = Treepath::parse("0.1.0.0").unwrap().apply(&tree, root);
        assert_eq!(overrun, target);

        let bad_variation = Treepath::parse("0.5").unwrap().apply(&tree, root);
        assert_eq!(tree.node(bad_variation).move_num(), 1);
    }

    #[test]
    fn test_apply_to_board_visits_start_node() {
        let tree = sample_tree();
        let board = Board::new(19);
        let (empty_path_board, _) = Treepath::new()
            .apply_to_board(&tree, tree.root(), &board)
            .unwrap();
        assert!(empty_path_board.stone_state().is_empty());

        let (one, _) = Treepath::parse("0")
            .unwrap()
            .apply_to_board(&tree, tree.root(), &board)
            .unwrap();
        assert_eq!(one.stone_state().len(), 1);

        let (two, caps) = Treepath::parse("0.1")
            .unwrap()
            .apply_to_board(&tree, tree.root(), &board)
            .unwrap();
        assert_eq!(
            two.stone_state(),
            vec![
                Move::new(Color::Black, Point::new(3, 3)),
                Move::new(Color::White, Point::new(4, 4)),
            ]
        );
        assert!(caps.is_empty());
        assert!(board.stone_state().is_empty(), "input board must not change");
    }

    #[test]
    fn test_apply_to_board_collects_captures() {
        let mut tree = MoveTree::new();
        let root = tree.root();
        tree.node_mut(root).placements = vec![
            Move::new(Color::White, Point::new(0, 0)),
            Move::new(Color::Black, Point::new(1, 0)),
        ];
        let mut n = Node::new();
        n.mv = Some(Move::new(Color::Black, Point::new(0, 1)));
        tree.add_child(root, n);

        let (board, caps) = Treepath::parse("0")
            .unwrap()
            .apply_to_board(&tree, tree.root(), &Board::new(9))
            .unwrap();
        assert_eq!(caps, vec![Move::new(Color::White, Point::new(0, 0))]);
        assert_eq!(board.get(Point::new(0, 0)), Some(Color::Empty));
    }

    #[test]
    fn test_apply_to_board_reports_failing_step() {
        let mut tree = MoveTree::new();
        let root = tree.root();
        let mut n = Node::new();
        n.mv = Some(Move::new(Color::Black, Point::new(3, 3)));
        let a = tree.add_child(root, n);
        let mut n = Node::new();
        n.mv = Some(Move::new(Color::White, Point::new(3, 3)));
        tree.add_child(a, n);

        let err = Treepath::parse("0.0")
            .unwrap()
            .apply_to_board(&tree, root, &Board::new(19))
            .unwrap_err();
        match err {
            Error::Replay { step, move_num, source } => {
                assert_eq!(step, 2);
                assert_eq!(move_num, 2);
                assert_eq!(
                    *source,
                    Error::IllegalMove(MoveError::Occupied(Point::new(3, 3)))
                );
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_strict_replay_rejects_dead_setup() {
        let mut tree = MoveTree::new();
        let root = tree.root();
        tree.node_mut(root).placements = vec![
            Move::new(Color::Black, Point::new(1, 0)),
            Move::new(Color::Black, Point::new(0, 1)),
            Move::new(Color::White, Point::new(0, 0)),
        ];
        let board = Board::new(9);
        assert!(Treepath::new().apply_to_board(&tree, root, &board).is_ok());
        assert!(matches!(
            Treepath::new().apply_to_board_strict(&tree, root, &board),
            Err(Error::Replay { .. })
        ));
    }
}
