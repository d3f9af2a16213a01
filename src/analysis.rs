//! Engine analysis attached to tree nodes, and blunder detection over it.
//!
//! The analysis engine itself lives elsewhere; this module only defines the
//! shapes its results may take and reads them back off the main branch.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::color::Color;
use crate::movetree::MoveTree;
use crate::treepath::Treepath;

/// Evaluation of the position after a move.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoveScore {
    /// Black's win probability in `[0, 1]`.
    pub winrate: f64,
    /// Expected final score from Black's point of view.
    #[serde(default)]
    pub score_lead: f64,
    #[serde(default)]
    pub visits: u32,
}

/// Opaque per-node analysis payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisData {
    Score(MoveScore),
    Raw(serde_json::Value),
}

impl AnalysisData {
    pub fn score(&self) -> Option<&MoveScore> {
        match self {
            AnalysisData::Score(s) => Some(s),
            AnalysisData::Raw(_) => None,
        }
    }
}

/// One analysis record keyed by turn number, as read from JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurnAnalysis {
    pub move_num: usize,
    #[serde(flatten)]
    pub data: AnalysisData,
}

/// Attach each record to the main-branch node at its turn number.
///
/// Returns how many records found a node.
pub fn attach_all(tree: &mut MoveTree, records: Vec<TurnAnalysis>) -> usize {
    let mut attached = 0;
    for rec in records {
        let move_num = rec.move_num;
        if tree.attach_analysis(move_num, rec.data) {
            attached += 1;
        } else {
            debug!(move_num, "no main-branch node for analysis");
        }
    }
    attached
}

/// A main-branch move after which the mover's win rate fell sharply.
#[derive(Clone, Debug, PartialEq)]
pub struct Blunder {
    pub move_num: usize,
    pub color: Color,
    /// Win-rate lost by the mover, in `(threshold, 1]`.
    pub delta: f64,
    /// Address of the reply to the blunder, for flattening.
    pub path: Treepath,
}

/// Walk the main branch and report moves that lost more than `threshold`.
///
/// Only consecutive nodes that both carry [`AnalysisData::Score`] are
/// compared; the later node must hold a non-pass move.
pub fn find_blunders(tree: &MoveTree, threshold: f64) -> Vec<Blunder> {
    let mut out = Vec::new();
    let mut prev: Option<f64> = None;
    tree.traverse_main_branch(tree.root(), |_, node| {
        let score = node.analysis_data().and_then(|a| a.score()).map(|s| s.winrate);
        if let (Some(before), Some(after), Some(mv)) = (prev, score, node.mv) {
            let delta = match mv.color() {
                Color::Black => before - after,
                Color::White => after - before,
                Color::Empty => 0.0,
            };
            if delta > threshold {
                out.push(Blunder {
                    move_num: node.move_num(),
                    color: mv.color(),
                    delta,
                    path: Treepath::from(vec![0; node.move_num() + 1]),
                });
            }
        }
        prev = score;
    });
    out
}
