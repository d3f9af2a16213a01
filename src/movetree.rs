//! Branching move tree.
//!
//! Nodes live in an arena owned by [`MoveTree`] and refer to each other by
//! [`NodeId`]. A node owns its children through the tree; the parent link is
//! a plain index used only for lookups.

use std::collections::{BTreeMap, VecDeque};

use crate::analysis::AnalysisData;
use crate::constants::DEFAULT_HEADER;
use crate::game_info::GameInfo;
use crate::moves::{Move, MoveList};

/// Index of a node inside its [`MoveTree`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One position in the game record.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Node {
    move_num: usize,
    var_num: usize,
    parent: Option<NodeId>,
    children: Vec<NodeId>,

    pub mv: Option<Move>,
    /// Setup stones, applied without capture rules.
    pub placements: MoveList,
    pub comment: Option<String>,
    /// Only set on the root.
    pub game_info: Option<GameInfo>,
    /// Properties with no typed converter, keyed by property tag.
    pub sgf_properties: BTreeMap<String, Vec<String>>,

    analysis: Option<AnalysisData>,
}

impl Node {
    pub fn new() -> Self {
        Self::default()
    }

    /// Depth from the root; the root is 0.
    pub fn move_num(&self) -> usize {
        self.move_num
    }

    /// Index among siblings.
    pub fn var_num(&self) -> usize {
        self.var_num
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Child at `variation`, or `None` when out of range.
    pub fn next(&self, variation: usize) -> Option<NodeId> {
        self.children.get(variation).copied()
    }

    pub fn analysis_data(&self) -> Option<&AnalysisData> {
        self.analysis.as_ref()
    }

    pub fn set_analysis_data(&mut self, data: Option<AnalysisData>) {
        self.analysis = data;
    }

    /// Append values to a raw property, after any already stored for `key`.
    pub fn add_raw_property(&mut self, key: &str, values: &[String]) {
        self.sgf_properties
            .entry(key.to_string())
            .or_default()
            .extend_from_slice(values);
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MoveTree {
    nodes: Vec<Node>,
}

impl Default for MoveTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveTree {
    /// A tree holding only a root with default game info and SGF header.
    pub fn new() -> Self {
        let mut tree = Self::without_header();
        tree.fill_default_header();
        tree
    }

    /// A root with default game info and no raw properties.
    pub(crate) fn without_header() -> Self {
        let mut root = Node::new();
        root.game_info = Some(GameInfo::default());
        Self::with_root(root)
    }

    /// Give the root any default header property it does not already have.
    pub fn fill_default_header(&mut self) {
        let root = &mut self.nodes[0];
        for (key, value) in DEFAULT_HEADER {
            root.sgf_properties
                .entry(key.to_string())
                .or_insert_with(|| vec![value.to_string()]);
        }
    }

    /// A tree whose root is `root`, taken as-is.
    pub fn with_root(mut root: Node) -> Self {
        root.move_num = 0;
        root.var_num = 0;
        root.parent = None;
        root.children.clear();
        Self { nodes: vec![root] }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Root game info, or the defaults if the root carries none.
    pub fn game_info(&self) -> GameInfo {
        self.node(self.root()).game_info.clone().unwrap_or_default()
    }

    /// Append `child` under `parent`, numbering it and linking it back.
    pub fn add_child(&mut self, parent: NodeId, mut child: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        let p = &self.nodes[parent.0];
        child.var_num = p.children.len();
        child.move_num = p.move_num + 1;
        child.parent = Some(parent);
        child.children.clear();
        self.nodes.push(child);
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Child of `id` at `variation`, if any.
    pub fn next(&self, id: NodeId, variation: usize) -> Option<NodeId> {
        self.node(id).next(variation)
    }

    /// Visit every node below and including `start`, breadth first.
    pub fn traverse(&self, start: NodeId, mut visit: impl FnMut(NodeId, &Node)) {
        let mut queue = VecDeque::from([start]);
        while let Some(id) = queue.pop_front() {
            let node = self.node(id);
            visit(id, node);
            queue.extend(node.children.iter().copied());
        }
    }

    /// Visit `start` and then each first child in turn.
    pub fn traverse_main_branch(&self, start: NodeId, mut visit: impl FnMut(NodeId, &Node)) {
        let mut current = Some(start);
        while let Some(id) = current {
            let node = self.node(id);
            visit(id, node);
            current = node.next(0);
        }
    }

    /// Main-branch node at depth `move_num`.
    pub fn main_branch_node(&self, move_num: usize) -> Option<NodeId> {
        let mut id = self.root();
        for _ in 0..move_num {
            id = self.next(id, 0)?;
        }
        Some(id)
    }

    /// Attach analysis to the main-branch node at `move_num`.
    ///
    /// Returns `false` when the main branch is shorter than that.
    pub fn attach_analysis(&mut self, move_num: usize, data: AnalysisData) -> bool {
        match self.main_branch_node(move_num) {
            Some(id) => {
                self.node_mut(id).set_analysis_data(Some(data));
                true
            }
            None => false,
        }
    }
}
