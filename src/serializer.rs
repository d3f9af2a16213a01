//! SGF writer.
//!
//! Straight-line sequences are written flat; a node with several children
//! wraps each child's subtree in parentheses. Root-only properties are only
//! written on the root.

use crate::error::Result;
use crate::movetree::{MoveTree, NodeId};
use crate::props::PropertyRegistry;

/// Serialize with the standard property converters.
pub fn serialize(tree: &MoveTree) -> Result<String> {
    Serializer::new(&PropertyRegistry::standard()).serialize(tree)
}

pub struct Serializer<'r> {
    registry: &'r PropertyRegistry,
}

impl<'r> Serializer<'r> {
    pub fn new(registry: &'r PropertyRegistry) -> Self {
        Self { registry }
    }

    pub fn serialize(&self, tree: &MoveTree) -> Result<String> {
        let mut out = String::from("(");
        self.write_sequence(tree, tree.root(), &mut out)?;
        out.push(')');
        Ok(out)
    }

    /// Write `start` and its single-child successors, recursing at branches.
    fn write_sequence(&self, tree: &MoveTree, start: NodeId, out: &mut String) -> Result<()> {
        let mut id = start;
        loop {
            let node = tree.node(id);
            out.push(';');
            out.push_str(&self.registry.node_to_sgf(node, id == tree.root())?);
            match node.children() {
                [] => return Ok(()),
                [only] => id = *only,
                children => {
                    for &child in children {
                        out.push('(');
                        self.write_sequence(tree, child, out)?;
                        out.push(')');
                    }
                    return Ok(());
                }
            }
        }
    }
}
