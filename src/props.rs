//! Property converters between SGF text and typed node fields.
//!
//! A [`PropertyRegistry`] maps property tags to a [`Converter`]. Tags with no
//! converter are kept verbatim in [`Node::sgf_properties`]. The registry is a
//! plain value: build [`PropertyRegistry::standard`] once and pass it to the
//! parser and serializer, or assemble a custom one for tests.

use std::collections::HashMap;

use tracing::warn;

use crate::color::Color;
use crate::error::{PropertyError, Result};
use crate::game_info::{Komi, Rank, parse_initial_player, parse_size};
use crate::moves::Move;
use crate::movetree::Node;
use crate::point::Point;

/// Where a property may appear.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Scope {
    Root,
    Any,
}

/// Store `values` for `key` on a node.
pub type FromSgf = fn(&mut Node, &str, &[String]) -> Result<(), PropertyError>;

/// Render a node's typed field as `KEY[value]...`, or `None` if unset.
pub type ToSgf = fn(&Node) -> Result<Option<String>>;

#[derive(Clone, Debug)]
pub struct Converter {
    pub tags: &'static [&'static str],
    pub scope: Scope,
    pub from_sgf: FromSgf,
    pub to_sgf: ToSgf,
}

#[derive(Clone, Debug, Default)]
pub struct PropertyRegistry {
    converters: Vec<Converter>,
    by_tag: HashMap<&'static str, usize>,
}

impl PropertyRegistry {
    /// A registry with no converters; every property is stored raw.
    pub fn new() -> Self {
        Self::default()
    }

    /// Converters for moves, placements, comments, size, komi, initial
    /// player and ranks.
    pub fn standard() -> Self {
        let mut reg = Self::new();
        reg.register(Converter {
            tags: &["SZ"],
            scope: Scope::Root,
            from_sgf: size_from_sgf,
            to_sgf: size_to_sgf,
        });
        reg.register(Converter {
            tags: &["KM"],
            scope: Scope::Root,
            from_sgf: komi_from_sgf,
            to_sgf: komi_to_sgf,
        });
        reg.register(Converter {
            tags: &["PL"],
            scope: Scope::Root,
            from_sgf: player_from_sgf,
            to_sgf: player_to_sgf,
        });
        reg.register(Converter {
            tags: &["BR", "WR"],
            scope: Scope::Root,
            from_sgf: rank_from_sgf,
            to_sgf: rank_to_sgf,
        });
        reg.register(Converter {
            tags: &["AB", "AW"],
            scope: Scope::Any,
            from_sgf: placements_from_sgf,
            to_sgf: placements_to_sgf,
        });
        reg.register(Converter {
            tags: &["B", "W"],
            scope: Scope::Any,
            from_sgf: move_from_sgf,
            to_sgf: move_to_sgf,
        });
        reg.register(Converter {
            tags: &["C"],
            scope: Scope::Any,
            from_sgf: comment_from_sgf,
            to_sgf: comment_to_sgf,
        });
        reg
    }

    /// Add a converter. Later registrations win for shared tags.
    pub fn register(&mut self, converter: Converter) {
        let idx = self.converters.len();
        for &tag in converter.tags {
            self.by_tag.insert(tag, idx);
        }
        self.converters.push(converter);
    }

    pub fn converter(&self, tag: &str) -> Option<&Converter> {
        self.by_tag.get(tag).map(|&i| &self.converters[i])
    }

    /// Apply one parsed property to a node.
    ///
    /// Root-scoped properties found off the root are dropped.
    pub fn apply(
        &self,
        node: &mut Node,
        key: &str,
        values: &[String],
        is_root: bool,
    ) -> Result<(), PropertyError> {
        match self.converter(key) {
            Some(conv) if conv.scope == Scope::Root && !is_root => {
                warn!(key, "root property outside the root node ignored");
                Ok(())
            }
            Some(conv) => (conv.from_sgf)(node, key, values),
            None => {
                node.add_raw_property(key, values);
                Ok(())
            }
        }
    }

    /// All typed and raw properties of a node as SGF text, without the `;`.
    pub fn node_to_sgf(&self, node: &Node, is_root: bool) -> Result<String> {
        let mut out = String::new();
        for conv in &self.converters {
            if conv.scope == Scope::Root && !is_root {
                continue;
            }
            if let Some(text) = (conv.to_sgf)(node)? {
                out.push_str(&text);
            }
        }
        for (key, values) in &node.sgf_properties {
            if values.is_empty() {
                continue;
            }
            out.push_str(&format_property(key, values.iter().map(String::as_str)));
        }
        Ok(out)
    }
}

/// Escape a property value for writing.
pub fn escape(value: &str) -> String {
    value.replace(']', "\\]")
}

fn format_property<'a>(key: &str, values: impl IntoIterator<Item = &'a str>) -> String {
    let mut out = key.to_string();
    for v in values {
        out.push('[');
        out.push_str(&escape(v));
        out.push(']');
    }
    out
}

fn single<'a>(key: &str, values: &'a [String]) -> Result<&'a str, PropertyError> {
    match values {
        [] => Err(PropertyError::MissingValue { key: key.to_string() }),
        [v] => Ok(v),
        _ => Err(PropertyError::TooManyValues {
            key: key.to_string(),
            count: values.len(),
        }),
    }
}

fn value_error(key: &str, e: impl std::fmt::Display) -> PropertyError {
    PropertyError::Value {
        key: key.to_string(),
        message: e.to_string(),
    }
}

fn color_for(key: &str) -> Result<Color, PropertyError> {
    Color::from_sgf_prop(key).map_err(|e| value_error(key, e))
}

// -----------------------------------------------------------------------------
// Moves and placements
// -----------------------------------------------------------------------------

fn move_from_sgf(node: &mut Node, key: &str, values: &[String]) -> Result<(), PropertyError> {
    if node.mv.is_some() {
        return Err(PropertyError::DuplicateMove { key: key.to_string() });
    }
    let color = color_for(key)?;
    let raw = single(key, values)?;
    let mv = if raw.is_empty() {
        Move::pass(color)
    } else {
        Move::new(color, Point::from_sgf(raw).map_err(|e| value_error(key, e))?)
    };
    node.mv = Some(mv);
    Ok(())
}

fn move_to_sgf(node: &Node) -> Result<Option<String>> {
    let Some(mv) = node.mv else { return Ok(None) };
    let Some(tag) = mv.color().move_tag() else {
        return Ok(None);
    };
    let value = match mv.point() {
        Some(p) => p.to_sgf()?,
        None => String::new(),
    };
    Ok(Some(format_property(tag, [value.as_str()])))
}

fn placements_from_sgf(node: &mut Node, key: &str, values: &[String]) -> Result<(), PropertyError> {
    let color = color_for(key)?;
    if values.is_empty() {
        return Err(PropertyError::MissingValue { key: key.to_string() });
    }
    for raw in values {
        let p = Point::from_sgf(raw).map_err(|e| value_error(key, e))?;
        let mv = Move::new(color, p);
        if !node.placements.contains(&mv) {
            node.placements.push(mv);
        }
    }
    Ok(())
}

fn placements_to_sgf(node: &Node) -> Result<Option<String>> {
    // One property per run of same-colored stones keeps the stored order
    // intact through a parse.
    let mut out = String::new();
    let mut run: Option<(Color, Vec<String>)> = None;
    for mv in &node.placements {
        let Some(p) = mv.point() else { continue };
        let point = p.to_sgf()?;
        match run.as_mut() {
            Some((color, points)) if *color == mv.color() => points.push(point),
            _ => {
                if let Some((color, points)) = run.replace((mv.color(), vec![point])) {
                    push_placements(&mut out, color, &points);
                }
            }
        }
    }
    if let Some((color, points)) = run {
        push_placements(&mut out, color, &points);
    }
    Ok((!out.is_empty()).then_some(out))
}

fn push_placements(out: &mut String, color: Color, points: &[String]) {
    if let Some(tag) = color.placement_tag() {
        out.push_str(&format_property(tag, points.iter().map(String::as_str)));
    }
}

// -----------------------------------------------------------------------------
// Comments
// -----------------------------------------------------------------------------

fn comment_from_sgf(node: &mut Node, key: &str, values: &[String]) -> Result<(), PropertyError> {
    node.comment = Some(single(key, values)?.to_string());
    Ok(())
}

fn comment_to_sgf(node: &Node) -> Result<Option<String>> {
    Ok(node
        .comment
        .as_deref()
        .map(|c| format_property("C", [c])))
}

// -----------------------------------------------------------------------------
// Root game info
// -----------------------------------------------------------------------------

fn size_from_sgf(node: &mut Node, key: &str, values: &[String]) -> Result<(), PropertyError> {
    let size = parse_size(single(key, values)?)?;
    node.game_info.get_or_insert_default().size = size;
    Ok(())
}

fn size_to_sgf(node: &Node) -> Result<Option<String>> {
    Ok(node
        .game_info
        .as_ref()
        .map(|gi| format_property("SZ", [gi.size.to_string().as_str()])))
}

fn komi_from_sgf(node: &mut Node, key: &str, values: &[String]) -> Result<(), PropertyError> {
    let komi: Komi = single(key, values)?.parse()?;
    node.game_info.get_or_insert_default().komi = Some(komi);
    Ok(())
}

fn komi_to_sgf(node: &Node) -> Result<Option<String>> {
    Ok(node
        .game_info
        .as_ref()
        .and_then(|gi| gi.komi)
        .map(|k| format_property("KM", [k.to_string().as_str()])))
}

fn player_from_sgf(node: &mut Node, key: &str, values: &[String]) -> Result<(), PropertyError> {
    let color = parse_initial_player(single(key, values)?)?;
    node.game_info.get_or_insert_default().initial_player = Some(color);
    Ok(())
}

fn player_to_sgf(node: &Node) -> Result<Option<String>> {
    Ok(node
        .game_info
        .as_ref()
        .and_then(|gi| gi.initial_player)
        .and_then(|c| c.move_tag())
        .map(|tag| format_property("PL", [tag])))
}

fn rank_from_sgf(node: &mut Node, key: &str, values: &[String]) -> Result<(), PropertyError> {
    let rank: Rank = single(key, values)?.parse()?;
    let info = node.game_info.get_or_insert_default();
    match key {
        "BR" => info.black_rank = Some(rank),
        _ => info.white_rank = Some(rank),
    }
    Ok(())
}

fn rank_to_sgf(node: &Node) -> Result<Option<String>> {
    let Some(info) = node.game_info.as_ref() else {
        return Ok(None);
    };
    let mut out = String::new();
    if let Some(r) = info.black_rank {
        out.push_str(&format_property("BR", [r.to_string().as_str()]));
    }
    if let Some(r) = info.white_rank {
        out.push_str(&format_property("WR", [r.to_string().as_str()]));
    }
    Ok((!out.is_empty()).then_some(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vals(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_move_and_pass() {
        let reg = PropertyRegistry::standard();
        let mut node = Node::new();
        reg.apply(&mut node, "B", &vals(&["pd"]), false).unwrap();
        assert_eq!(node.mv, Some(Move::new(Color::Black, Point::new(15, 3))));

        let mut pass = Node::new();
        reg.apply(&mut pass, "W", &vals(&[""]), false).unwrap();
        assert_eq!(pass.mv, Some(Move::pass(Color::White)));
        assert_eq!(reg.node_to_sgf(&pass, false).unwrap(), "W[]");
    }

    #[test]
    fn test_second_move_is_rejected() {
        let reg = PropertyRegistry::standard();
        let mut node = Node::new();
        reg.apply(&mut node, "B", &vals(&["pd"]), false).unwrap();
        assert_eq!(
            reg.apply(&mut node, "W", &vals(&["dd"]), false),
            Err(PropertyError::DuplicateMove { key: "W".to_string() })
        );
    }

    #[test]
    fn test_placements_keep_order_and_are_idempotent() {
        let reg = PropertyRegistry::standard();
        let mut node = Node::new();
        reg.apply(&mut node, "AB", &vals(&["dd", "pp", "dp"]), false).unwrap();
        reg.apply(&mut node, "AB", &vals(&["dd", "pp", "dp"]), false).unwrap();
        reg.apply(&mut node, "AW", &vals(&["qq"]), false).unwrap();
        assert_eq!(node.placements.len(), 4);
        assert_eq!(reg.node_to_sgf(&node, false).unwrap(), "AB[dd][pp][dp]AW[qq]");
    }

    #[test]
    fn test_interleaved_placements_written_in_runs() {
        let reg = PropertyRegistry::standard();
        let mut node = Node::new();
        reg.apply(&mut node, "AB", &vals(&["aa"]), false).unwrap();
        reg.apply(&mut node, "AW", &vals(&["bb"]), false).unwrap();
        reg.apply(&mut node, "AB", &vals(&["cc", "dd"]), false).unwrap();
        assert_eq!(reg.node_to_sgf(&node, false).unwrap(), "AB[aa]AW[bb]AB[cc][dd]");
    }

    #[test]
    fn test_bad_point_is_a_property_error() {
        let reg = PropertyRegistry::standard();
        let mut node = Node::new();
        assert!(matches!(
            reg.apply(&mut node, "B", &vals(&["p"]), false),
            Err(PropertyError::Value { .. })
        ));
    }

    #[test]
    fn test_root_properties() {
        let reg = PropertyRegistry::standard();
        let mut root = Node::new();
        reg.apply(&mut root, "SZ", &vals(&["9"]), true).unwrap();
        reg.apply(&mut root, "KM", &vals(&["6.5"]), true).unwrap();
        reg.apply(&mut root, "PL", &vals(&["W"]), true).unwrap();
        reg.apply(&mut root, "BR", &vals(&["3d"]), true).unwrap();
        let info = root.game_info.clone().unwrap();
        assert_eq!(info.size, 9);
        assert_eq!(info.komi.unwrap().value(), 6.5);
        assert_eq!(info.initial_player, Some(Color::White));
        assert_eq!(
            reg.node_to_sgf(&root, true).unwrap(),
            "SZ[9]KM[6.5]PL[W]BR[3d]"
        );
        assert_eq!(reg.node_to_sgf(&root, false).unwrap(), "");
    }

    #[test]
    fn test_root_property_semantics_errors() {
        let reg = PropertyRegistry::standard();
        let mut root = Node::new();
        assert!(matches!(
            reg.apply(&mut root, "SZ", &vals(&["40"]), true),
            Err(PropertyError::BoardSize(_))
        ));
        assert!(matches!(
            reg.apply(&mut root, "KM", &vals(&["6.3"]), true),
            Err(PropertyError::Komi(_))
        ));
        assert!(matches!(
            reg.apply(&mut root, "PL", &vals(&["X"]), true),
            Err(PropertyError::InitialPlayer(_))
        ));
        assert!(matches!(
            reg.apply(&mut root, "WR", &vals(&["strong"]), true),
            Err(PropertyError::Rank(_))
        ));
    }

    #[test]
    fn test_root_property_off_root_is_dropped() {
        let reg = PropertyRegistry::standard();
        let mut node = Node::new();
        reg.apply(&mut node, "SZ", &vals(&["9"]), false).unwrap();
        assert!(node.game_info.is_none());
        assert!(node.sgf_properties.is_empty());
    }

    #[test]
    fn test_raw_properties_sorted_and_escaped() {
        let reg = PropertyRegistry::standard();
        let mut node = Node::new();
        reg.apply(&mut node, "PW", &vals(&["white]"]), false).unwrap();
        reg.apply(&mut node, "LB", &vals(&["aa:1", "bb:2"]), false).unwrap();
        reg.apply(&mut node, "C", &vals(&["a ] b"]), false).unwrap();
        assert_eq!(
            reg.node_to_sgf(&node, false).unwrap(),
            "C[a \\] b]LB[aa:1][bb:2]PW[white\\]]"
        );
    }

    #[test]
    fn test_empty_registry_stores_everything_raw() {
        let reg = PropertyRegistry::new();
        let mut node = Node::new();
        reg.apply(&mut node, "B", &vals(&["pd"]), false).unwrap();
        assert!(node.mv.is_none());
        assert_eq!(node.sgf_properties["B"], vec!["pd"]);
    }
}
