//! SGF parser.
//!
//! A character-at-a-time state machine with four states:
//!
//! - `beginning` - before the root node's `;`
//! - `between` - between properties, nodes and variations
//! - `property` - reading an uppercase property key
//! - `propertyData` - inside `[...]`, where `\]` is a literal `]`
//!
//! Each state has its own handler so they can be exercised one at a time.
//! Completed properties are handed to a [`PropertyRegistry`].

use tracing::debug;

use crate::error::{ParseError, ParseErrorKind, ParserState, Result};
use crate::movetree::{MoveTree, Node, NodeId};
use crate::props::PropertyRegistry;

/// Parse SGF text with the standard property converters.
pub fn parse(text: &str) -> Result<MoveTree> {
    let registry = PropertyRegistry::standard();
    Ok(Parser::new(&registry).parse(text)?)
}

type Step = std::result::Result<(), ParseErrorKind>;

pub struct Parser<'r> {
    registry: &'r PropertyRegistry,
    state: ParserState,
    tree: MoveTree,
    current: NodeId,
    /// Nodes to return to when a variation closes.
    branches: Vec<NodeId>,
    /// Set once the outermost `(` has been seen.
    opened: bool,
    key: String,
    value: String,
    escaped: bool,
    pending: Option<(String, Vec<String>)>,
}

impl<'r> Parser<'r> {
    pub fn new(registry: &'r PropertyRegistry) -> Self {
        let tree = MoveTree::without_header();
        let current = tree.root();
        Self {
            registry,
            state: ParserState::Beginning,
            tree,
            current,
            branches: Vec::new(),
            opened: false,
            key: String::new(),
            value: String::new(),
            escaped: false,
            pending: None,
        }
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Run the whole input through the state machine.
    pub fn parse(mut self, text: &str) -> std::result::Result<MoveTree, ParseError> {
        let mut line = 1;
        let mut column = 1;
        for (index, ch) in text.char_indices() {
            let state = self.state;
            self.step(ch).map_err(|kind| ParseError {
                kind,
                state,
                index,
                line,
                column,
                ch: Some(ch),
            })?;
            if ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        if !self.is_complete() {
            return Err(ParseError {
                kind: ParseErrorKind::UnexpectedEnd,
                state: self.state,
                index: text.len(),
                line,
                column,
                ch: None,
            });
        }
        self.tree.fill_default_header();
        debug!(nodes = self.tree.len(), "parsed sgf");
        Ok(self.tree)
    }

    /// True once the outermost game tree has been closed.
    pub fn is_complete(&self) -> bool {
        self.opened && self.branches.is_empty() && self.state == ParserState::Between
    }

    /// Feed one character to the handler for the current state.
    pub fn step(&mut self, c: char) -> Step {
        match self.state {
            ParserState::Beginning => self.beginning(c),
            ParserState::Between => self.between(c),
            ParserState::Property => self.property(c),
            ParserState::PropertyData => self.property_data(c),
        }
    }

    fn beginning(&mut self, c: char) -> Step {
        match c {
            c if c.is_whitespace() => Ok(()),
            '(' => {
                self.branches.push(self.tree.root());
                self.opened = true;
                Ok(())
            }
            ';' if self.opened => {
                self.current = self.tree.root();
                self.state = ParserState::Between;
                Ok(())
            }
            _ => Err(ParseErrorKind::UnexpectedChar),
        }
    }

    fn between(&mut self, c: char) -> Step {
        if c.is_whitespace() {
            return Ok(());
        }
        if self.branches.is_empty() {
            return Err(match c {
                ')' => ParseErrorKind::EmptyVariation,
                _ => ParseErrorKind::TrailingInput,
            });
        }
        match c {
            'A'..='Z' => {
                self.flush()?;
                self.key.clear();
                self.key.push(c);
                self.state = ParserState::Property;
            }
            '[' => {
                if self.pending.is_none() {
                    return Err(ParseErrorKind::PropertyWithoutKey);
                }
                self.value.clear();
                self.state = ParserState::PropertyData;
            }
            '(' => {
                self.flush()?;
                self.branches.push(self.current);
            }
            ';' => {
                self.flush()?;
                self.current = self.tree.add_child(self.current, Node::new());
            }
            ')' => {
                self.flush()?;
                self.current = self.branches.pop().ok_or(ParseErrorKind::EmptyVariation)?;
            }
            _ => return Err(ParseErrorKind::UnexpectedChar),
        }
        Ok(())
    }

    fn property(&mut self, c: char) -> Step {
        match c {
            'A'..='Z' => self.key.push(c),
            '[' => {
                self.pending = Some((std::mem::take(&mut self.key), Vec::new()));
                self.value.clear();
                self.state = ParserState::PropertyData;
            }
            _ => return Err(ParseErrorKind::UnexpectedChar),
        }
        Ok(())
    }

    fn property_data(&mut self, c: char) -> Step {
        if self.escaped {
            self.escaped = false;
            if c != ']' {
                self.value.push('\\');
            }
            self.value.push(c);
            return Ok(());
        }
        match c {
            '\\' => self.escaped = true,
            ']' => {
                let value = std::mem::take(&mut self.value);
                if let Some((_, values)) = self.pending.as_mut() {
                    values.push(value);
                }
                self.state = ParserState::Between;
            }
            _ => self.value.push(c),
        }
        Ok(())
    }

    /// Hand the pending property, if any, to the registry.
    fn flush(&mut self) -> Step {
        let Some((key, values)) = self.pending.take() else {
            return Ok(());
        };
        let is_root = self.current == self.tree.root();
        self.registry
            .apply(self.tree.node_mut(self.current), &key, &values, is_root)
            .map_err(ParseErrorKind::Property)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::error::{Error, PropertyError};
    use crate::moves::Move;
    use crate::point::Point;

    fn parse_err(text: &str) -> ParseError {
        match parse(text) {
            Err(Error::Parse(e)) => e,
            other => panic!("expected parse error for {text:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_main_line() {
        let tree = parse("(;GM[1];B[pd];W[dd];B[qp])").unwrap();
        assert_eq!(tree.len(), 4);
        let mut moves = Vec::new();
        tree.traverse_main_branch(tree.root(), |_, n| moves.extend(n.mv));
        assert_eq!(
            moves,
            vec![
                Move::new(Color::Black, Point::new(15, 3)),
                Move::new(Color::White, Point::new(3, 3)),
                Move::new(Color::Black, Point::new(16, 15)),
            ]
        );
    }

    #[test]
    fn test_variations() {
        let tree = parse("(;SZ[9](;B[aa];W[bb])(;B[cc]))").unwrap();
        let root = tree.root();
        assert_eq!(tree.node(root).children().len(), 2);
        let second = tree.next(root, 1).unwrap();
        assert_eq!(tree.node(second).var_num(), 1);
        assert_eq!(
            tree.node(second).mv,
            Some(Move::new(Color::Black, Point::new(2, 2)))
        );
        let first = tree.next(root, 0).unwrap();
        assert_eq!(tree.node(first).children().len(), 1);
        assert_eq!(tree.game_info().size, 9);
    }

    #[test]
    fn test_whitespace_and_multi_values() {
        let tree = parse("(\n ;AB[aa]\n  [bb] AW[cc]\n ;B[dd]\n)\n").unwrap();
        let root = tree.node(tree.root());
        assert_eq!(root.placements.len(), 3);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_escaped_bracket() {
        let tree = parse(r"(;C[a \] b])").unwrap();
        assert_eq!(tree.node(tree.root()).comment.as_deref(), Some("a ] b"));
    }

    #[test]
    fn test_backslash_before_other_char_is_kept() {
        let tree = parse(r"(;C[a\nb\\c])").unwrap();
        assert_eq!(tree.node(tree.root()).comment.as_deref(), Some(r"a\nb\\c"));
    }

    #[test]
    fn test_raw_properties_kept() {
        let tree = parse("(;GM[1]FF[4]PB[Lee]LB[aa:x][bb:y])").unwrap();
        let root = tree.node(tree.root());
        assert_eq!(root.sgf_properties["PB"], vec!["Lee"]);
        assert_eq!(root.sgf_properties["LB"], vec!["aa:x", "bb:y"]);
    }

    #[test]
    fn test_repeated_raw_key_appends_values() {
        let tree = parse("(;LB[aa:x]TR[cc]LB[bb:y])").unwrap();
        let root = tree.node(tree.root());
        assert_eq!(root.sgf_properties["LB"], vec!["aa:x", "bb:y"]);
        assert_eq!(root.sgf_properties["TR"], vec!["cc"]);
    }

    #[test]
    fn test_header_defaults_fill_only_missing_keys() {
        let tree = parse("(;GM[1]FF[3])").unwrap();
        let root = tree.node(tree.root());
        assert_eq!(root.sgf_properties["GM"], vec!["1"]);
        assert_eq!(root.sgf_properties["FF"], vec!["3"]);
        assert_eq!(root.sgf_properties["CA"], vec!["UTF-8"]);
    }

    #[test]
    fn test_error_reports_position() {
        let e = parse_err("(;B[aa]\n;W[bb]x)");
        assert_eq!(e.kind, ParseErrorKind::UnexpectedChar);
        assert_eq!(e.state, ParserState::Between);
        assert_eq!(e.index, 14);
        assert_eq!(e.line, 2);
        assert_eq!(e.column, 7);
        assert_eq!(e.ch, Some('x'));
        let msg = e.to_string();
        assert!(msg.contains("line 2"), "{msg}");
        assert!(msg.contains("between"), "{msg}");
    }

    #[test]
    fn test_bad_beginning() {
        let e = parse_err("x(;B[aa])");
        assert_eq!(e.state, ParserState::Beginning);
        assert_eq!(e.index, 0);
        let e = parse_err(";B[aa]");
        assert_eq!(e.kind, ParseErrorKind::UnexpectedChar);
    }

    #[test]
    fn test_unclosed_input() {
        for (text, state) in [
            ("(;B[aa]", ParserState::Between),
            ("(;B[aa", ParserState::PropertyData),
            ("(;B", ParserState::Property),
            ("", ParserState::Beginning),
            ("(;B[aa](;W[bb])", ParserState::Between),
        ] {
            let e = parse_err(text);
            assert_eq!(e.kind, ParseErrorKind::UnexpectedEnd, "{text:?}");
            assert_eq!(e.state, state, "{text:?}");
            assert_eq!(e.ch, None);
        }
    }

    #[test]
    fn test_trailing_input() {
        assert_eq!(parse_err("(;B[aa]);").kind, ParseErrorKind::TrailingInput);
        assert_eq!(parse_err("(;B[aa])(;W[bb])").kind, ParseErrorKind::TrailingInput);
        assert!(parse("(;B[aa])\n  ").is_ok());
    }

    #[test]
    fn test_unmatched_close_is_empty_variation() {
        let e = parse_err("(;B[aa]))");
        assert_eq!(e.kind, ParseErrorKind::EmptyVariation);
        assert_eq!(e.state, ParserState::Between);
        assert_eq!(e.index, 8);
        assert_eq!(e.ch, Some(')'));
        assert_eq!(parse_err("(;B[aa])\n)").kind, ParseErrorKind::EmptyVariation);
    }

    #[test]
    fn test_property_errors() {
        assert_eq!(
            parse_err("(;[aa])").kind,
            ParseErrorKind::PropertyWithoutKey
        );
        assert_eq!(parse_err("(;Bx[aa])").kind, ParseErrorKind::UnexpectedChar);
        let e = parse_err("(;B[aa]W[bb])");
        assert_eq!(
            e.kind,
            ParseErrorKind::Property(PropertyError::DuplicateMove { key: "W".to_string() })
        );
    }

    #[test]
    fn test_state_handlers_individually() {
        let reg = PropertyRegistry::standard();
        let mut p = Parser::new(&reg);
        assert_eq!(p.step('('), Ok(()));
        assert_eq!(p.state(), ParserState::Beginning);
        assert_eq!(p.step(';'), Ok(()));
        assert_eq!(p.state(), ParserState::Between);
        assert_eq!(p.step('C'), Ok(()));
        assert_eq!(p.state(), ParserState::Property);
        assert_eq!(p.step('1'), Err(ParseErrorKind::UnexpectedChar));
        assert_eq!(p.step('['), Ok(()));
        assert_eq!(p.state(), ParserState::PropertyData);
        assert_eq!(p.step('('), Ok(()));
        assert_eq!(p.step(']'), Ok(()));
        assert_eq!(p.state(), ParserState::Between);
        assert!(!p.is_complete());
        assert_eq!(p.step(')'), Ok(()));
        assert!(p.is_complete());
    }
}
