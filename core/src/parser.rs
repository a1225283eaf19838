// SPDX-License-Identifier: MIT OR Apache-2.0

//! Grammar-driven SGF parser
//!
//! A hand-rolled state machine over the token stream, implementing
//! `Collection ::= GameTree+`, `GameTree ::= "(" Node+ GameTree* ")"`,
//! `Node ::= ";" Property*`, `Property ::= PropIdent Value+`. On any
//! violation the parser stops and hands back whatever tree it built so far
//! together with the error; the error is the sole failure signal.

use std::io::Read;

use crate::errors::SgfError;
use crate::tokenizer::{Token, TokenKind, Tokenizer};
use crate::tree::GameTree;
use crate::CancelToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Init,
    Node,
    Property,
    PropValue,
    Value,
    Properties,
    PropClose,
    PropValueRead,
    GameTrees,
}

/// Parse game trees from a byte stream
///
/// Returns the best-effort partial forest and the first error, if any.
pub(crate) fn parse_trees<R: Read>(
    reader: R,
    cancel: CancelToken,
) -> (Vec<GameTree>, Option<SgfError>) {
    let mut tokenizer = Tokenizer::with_cancel(reader, cancel);
    let mut machine = Machine::new();

    loop {
        let token = match tokenizer.next_token() {
            Ok(token) => token,
            Err(err) => return (machine.finish(), Some(err)),
        };
        match machine.step(token) {
            Ok(true) => return (machine.finish(), None),
            Ok(false) => {}
            Err(err) => return (machine.finish(), Some(err)),
        }
    }
}

struct Machine {
    state: State,
    roots: Vec<GameTree>,
    stack: Vec<GameTree>,
    current_prop: Option<String>,
}

impl Machine {
    fn new() -> Self {
        Self {
            state: State::Init,
            roots: Vec::new(),
            stack: Vec::new(),
            current_prop: None,
        }
    }

    /// Attach any unterminated trees so a partial parse is still navigable
    fn finish(mut self) -> Vec<GameTree> {
        while let Some(tree) = self.stack.pop() {
            match self.stack.last_mut() {
                Some(parent) => parent.push_child(tree),
                None => self.roots.push(tree),
            }
        }
        self.roots
    }

    fn open_tree(&mut self) {
        self.stack.push(GameTree::new());
        self.state = State::Node;
    }

    fn close_tree(&mut self, token: &Token) -> Result<(), SgfError> {
        let tree = match self.stack.pop() {
            Some(tree) => tree,
            None => {
                return Err(SgfError::syntax(token.line, token.col, "unbalanced ')'"))
            }
        };
        match self.stack.last_mut() {
            Some(parent) => parent.push_child(tree),
            None => self.roots.push(tree),
        }
        self.state = State::GameTrees;
        Ok(())
    }

    fn start_node(&mut self) {
        if let Some(tree) = self.stack.last_mut() {
            tree.push_node(crate::tree::Node::new());
        }
        self.state = State::Property;
    }

    fn start_property(&mut self, id: String, token: &Token) -> Result<(), SgfError> {
        let node = self
            .stack
            .last_mut()
            .and_then(|tree| tree.last_node_mut())
            .ok_or_else(|| {
                SgfError::syntax(token.line, token.col, "property outside of a node")
            })?;
        if !node.insert_new(&id) {
            return Err(SgfError::syntax(
                token.line,
                token.col,
                format!("Property '{}' defined twice", id),
            ));
        }
        self.current_prop = Some(id);
        self.state = State::PropValue;
        Ok(())
    }

    fn push_value(&mut self, text: String) {
        if let (Some(id), Some(node)) = (
            self.current_prop.as_deref(),
            self.stack.last_mut().and_then(|tree| tree.last_node_mut()),
        ) {
            node.push_raw(id, text);
        }
    }

    /// Feed one token; Ok(true) means the document is complete
    fn step(&mut self, token: Token) -> Result<bool, SgfError> {
        let unexpected = |expected: &str| -> SgfError {
            SgfError::syntax(
                token.line,
                token.col,
                format!("expected {}, got {}", expected, token.describe()),
            )
        };

        match self.state {
            State::Init => match &token.kind {
                TokenKind::LParen => self.open_tree(),
                TokenKind::Eof => return Ok(true),
                _ => return Err(SgfError::syntax(token.line, token.col, "expected '('")),
            },
            State::Node => match &token.kind {
                TokenKind::Semicolon => self.start_node(),
                _ => return Err(SgfError::syntax(token.line, token.col, "expected ';'")),
            },
            State::Property => match token.kind.clone() {
                TokenKind::PropIdent(id) => self.start_property(id, &token)?,
                TokenKind::Semicolon => self.start_node(),
                TokenKind::LParen => self.open_tree(),
                TokenKind::RParen => self.close_tree(&token)?,
                _ => return Err(unexpected("property, ';', '(' or ')'")),
            },
            State::PropValue => match &token.kind {
                TokenKind::LBracket => self.state = State::Value,
                _ => return Err(SgfError::syntax(token.line, token.col, "expected '['")),
            },
            State::Value => match token.kind.clone() {
                TokenKind::RBracket => {
                    self.push_value(String::new());
                    self.state = State::Properties;
                }
                TokenKind::Value { text, .. } => {
                    self.push_value(text);
                    self.state = State::PropClose;
                }
                _ => return Err(unexpected("value or ']'")),
            },
            State::Properties => match &token.kind {
                TokenKind::LBracket => self.state = State::Value,
                TokenKind::Semicolon => self.start_node(),
                TokenKind::LParen => self.open_tree(),
                TokenKind::RParen => self.close_tree(&token)?,
                _ => return Err(unexpected("'[', ';', '(' or ')'")),
            },
            State::PropClose => match &token.kind {
                TokenKind::RBracket => self.state = State::PropValueRead,
                _ => return Err(SgfError::syntax(token.line, token.col, "expected ']'")),
            },
            State::PropValueRead => match token.kind.clone() {
                TokenKind::LBracket => self.state = State::Value,
                TokenKind::Semicolon => self.start_node(),
                TokenKind::LParen => self.open_tree(),
                TokenKind::RParen => self.close_tree(&token)?,
                TokenKind::PropIdent(id) => self.start_property(id, &token)?,
                _ => return Err(unexpected("'[', ';', '(', ')' or property")),
            },
            State::GameTrees => match &token.kind {
                TokenKind::LParen => self.open_tree(),
                TokenKind::RParen => self.close_tree(&token)?,
                TokenKind::Eof => {
                    if self.stack.is_empty() {
                        return Ok(true);
                    }
                    return Err(SgfError::syntax(
                        token.line,
                        token.col,
                        "unexpected end of file",
                    ));
                }
                _ => return Err(SgfError::syntax(token.line, token.col, "expected '('")),
            },
        }
        Ok(false)
    }
}
