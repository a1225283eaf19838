// SPDX-License-Identifier: MIT OR Apache-2.0

//! The root SGF container and its stream-level API

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::errors::SgfError;
use crate::parser::parse_trees;
use crate::tree::GameTree;
use crate::CancelToken;

/// An ordered forest of game trees, the root of every SGF document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    game_trees: Vec<GameTree>,
}

/// Result of a parse: the best-effort tree plus the first error
///
/// A non-empty collection does NOT imply success; `error` is the sole
/// signal. Callers decide whether a partial parse is acceptable.
#[derive(Debug)]
pub struct ParseOutcome {
    pub collection: Collection,
    pub error: Option<SgfError>,
}

impl ParseOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Collapse into a plain result, dropping the partial tree on error
    pub fn into_result(self) -> Result<Collection, SgfError> {
        match self.error {
            None => Ok(self.collection),
            Some(err) => Err(err),
        }
    }
}

impl Collection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    pub fn game_trees(&self) -> &[GameTree] {
        &self.game_trees
    }

    pub fn game_trees_mut(&mut self) -> &mut [GameTree] {
        &mut self.game_trees
    }

    pub fn push_game_tree(&mut self, tree: GameTree) {
        self.game_trees.push(tree);
    }

    pub fn is_empty(&self) -> bool {
        self.game_trees.is_empty()
    }

    pub fn len(&self) -> usize {
        self.game_trees.len()
    }

    /// Parse a collection from a byte stream
    pub fn parse<R: Read>(reader: R) -> ParseOutcome {
        Self::parse_cancellable(reader, CancelToken::new())
    }

    /// Parse with a cooperative cancellation token
    ///
    /// The token is checked at every buffer refill; on cancellation the
    /// partial tree comes back with [`SgfError::Cancelled`].
    pub fn parse_cancellable<R: Read>(reader: R, cancel: CancelToken) -> ParseOutcome {
        let (trees, error) = parse_trees(reader, cancel);
        ParseOutcome {
            collection: Collection { game_trees: trees },
            error,
        }
    }

    /// Open a file and parse it
    pub fn parse_file<P: AsRef<Path>>(path: P) -> ParseOutcome {
        match File::open(path.as_ref()) {
            Ok(file) => Self::parse(BufReader::new(file)),
            Err(err) => ParseOutcome {
                collection: Collection::new(),
                error: Some(err.into()),
            },
        }
    }

    /// Cook every game tree with its resolved flavor
    pub fn cook(&mut self) -> Result<(), SgfError> {
        for tree in &mut self.game_trees {
            tree.cook()?;
        }
        Ok(())
    }

    /// Write the collection to a stream, returning the bytes written
    ///
    /// Writing an empty collection is an error, not empty output.
    pub fn write<W: Write>(&self, out: &mut W) -> Result<usize, SgfError> {
        if self.game_trees.is_empty() {
            return Err(SgfError::EmptyCollection);
        }
        let mut written = 0usize;
        for tree in &self.game_trees {
            written += tree.write_to(out)?;
        }
        out.flush()?;
        Ok(written)
    }

    /// Write the collection to a file, returning the bytes written
    pub fn write_file<P: AsRef<Path>>(&self, path: P) -> Result<usize, SgfError> {
        let file = File::create(path.as_ref())?;
        let mut out = BufWriter::new(file);
        self.write(&mut out)
    }
}
