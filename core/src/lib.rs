// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gammon Core - SGF Match Records and Move Legality
//!
//! This crate provides the core functionality for backgammon match records:
//! - SGF (Smart Game Format) document model, parser and serializer
//! - Per-game "flavor" typing of SGF properties (Backgammon flavor)
//! - Board position representation
//! - Move legality checking with the maximal-play rule
//!
//! The GUI, network clients and archive databases are external consumers:
//! they parse and write collections through [`Collection`] and validate
//! candidate plays through [`check_move`].

#![deny(unsafe_code)]
#![deny(clippy::all)]

pub mod archiver;
pub mod backgammon;
pub mod collection;
pub mod errors;
pub mod flavor;
pub mod move_gen;
mod parser;
pub mod position;
pub mod reader;
pub mod tokenizer;
pub mod tree;
pub mod value;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Checker color in a backgammon game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckerColor {
    /// Black player
    Black,
    /// White player
    White,
}

impl CheckerColor {
    /// Returns the opposite color
    pub fn opposite(&self) -> Self {
        match self {
            CheckerColor::Black => CheckerColor::White,
            CheckerColor::White => CheckerColor::Black,
        }
    }

    /// Sign of this side's counts in the point array
    pub fn direction(&self) -> i8 {
        match self {
            CheckerColor::Black => 1,
            CheckerColor::White => -1,
        }
    }
}

/// Cooperative cancellation for long-running parses
///
/// Cheap to clone; the parse side checks it at every stream-read boundary
/// and returns [`errors::SgfError::Cancelled`] with the partial tree.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; all clones observe it
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Errors that can occur manipulating board positions
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    /// Die value outside 1-6
    #[error("Invalid die")]
    InvalidDie,

    /// Movement endpoints out of range or not forward
    #[error("Invalid movement {from}/{to}")]
    InvalidMovement {
        /// Origin point in mover numbering
        from: u8,
        /// Destination point in mover numbering
        to: u8,
    },

    /// No checker available on the origin point
    #[error("No checker on point {0}")]
    NoChecker(u8),

    /// Destination held by two or more enemy checkers
    #[error("Point {0} is blocked")]
    PointBlocked(u8),
}

pub use backgammon::{BackgammonFlavor, BgMove, BgPoint, BgStone};
pub use collection::{Collection, ParseOutcome};
pub use errors::SgfError;
pub use flavor::{flavor_for, register_flavor, Flavor};
pub use move_gen::{check_move, MoveAnalysis};
pub use position::{Move, Movement, Position};
pub use tree::{GameTree, Node, Property, PropertyValue};
pub use value::CookedValue;
