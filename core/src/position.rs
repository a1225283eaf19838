// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backgammon board position model
//!
//! A fixed-size representation: 24 signed point counts (positive checkers
//! belong to Black, negative to White), two bar counts, the dice, and cube
//! state. Borne-off checkers are derived, never stored. Black moves from
//! high point indices toward index 0 and bears off past it; White mirrors.

use serde::{Deserialize, Serialize};

use crate::{CheckerColor, GameError};

/// Checkers per side at the start of a game
pub const CHECKERS_PER_SIDE: u8 = 15;

/// Relative point number of the bar in mover coordinates
pub const BAR: u8 = 25;

/// Relative point number of the tray in mover coordinates
pub const OFF: u8 = 0;

/// A complete board position with dice and cube state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Point counts; positive = Black checkers, negative = White
    pub points: [i8; 24],
    /// Checkers on the bar, indexed Black then White
    pub bar: [u8; 2],
    /// The rolled dice; positive = Black on roll, negative = White
    pub dice: [i8; 2],
    /// Doubling cube value
    pub cube: u64,
    /// Whether each side may still double, indexed Black then White
    pub may_double: [bool; 2],
    /// Crawford game: no doubling this game
    pub crawford: bool,
    /// Match length in points, 0 for money play
    pub match_length: u32,
    /// Score per side, indexed Black then White
    pub scores: [u32; 2],
}

impl Default for Position {
    fn default() -> Self {
        Self {
            points: [0; 24],
            bar: [0, 0],
            dice: [0, 0],
            cube: 1,
            may_double: [true, true],
            crawford: false,
            match_length: 0,
            scores: [0, 0],
        }
    }
}

/// A single checker movement in mover-relative numbering
///
/// Points run 25 (bar) down to 1; 0 is the tray. `count` merges identical
/// movements, so doubles moving two checkers together stay one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub from: u8,
    pub to: u8,
    pub count: u8,
}

/// A match-level action by one player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Move {
    /// Checker play described by its movements
    Regular(Vec<Movement>),
    /// Cube offered
    Double,
    /// Cube accepted
    Take,
    /// Cube declined, game over
    Drop,
    /// Resignation offered
    Resign,
    /// Resignation rejected
    Reject,
}

impl Position {
    /// An empty board with a centered cube and no dice
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard backgammon starting position
    pub fn standard() -> Self {
        let mut pos = Self::default();
        // Black: 2 on the 24 point, 5 on 13, 3 on 8, 5 on 6.
        pos.points[23] = 2;
        pos.points[12] = 5;
        pos.points[7] = 3;
        pos.points[5] = 5;
        // White mirrored.
        pos.points[0] = -2;
        pos.points[11] = -5;
        pos.points[16] = -3;
        pos.points[18] = -5;
        pos
    }

    /// Board array index of a mover-relative point number
    pub fn point_index(color: CheckerColor, point: u8) -> usize {
        debug_assert!((1..=24).contains(&point));
        match color {
            CheckerColor::Black => point as usize - 1,
            CheckerColor::White => 24 - point as usize,
        }
    }

    /// Checkers of one side on a board index
    pub fn checkers_at(&self, color: CheckerColor, index: usize) -> u8 {
        let count = self.points[index];
        match color {
            CheckerColor::Black if count > 0 => count as u8,
            CheckerColor::White if count < 0 => (-count) as u8,
            _ => 0,
        }
    }

    /// Checkers of one side still on the board, bar included
    pub fn checkers_on_board(&self, color: CheckerColor) -> u8 {
        let on_points: u8 = (0..24).map(|i| self.checkers_at(color, i)).sum();
        on_points + self.bar[color as usize]
    }

    /// Borne-off checkers, derived from what is left on the board
    pub fn borne_off(&self, color: CheckerColor) -> u8 {
        CHECKERS_PER_SIDE.saturating_sub(self.checkers_on_board(color))
    }

    /// Pip count: total dots needed to bear everything off
    pub fn pip_count(&self, color: CheckerColor) -> u32 {
        let mut pips = self.bar[color as usize] as u32 * BAR as u32;
        for point in 1..=24u8 {
            let index = Self::point_index(color, point);
            pips += self.checkers_at(color, index) as u32 * point as u32;
        }
        pips
    }

    /// Side on roll according to the dice sign
    pub fn on_roll(&self) -> Option<CheckerColor> {
        match self.dice[0].signum() {
            1 => Some(CheckerColor::Black),
            -1 => Some(CheckerColor::White),
            _ => None,
        }
    }

    /// Set the dice for the given side
    pub fn set_dice(&mut self, color: CheckerColor, die1: u8, die2: u8) -> Result<(), GameError> {
        if !(1..=6).contains(&die1) || !(1..=6).contains(&die2) {
            return Err(GameError::InvalidDie);
        }
        let sign = match color {
            CheckerColor::Black => 1i8,
            CheckerColor::White => -1i8,
        };
        self.dice = [sign * die1 as i8, sign * die2 as i8];
        Ok(())
    }

    /// True when both positions have the same checkers everywhere
    ///
    /// Dice, cube and match state are ignored; this is the comparison the
    /// legality engine uses on candidate end positions.
    pub fn same_board(&self, other: &Position) -> bool {
        self.points == other.points && self.bar == other.bar
    }

    /// Mirror the position, exchanging the two sides
    pub fn swap_sides(&mut self) {
        self.points.reverse();
        for count in &mut self.points {
            *count = -*count;
        }
        self.bar.swap(0, 1);
        self.may_double.swap(0, 1);
        self.scores.swap(0, 1);
        for die in &mut self.dice {
            *die = -*die;
        }
    }

    /// Apply one checker movement in mover-relative numbering
    ///
    /// Test support: the legality engine never calls this, it re-derives
    /// everything from the raw position. Blots on the target are hit onto
    /// the opponent's bar.
    pub fn move_checker(
        &mut self,
        color: CheckerColor,
        from: u8,
        to: u8,
    ) -> Result<(), GameError> {
        if from > BAR || from == OFF || to >= from {
            return Err(GameError::InvalidMovement { from, to });
        }

        // Lift the checker.
        if from == BAR {
            if self.bar[color as usize] == 0 {
                return Err(GameError::NoChecker(from));
            }
            self.bar[color as usize] -= 1;
        } else {
            let index = Self::point_index(color, from);
            if self.checkers_at(color, index) == 0 {
                return Err(GameError::NoChecker(from));
            }
            self.points[index] -= color.direction();
        }

        if to == OFF {
            return Ok(()); // borne off, derived counters pick it up
        }

        let index = Self::point_index(color, to);
        let enemy = self.checkers_at(color.opposite(), index);
        if enemy > 1 {
            return Err(GameError::PointBlocked(to));
        }
        if enemy == 1 {
            // Hit: the blot goes to the opponent's bar.
            self.points[index] = 0;
            self.bar[color.opposite() as usize] += 1;
        }
        self.points[index] += color.direction();
        Ok(())
    }
}
