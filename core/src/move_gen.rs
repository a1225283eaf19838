// SPDX-License-Identifier: MIT OR Apache-2.0

//! Move legality engine
//!
//! Given a position before the play, a candidate position after it and the
//! rolled dice, decide whether the candidate is reachable by a legal
//! sequence of checker movements, and reconstruct one such sequence. The
//! maximal-play rule applies: as many dice as possible must be used, and
//! among equal-length plays the one consuming more pips wins. Everything is
//! re-derived from the raw position at each step; nothing is cached between
//! calls, so concurrent use is safe as long as each call owns its buffers.

use serde::{Deserialize, Serialize};

use crate::position::{Movement, Position, BAR};
use crate::CheckerColor;

/// Verdict for one candidate play
///
/// Never an error: unreachable positions simply come back illegal. The
/// movement list is one canonical explanation; other orderings reaching the
/// same board are equally legal, so tests should compare board state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveAnalysis {
    pub legal: bool,
    pub movements: Vec<Movement>,
}

impl MoveAnalysis {
    fn illegal() -> Self {
        Self {
            legal: false,
            movements: Vec::new(),
        }
    }
}

/// Board state relative to the mover
///
/// `my[1..=24]` are the mover's point counts in mover numbering (the mover
/// walks from 24 toward 1 and bears off past it), `my[25]` is the mover's
/// bar. `opp` holds opponent counts on the same points; a point with two or
/// more opponent checkers is blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RelBoard {
    my: [u8; 26],
    opp: [u8; 26],
    opp_bar: u8,
}

impl RelBoard {
    fn from_position(pos: &Position, color: CheckerColor) -> Self {
        let mut rel = RelBoard {
            my: [0; 26],
            opp: [0; 26],
            opp_bar: pos.bar[color.opposite() as usize],
        };
        for point in 1..=24u8 {
            let index = Position::point_index(color, point);
            rel.my[point as usize] = pos.checkers_at(color, index);
            rel.opp[point as usize] = pos.checkers_at(color.opposite(), index);
        }
        rel.my[BAR as usize] = pos.bar[color as usize];
        rel
    }

    fn all_home(&self) -> bool {
        self.my[BAR as usize] == 0 && self.my[7..=24].iter().all(|&c| c == 0)
    }

    /// Apply a movement known to be legal, hitting any blot on the target
    fn apply(&self, from: u8, to: u8) -> Self {
        let mut next = *self;
        next.my[from as usize] -= 1;
        if to > 0 {
            if next.opp[to as usize] == 1 {
                next.opp[to as usize] = 0;
                next.opp_bar += 1;
            }
            next.my[to as usize] += 1;
        }
        next
    }
}

/// All single-checker movements for one die value
///
/// Bar checkers must enter first; bearing off needs every checker home,
/// with overshoot allowed only from the highest occupied point. `max_from`
/// is the origin cursor that keeps doubles from re-exploring points above
/// the previous origin.
fn moves_for_die(rel: &RelBoard, die: u8, max_from: u8) -> Vec<(u8, u8)> {
    let mut out = Vec::new();

    if rel.my[BAR as usize] > 0 {
        let to = BAR - die;
        if rel.opp[to as usize] < 2 {
            out.push((BAR, to));
        }
        return out;
    }

    let all_home = rel.all_home();
    for from in (1..=max_from.min(24)).rev() {
        if rel.my[from as usize] == 0 {
            continue;
        }
        if from > die {
            let to = from - die;
            if rel.opp[to as usize] < 2 {
                out.push((from, to));
            }
        } else if from == die {
            if all_home {
                out.push((from, 0));
            }
        } else if all_home && rel.my[from as usize + 1..=6].iter().all(|&c| c == 0) {
            // Overshot bear-off is only allowed from the rearmost point.
            out.push((from, 0));
        }
    }
    out
}

struct Search {
    target: RelBoard,
    best_len: usize,
    best_pips: u32,
    found: Option<(usize, u32, Vec<(u8, u8)>)>,
}

impl Search {
    fn record(&mut self, rel: &RelBoard, trail: &[(u8, u8)], pips: u32) {
        let len = trail.len();
        if len > self.best_len || (len == self.best_len && pips > self.best_pips) {
            self.best_len = len;
            self.best_pips = pips;
        }
        if *rel == self.target {
            let better = match &self.found {
                Some((found_len, found_pips, _)) => (len, pips) > (*found_len, *found_pips),
                None => true,
            };
            if better {
                self.found = Some((len, pips, trail.to_vec()));
            }
        }
    }

    /// Depth-first over the remaining dice; a state with no playable die is
    /// a complete play and becomes a candidate endpoint.
    fn recurse(
        &mut self,
        rel: &RelBoard,
        dice: &[u8],
        pips: u32,
        trail: &mut Vec<(u8, u8)>,
        max_from: u8,
        doubles: bool,
    ) {
        let moves = match dice.first() {
            Some(&die) => moves_for_die(rel, die, if doubles { max_from } else { 24 }),
            None => Vec::new(),
        };
        if moves.is_empty() {
            self.record(rel, trail, pips);
            return;
        }
        let die = dice[0];
        for (from, to) in moves {
            let next = rel.apply(from, to);
            trail.push((from, to));
            self.recurse(&next, &dice[1..], pips + die as u32, trail, from, doubles);
            trail.pop();
        }
    }
}

/// Check whether `after` is a legal play of `before`'s dice for `color`
///
/// The dice are taken from `before`; doubles expand to four plies. The
/// identity play is legal exactly when no die can be moved at all.
pub fn check_move(before: &Position, after: &Position, color: CheckerColor) -> MoveAnalysis {
    let die1 = before.dice[0].unsigned_abs();
    let die2 = before.dice[1].unsigned_abs();
    if !(1..=6).contains(&die1) || !(1..=6).contains(&die2) {
        tracing::debug!(die1, die2, "no dice on the position, rejecting play");
        return MoveAnalysis::illegal();
    }

    let start = RelBoard::from_position(before, color);
    let target = RelBoard::from_position(after, color);
    let doubles = die1 == die2;

    let mut search = Search {
        target,
        best_len: 0,
        best_pips: 0,
        found: None,
    };
    let mut trail = Vec::with_capacity(4);
    if doubles {
        search.recurse(&start, &[die1; 4], 0, &mut trail, BAR, true);
    } else {
        search.recurse(&start, &[die1, die2], 0, &mut trail, BAR, false);
        search.recurse(&start, &[die2, die1], 0, &mut trail, BAR, false);
    }

    match search.found {
        Some((len, pips, trail)) if len == search.best_len && pips == search.best_pips => {
            MoveAnalysis {
                legal: true,
                movements: merge_trail(&trail),
            }
        }
        _ => MoveAnalysis::illegal(),
    }
}

/// Merge equal movements into counted entries, keeping play order
fn merge_trail(trail: &[(u8, u8)]) -> Vec<Movement> {
    let mut out: Vec<Movement> = Vec::with_capacity(trail.len());
    for &(from, to) in trail {
        match out.iter_mut().find(|m| m.from == from && m.to == to) {
            Some(movement) => movement.count += 1,
            None => out.push(Movement { from, to, count: 1 }),
        }
    }
    out
}
