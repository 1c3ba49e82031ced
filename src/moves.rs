//! Neighborhood moves.
//!
//! A move changes *when* a session meets; teacher and room stay fixed.
//! Three kinds are drawn with equal probability:
//!
//! - **ChangeTime**: another slot on the same day.
//! - **ChangeDay**: the same period on a different day.
//! - **Swap**: exchange time slots with another movable session.
//!
//! Pinned sessions are never selected. When the drawn kind has no valid
//! target (e.g., a single-day calendar for ChangeDay), any other slot is
//! used instead so a move is produced whenever one exists.

use rand::seq::IndexedRandom;
use rand::Rng;

use crate::models::{Solution, TimeSlotId};

/// An atomic candidate mutation of a solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    /// Move a session to another slot on the same day.
    ChangeTime { session: usize, time_slot: TimeSlotId },
    /// Move a session to another day.
    ChangeDay { session: usize, time_slot: TimeSlotId },
    /// Exchange the time slots of two sessions.
    Swap { first: usize, second: usize },
}

/// Previous time slots of the sessions a move touched.
#[derive(Debug, Clone)]
#[must_use = "dropping an AppliedMove discards the ability to revert it"]
pub struct AppliedMove {
    previous: [(usize, Option<TimeSlotId>); 2],
    len: usize,
}

impl AppliedMove {
    /// Restores the touched sessions' previous time slots.
    pub fn revert(self, solution: &mut Solution) {
        for &(index, slot) in self.previous[..self.len].iter().rev() {
            if let Some(session) = solution.sessions.get_mut(index) {
                session.assignment.time_slot = slot;
            }
        }
        solution.score = None;
    }
}

impl Move {
    /// Index of the primary session.
    pub fn session(&self) -> usize {
        match *self {
            Move::ChangeTime { session, .. } | Move::ChangeDay { session, .. } => session,
            Move::Swap { first, .. } => first,
        }
    }

    /// Slot the primary session ends up in.
    pub fn destination(&self, solution: &Solution) -> Option<TimeSlotId> {
        match *self {
            Move::ChangeTime { time_slot, .. } | Move::ChangeDay { time_slot, .. } => {
                Some(time_slot)
            }
            Move::Swap { second, .. } => solution
                .sessions
                .get(second)
                .and_then(|s| s.assignment.time_slot),
        }
    }

    /// Tabu bookkeeping key: `sessionIndex-day-start`.
    ///
    /// Two moves with the same signature put the same session at the same
    /// day and start time; their effect on other sessions may differ.
    pub fn signature(&self, solution: &Solution) -> String {
        match self
            .destination(solution)
            .and_then(|id| solution.facts.time_slot(id))
        {
            Some(slot) => format!("{}-{}-{}", self.session(), slot.day, slot.start_min),
            None => format!("{}-unassigned", self.session()),
        }
    }

    /// Applies the move in place and invalidates the cached score.
    pub fn apply(&self, solution: &mut Solution) -> AppliedMove {
        solution.score = None;
        match *self {
            Move::ChangeTime { session, time_slot } | Move::ChangeDay { session, time_slot } => {
                let previous = solution
                    .sessions
                    .get_mut(session)
                    .and_then(|s| std::mem::replace(&mut s.assignment.time_slot, Some(time_slot)));
                AppliedMove {
                    previous: [(session, previous), (session, previous)],
                    len: 1,
                }
            }
            Move::Swap { first, second } => {
                let a = solution.sessions.get(first).map(|s| s.assignment.time_slot);
                let b = solution.sessions.get(second).map(|s| s.assignment.time_slot);
                match (a, b) {
                    (Some(a), Some(b)) => {
                        solution.sessions[first].assignment.time_slot = b;
                        solution.sessions[second].assignment.time_slot = a;
                        AppliedMove {
                            previous: [(first, a), (second, b)],
                            len: 2,
                        }
                    }
                    _ => AppliedMove {
                        previous: [(first, None), (second, None)],
                        len: 0,
                    },
                }
            }
        }
    }
}

/// Draws one random move, or `None` if nothing can move.
pub fn random_move<R: Rng + ?Sized>(solution: &Solution, rng: &mut R) -> Option<Move> {
    let movable = solution.movable_indices();
    let &session = movable.choose(rng)?;
    if solution.facts.time_slots.is_empty() {
        return None;
    }

    let drawn = match rng.random_range(0..3) {
        0 => change_time(solution, session, rng),
        1 => change_day(solution, session, rng),
        _ => swap(&movable, session, rng),
    };
    drawn.or_else(|| any_other_slot(solution, session, rng))
}

/// Returns a copy of `solution` with one random move applied.
pub fn neighbor<R: Rng + ?Sized>(solution: &Solution, rng: &mut R) -> Solution {
    let mut next = solution.clone();
    if let Some(mv) = random_move(solution, rng) {
        let _ = mv.apply(&mut next);
    }
    next
}

/// Draws `k` independent candidate moves without applying them.
pub fn neighborhood<R: Rng + ?Sized>(solution: &Solution, k: usize, rng: &mut R) -> Vec<Move> {
    (0..k).filter_map(|_| random_move(solution, rng)).collect()
}

fn change_time<R: Rng + ?Sized>(solution: &Solution, session: usize, rng: &mut R) -> Option<Move> {
    let current = solution.sessions[session].assignment.time_slot;
    let day = solution.time_slot_of(session)?.day;
    let candidates: Vec<TimeSlotId> = solution
        .facts
        .slots_on_day(day)
        .into_iter()
        .filter(|&id| Some(id) != current)
        .collect();
    let &time_slot = candidates.choose(rng)?;
    Some(Move::ChangeTime { session, time_slot })
}

fn change_day<R: Rng + ?Sized>(solution: &Solution, session: usize, rng: &mut R) -> Option<Move> {
    let current = solution.time_slot_of(session)?;
    let other_days: Vec<_> = solution
        .facts
        .days()
        .into_iter()
        .filter(|&d| d != current.day)
        .collect();
    let &day = other_days.choose(rng)?;
    let on_day = solution.facts.slots_on_day(day);
    let same_period = on_day
        .iter()
        .copied()
        .find(|&id| solution.facts.time_slots[id.0].period == current.period);
    let time_slot = match same_period {
        Some(id) => id,
        None => *on_day.choose(rng)?,
    };
    Some(Move::ChangeDay { session, time_slot })
}

fn swap<R: Rng + ?Sized>(movable: &[usize], session: usize, rng: &mut R) -> Option<Move> {
    let others: Vec<usize> = movable.iter().copied().filter(|&i| i != session).collect();
    let &second = others.choose(rng)?;
    Some(Move::Swap {
        first: session,
        second,
    })
}

fn any_other_slot<R: Rng + ?Sized>(
    solution: &Solution,
    session: usize,
    rng: &mut R,
) -> Option<Move> {
    let current = solution.sessions[session].assignment.time_slot;
    let candidates: Vec<TimeSlotId> = (0..solution.facts.time_slots.len())
        .map(TimeSlotId)
        .filter(|&id| Some(id) != current)
        .collect();
    let &time_slot = candidates.choose(rng)?;
    Some(Move::ChangeTime { session, time_slot })
}
