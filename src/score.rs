//! Score (energy) evaluation.
//!
//! # Hard component
//!
//! Sessions are bucketed by `(teacher, day, start)` and by `(room, day, start)`.
//! A bucket with `n > 1` sessions contributes `n - 1` violations. A session
//! whose roster exceeds a known room capacity contributes one violation, and
//! so does a lunch session placed outside its lunch period.
//!
//! # Soft component
//!
//! Standard deviation of sessions-per-teacher over the teachers that carry
//! at least one session.
//!
//! The energy is `hard * HARD_WEIGHT + soft * SOFT_WEIGHT`, minimized.
//! Evaluation is a pure function of the solution.

use std::collections::HashMap;

use crate::models::{Day, Score, Solution};

pub use crate::models::{HARD_WEIGHT, SOFT_WEIGHT};

/// Stateless solution evaluator.
#[derive(Debug, Clone, Copy, Default)]
pub struct Evaluator;

impl Evaluator {
    /// Creates an evaluator.
    pub fn new() -> Self {
        Self
    }

    /// Computes the score of `solution`.
    pub fn evaluate(&self, solution: &Solution) -> Score {
        Score::new(self.hard_violations(solution), self.workload_deviation(solution))
    }

    /// Weighted energy of `solution`.
    #[inline]
    pub fn energy(&self, solution: &Solution) -> f64 {
        self.evaluate(solution).energy()
    }

    /// Returns `solution` with its cached score refreshed.
    pub fn scored(&self, mut solution: Solution) -> Solution {
        solution.score = Some(self.evaluate(&solution));
        solution
    }

    /// Hard rule breaks.
    pub fn hard_violations(&self, solution: &Solution) -> u32 {
        let facts = &solution.facts;
        let mut teacher_index: HashMap<(usize, Day, u32), u32> = HashMap::new();
        let mut room_index: HashMap<(usize, Day, u32), u32> = HashMap::new();
        let mut violations = 0u32;

        for session in &solution.sessions {
            let slot = match session.assignment.time_slot.and_then(|id| facts.time_slot(id)) {
                Some(slot) => slot,
                None => continue,
            };

            if let Some(t) = session.assignment.teacher {
                *teacher_index.entry((t.0, slot.day, slot.start_min)).or_insert(0) += 1;
            }
            if let Some(r) = session.assignment.room {
                *room_index.entry((r.0, slot.day, slot.start_min)).or_insert(0) += 1;
                if let Some(room) = facts.room(r) {
                    if !room.fits(session.roster_size) {
                        violations += 1;
                    }
                }
            }
            if let Some(period) = session.lunch_period {
                if slot.period != period {
                    violations += 1;
                }
            }
        }

        let double_booked: u32 = teacher_index
            .values()
            .chain(room_index.values())
            .filter(|&&n| n > 1)
            .map(|&n| n - 1)
            .sum();

        violations + double_booked
    }

    /// Standard deviation of per-teacher session counts.
    pub fn workload_deviation(&self, solution: &Solution) -> f64 {
        let loads = solution.teacher_loads();
        if loads.is_empty() {
            return 0.0;
        }
        let n = loads.len() as f64;
        let mean = loads.values().map(|&l| l as f64).sum::<f64>() / n;
        let variance = loads
            .values()
            .map(|&l| {
                let d = l as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / n;
        variance.sqrt()
    }
}
