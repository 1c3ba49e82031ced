//! Single-trajectory searches and the parallel island coordinator.
//!
//! Every strategy implements [`Strategy`]: it takes an initial solution, an
//! injectable random source, and a [`SearchControl`] that is polled once per
//! iteration (or generation). Stopping early is not an error; the strategy
//! returns its best-so-far with the matching [`StopReason`].
//!
//! # Submodules
//!
//! - [`annealing`]: Simulated annealing with reheating
//! - [`tabu`]: Tabu search with dynamic tenure
//! - [`island`]: Parallel restarts over mixed strategies
//!
//! The genetic algorithm lives in [`crate::ga`].

pub mod annealing;
pub mod island;
pub mod tabu;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::OptimizeError;
use crate::models::{Score, Solution};
use crate::validation::validate_solution;

pub use annealing::{AnnealingConfig, AnnealingTrace, SimulatedAnnealing};
pub use island::{
    CoordinatorReport, IslandConfig, IslandCoordinator, IslandReport, IslandStatus, IslandStrategy,
};
pub use tabu::{TabuConfig, TabuSearch, TabuStep, TabuTrace};

/// Cooperative stop signal shared between a caller and a running search.
///
/// Clones share the same flag. A [`child`](Self::child) gets its own flag
/// but also observes every ancestor's flag and inherits the deadline.
#[derive(Debug, Clone, Default)]
pub struct SearchControl {
    /// Own flag first, then ancestors.
    flags: Vec<Arc<AtomicBool>>,
    deadline: Option<Instant>,
}

impl SearchControl {
    /// Creates a control that never fires on its own.
    pub fn new() -> Self {
        Self {
            flags: vec![Arc::new(AtomicBool::new(false))],
            deadline: None,
        }
    }

    /// Stops at `deadline`.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    /// Stops after `limit` from now. A limit past the representable range
    /// of [`Instant`] adds no deadline.
    pub fn with_time_limit(self, limit: Duration) -> Self {
        match Instant::now().checked_add(limit) {
            Some(deadline) => self.with_deadline(deadline),
            None => self,
        }
    }

    /// A control that can be cancelled alone but also stops with `self`.
    pub fn child(&self) -> Self {
        let mut flags = Vec::with_capacity(self.flags.len() + 1);
        flags.push(Arc::new(AtomicBool::new(false)));
        flags.extend(self.flags.iter().cloned());
        Self {
            flags,
            deadline: self.deadline,
        }
    }

    /// Requests a stop. Descendants observe it; ancestors do not.
    pub fn cancel(&self) {
        if let Some(own) = self.flags.first() {
            own.store(true, Ordering::Relaxed);
        }
    }

    /// Whether this control or any ancestor was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.flags.iter().any(|f| f.load(Ordering::Relaxed))
    }

    /// Deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns the reason to stop now, if any.
    #[inline]
    pub fn check(&self) -> Option<StopReason> {
        if self.is_cancelled() {
            return Some(StopReason::Cancelled);
        }
        match self.deadline {
            Some(d) if Instant::now() >= d => Some(StopReason::DeadlineReached),
            _ => None,
        }
    }
}

/// Why a search returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// The full iteration or generation budget was spent.
    Completed,
    /// Annealing temperature fell below its minimum.
    Frozen,
    /// Cancelled through [`SearchControl`].
    Cancelled,
    /// The control's deadline passed.
    DeadlineReached,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Completed => write!(f, "Completed"),
            StopReason::Frozen => write!(f, "Frozen"),
            StopReason::Cancelled => write!(f, "Cancelled"),
            StopReason::DeadlineReached => write!(f, "Deadline Reached"),
        }
    }
}

/// Outcome of one optimization run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Display name of the algorithm that produced this result.
    pub algorithm: String,
    /// Score of the input solution.
    pub initial_score: Score,
    /// Score of [`solution`](Self::solution).
    pub final_score: Score,
    /// `(initial - final) / initial * 100` on energies; 0 if initial is 0.
    pub improvement_percentage: f64,
    /// Iterations (or generations) executed.
    pub iterations: usize,
    /// Wall-clock time.
    pub duration: Duration,
    /// Best solution found.
    pub solution: Solution,
    /// Current energy per iteration (best energy per generation for GA).
    pub history: Vec<f64>,
    /// Best-so-far energy per iteration.
    pub best_history: Vec<f64>,
    /// Why the run ended.
    pub stop_reason: StopReason,
}

impl OptimizationResult {
    /// Energy of the final score.
    #[inline]
    pub fn final_energy(&self) -> f64 {
        self.final_score.energy()
    }

    /// Whether the result has no hard violations.
    #[inline]
    pub fn is_feasible(&self) -> bool {
        self.final_score.is_feasible()
    }
}

/// Relative energy reduction in percent.
pub fn improvement_percentage(initial: &Score, final_score: &Score) -> f64 {
    let before = initial.energy();
    if before <= 0.0 {
        return 0.0;
    }
    (before - final_score.energy()) / before * 100.0
}

/// Which strategy family an island runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyKind {
    Annealing,
    Tabu,
    Genetic,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Annealing => write!(f, "Simulated Annealing"),
            StrategyKind::Tabu => write!(f, "Tabu Search"),
            StrategyKind::Genetic => write!(f, "Genetic Algorithm"),
        }
    }
}

/// A timetable search strategy.
pub trait Strategy: Send + Sync {
    /// Display name stored in [`OptimizationResult::algorithm`].
    fn name(&self) -> &str;

    /// Seed used by [`optimize`](Self::optimize); `None` draws from the OS.
    fn seed(&self) -> Option<u64>;

    /// Runs the search with a caller-supplied random source.
    ///
    /// # Errors
    /// [`OptimizeError::InvalidSolution`] if `initial` fails validation,
    /// [`OptimizeError::InvalidConfig`] if the configuration is out of range.
    fn optimize_with_rng(
        &self,
        initial: &Solution,
        rng: &mut dyn RngCore,
        control: &SearchControl,
    ) -> Result<OptimizationResult, OptimizeError>;

    /// Runs the search to completion with the configured seed.
    fn optimize(&self, initial: &Solution) -> Result<OptimizationResult, OptimizeError> {
        let mut rng = make_rng(self.seed());
        self.optimize_with_rng(initial, &mut rng, &SearchControl::new())
    }
}

/// Seeded `StdRng`, or one seeded from the OS when `seed` is `None`.
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    }
}

/// Rejects structurally broken input before any search state exists.
pub(crate) fn check_input(solution: &Solution) -> Result<(), OptimizeError> {
    validate_solution(solution).map_err(OptimizeError::InvalidSolution)
}
