//! High-level entry point: pick an algorithm, run it, accept the outcome.
//!
//! # Acceptance
//!
//! Strategies always return their best solution, feasible or not. What to
//! do with an infeasible one is decided here:
//!
//! - [`AcceptanceMode::Strict`]: any hard violation is an error.
//! - [`AcceptanceMode::Partial`]: the result is kept and handed to the
//!   [`ConflictAnalyzer`] so the remaining problems can be fixed by hand.

use std::fmt;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::OptimizerConfig;
use crate::conflict::{Conflict, ConflictAnalyzer};
use crate::error::OptimizeError;
use crate::ga::GeneticAlgorithm;
use crate::models::Solution;
use crate::search::{
    make_rng, IslandCoordinator, OptimizationResult, SearchControl, SimulatedAnnealing, Strategy,
    TabuSearch,
};

/// Search algorithm selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    Annealing,
    Tabu,
    Genetic,
    /// All of the above in parallel, best result wins.
    Islands,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Annealing => write!(f, "annealing"),
            Algorithm::Tabu => write!(f, "tabu"),
            Algorithm::Genetic => write!(f, "genetic"),
            Algorithm::Islands => write!(f, "islands"),
        }
    }
}

/// How an infeasible result is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AcceptanceMode {
    /// Reject results with hard violations.
    Strict,
    /// Keep results with hard violations and diagnose them.
    #[default]
    Partial,
}

/// An accepted result with its diagnosis.
#[derive(Debug, Clone)]
pub struct Accepted {
    pub result: OptimizationResult,
    /// Conflicts remaining in `result.solution`, most urgent first.
    pub conflicts: Vec<Conflict>,
    /// Percentage of fully assigned sessions.
    pub completion: f64,
}

impl Accepted {
    /// Conflicts that prevent a valid timetable.
    pub fn blocking_conflicts(&self) -> impl Iterator<Item = &Conflict> {
        self.conflicts.iter().filter(|c| c.blocking)
    }
}

/// Facade over all strategies.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use u_timetable::models::{
///     Course, Day, ProblemFacts, Room, Session, Solution, Teacher, TimeSlot,
/// };
/// use u_timetable::optimizer::{Algorithm, Optimizer};
/// use u_timetable::scheduler::InitialAssigner;
///
/// let mut facts = ProblemFacts::new();
/// let t = facts.add_teacher(Teacher::new("Kim"));
/// facts.add_room(Room::classroom("101").with_capacity(30));
/// for slot in TimeSlot::weekly_grid(&Day::WEEKDAYS, 2, 480, 45, 5) {
///     facts.add_time_slot(slot);
/// }
/// let course = facts.add_course(Course::new("MATH1").with_teacher(t));
/// let sessions = (0..3).map(|i| Session::new(format!("S{i}"), course)).collect();
///
/// let initial = InitialAssigner::new().greedy(&Solution::new(Arc::new(facts), sessions));
/// let optimizer = Optimizer::new(None);
/// let accepted = optimizer.optimize(Algorithm::Tabu, &initial).unwrap();
/// assert_eq!(accepted.completion, 100.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Optimizer {
    config: OptimizerConfig,
}

impl Optimizer {
    /// Creates an optimizer; `None` uses all defaults.
    pub fn new(config: Option<OptimizerConfig>) -> Self {
        Self {
            config: config.unwrap_or_default(),
        }
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Builds the configured strategy for `algorithm`.
    pub fn strategy(&self, algorithm: Algorithm) -> Box<dyn Strategy> {
        match algorithm {
            Algorithm::Annealing => {
                Box::new(SimulatedAnnealing::new(self.config.annealing_or_default()))
            }
            Algorithm::Tabu => Box::new(TabuSearch::new(self.config.tabu_or_default())),
            Algorithm::Genetic => Box::new(GeneticAlgorithm::new(self.config.genetic_or_default())),
            Algorithm::Islands => {
                Box::new(IslandCoordinator::new(self.config.islands_or_default()))
            }
        }
    }

    /// Runs `algorithm` to completion with its configured seed.
    pub fn run(
        &self,
        algorithm: Algorithm,
        initial: &Solution,
    ) -> Result<OptimizationResult, OptimizeError> {
        let strategy = self.strategy(algorithm);
        let mut rng = make_rng(strategy.seed());
        Self::execute(algorithm, strategy.as_ref(), initial, &mut rng, &SearchControl::new())
    }

    /// Runs `algorithm` with a caller-supplied random source and control.
    pub fn run_with(
        &self,
        algorithm: Algorithm,
        initial: &Solution,
        rng: &mut dyn RngCore,
        control: &SearchControl,
    ) -> Result<OptimizationResult, OptimizeError> {
        Self::execute(algorithm, self.strategy(algorithm).as_ref(), initial, rng, control)
    }

    fn execute(
        algorithm: Algorithm,
        strategy: &dyn Strategy,
        initial: &Solution,
        rng: &mut dyn RngCore,
        control: &SearchControl,
    ) -> Result<OptimizationResult, OptimizeError> {
        info!(%algorithm, sessions = initial.len(), "optimization requested");
        strategy.optimize_with_rng(initial, rng, control)
    }

    /// Applies the configured acceptance mode to `result`.
    ///
    /// # Errors
    /// [`OptimizeError::Infeasible`] in strict mode when the result has hard
    /// violations.
    pub fn accept(&self, result: OptimizationResult) -> Result<Accepted, OptimizeError> {
        let hard = result.final_score.hard_penalty;
        let mode = self.config.acceptance_or_default();
        if mode == AcceptanceMode::Strict && hard > 0 {
            warn!(hard_violations = hard, "strict acceptance rejected result");
            return Err(OptimizeError::Infeasible {
                hard_violations: hard,
            });
        }

        let analyzer = ConflictAnalyzer::new();
        let conflicts = analyzer.analyze(&result.solution);
        let completion = analyzer.completion_percentage(&result.solution);
        info!(
            ?mode,
            hard_violations = hard,
            conflicts = conflicts.len(),
            completion,
            "result accepted"
        );
        Ok(Accepted {
            result,
            conflicts,
            completion,
        })
    }

    /// [`run`](Self::run) followed by [`accept`](Self::accept).
    pub fn optimize(
        &self,
        algorithm: Algorithm,
        initial: &Solution,
    ) -> Result<Accepted, OptimizeError> {
        let result = self.run(algorithm, initial)?;
        self.accept(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conflict::ConflictType;
    use crate::fixtures::toy;
    use crate::ga::GeneticConfig;
    use crate::search::island::COORDINATOR_NAME;
    use crate::search::{AnnealingConfig, IslandConfig, TabuConfig};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn quick_config() -> OptimizerConfig {
        OptimizerConfig::default()
            .with_annealing(AnnealingConfig::default().with_seed(1).with_max_iterations(3000))
            .with_tabu(TabuConfig::default().with_seed(2).with_max_iterations(300))
            .with_genetic(
                GeneticConfig::default()
                    .with_seed(3)
                    .with_population_size(20)
                    .with_generations(20),
            )
            .with_islands(
                IslandConfig::default()
                    .with_seed(4)
                    .with_num_islands(3)
                    .with_iterations_per_island(500),
            )
    }

    #[test]
    fn test_every_algorithm_runs() {
        let optimizer = Optimizer::new(Some(quick_config()));
        let initial = toy();
        for algorithm in [
            Algorithm::Annealing,
            Algorithm::Tabu,
            Algorithm::Genetic,
            Algorithm::Islands,
        ] {
            let result = optimizer.run(algorithm, &initial).unwrap();
            assert!(result.final_energy() <= 1200.0, "{algorithm}");
            assert_eq!(result.solution.len(), initial.len());
        }
        assert_eq!(
            optimizer.run(Algorithm::Islands, &initial).unwrap().algorithm,
            COORDINATOR_NAME
        );
    }

    #[test]
    fn test_none_config_uses_defaults() {
        let optimizer = Optimizer::new(None);
        assert_eq!(optimizer.config(), &OptimizerConfig::default());
        assert_eq!(optimizer.strategy(Algorithm::Tabu).name(), "Tabu Search");
    }

    #[test]
    fn test_strict_rejects_infeasible() {
        let optimizer = Optimizer::new(Some(
            OptimizerConfig::default().with_acceptance(AcceptanceMode::Strict),
        ));
        let mut rng = StdRng::seed_from_u64(0);
        let result = optimizer
            .run_with(Algorithm::Tabu, &toy(), &mut rng, &cancelled())
            .unwrap();
        assert!(result.final_score.hard_penalty > 0);

        let err = optimizer.accept(result).unwrap_err();
        assert!(matches!(
            err,
            OptimizeError::Infeasible { hard_violations } if hard_violations > 0
        ));
    }

    #[test]
    fn test_partial_keeps_infeasible_and_diagnoses() {
        let optimizer = Optimizer::new(None);
        let mut rng = StdRng::seed_from_u64(0);
        let result = optimizer
            .run_with(Algorithm::Annealing, &toy(), &mut rng, &cancelled())
            .unwrap();

        let accepted = optimizer.accept(result).unwrap();
        assert_eq!(accepted.completion, 100.0);
        assert!(accepted.blocking_conflicts().count() > 0);
        assert!(accepted
            .conflicts
            .iter()
            .any(|c| c.conflict_type == ConflictType::TeacherDoubleBooking));
    }

    #[test]
    fn test_invalid_config_surfaces_at_run() {
        let optimizer = Optimizer::new(Some(
            OptimizerConfig::default()
                .with_annealing(AnnealingConfig::default().with_cooling_rate(2.0)),
        ));
        let err = optimizer.run(Algorithm::Annealing, &toy()).unwrap_err();
        assert!(matches!(err, OptimizeError::InvalidConfig(_)));
    }

    #[test]
    fn test_seeded_run_is_reproducible() {
        let optimizer = Optimizer::new(Some(quick_config()));
        let initial = toy();
        for algorithm in [Algorithm::Annealing, Algorithm::Tabu, Algorithm::Genetic] {
            let first = optimizer.run(algorithm, &initial).unwrap();
            let second = optimizer.run(algorithm, &initial).unwrap();
            assert_eq!(first.final_energy(), second.final_energy(), "{algorithm}");
            assert_eq!(first.history, second.history, "{algorithm}");
            assert_eq!(first.iterations, second.iterations, "{algorithm}");
        }
    }

    #[test]
    fn test_run_matches_run_with_on_the_configured_seed() {
        let optimizer = Optimizer::new(Some(quick_config()));
        let initial = toy();
        let via_run = optimizer.run(Algorithm::Tabu, &initial).unwrap();
        let mut rng = make_rng(Some(2));
        let via_run_with = optimizer
            .run_with(Algorithm::Tabu, &initial, &mut rng, &SearchControl::new())
            .unwrap();
        assert_eq!(via_run.history, via_run_with.history);
        assert_eq!(via_run.final_energy(), via_run_with.final_energy());
    }

    fn cancelled() -> SearchControl {
        let control = SearchControl::new();
        control.cancel();
        control
    }
}
