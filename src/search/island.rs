//! Parallel island coordinator.
//!
//! Runs several independent strategy instances on the same initial
//! timetable, one OS thread per island, and keeps the lowest-energy result.
//! Islands never exchange individuals: this is a parallel-restart portfolio
//! over mixed strategies, not a migrating island model.
//!
//! # Island assignment
//!
//! Island `i` runs `rotation[i % rotation.len()]` (default: annealing, tabu,
//! genetic) with parameters perturbed by `i`:
//!
//! | Kind | Perturbation |
//! |------|--------------|
//! | Annealing | `T0 = 1000 + 100 i` |
//! | Tabu | `initial_tenure = 7 + i` |
//! | Genetic | `mutation_rate = 0.1 + 0.02 i`, population 50, `iterations / 50` generations |
//!
//! # Failure handling
//!
//! An island that returns an error, panics, or misses the timeout is logged
//! and dropped; siblings are unaffected. Late islands are cancelled through
//! their [`SearchControl`] and joined before the coordinator returns. Island
//! controls carry no deadline of their own: only a result received before
//! the timeout counts, and a result that stopped on an inherited deadline
//! is reported as timed out.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::annealing::{AnnealingConfig, SimulatedAnnealing};
use super::tabu::{TabuConfig, TabuSearch};
use super::{
    check_input, improvement_percentage, make_rng, OptimizationResult, SearchControl, StopReason,
    Strategy, StrategyKind,
};
use crate::error::OptimizeError;
use crate::ga::{GeneticAlgorithm, GeneticConfig};
use crate::models::Solution;
use crate::score::Evaluator;

/// Algorithm name stamped on the coordinator's result.
pub const COORDINATOR_NAME: &str = "Island Model (Parallel)";

/// Coordinator parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IslandConfig {
    pub num_islands: usize,
    /// Iteration budget of each annealing or tabu island; genetic islands
    /// get `iterations_per_island / 50` generations.
    pub iterations_per_island: usize,
    /// Wall-clock budget shared by all islands.
    pub timeout_seconds: u64,
    /// Strategy kinds assigned round-robin by island id.
    pub rotation: Vec<StrategyKind>,
    /// Base seed; island `i` uses `seed + i`.
    pub seed: Option<u64>,
}

impl Default for IslandConfig {
    fn default() -> Self {
        Self {
            num_islands: 4,
            iterations_per_island: 2000,
            timeout_seconds: 60,
            rotation: vec![
                StrategyKind::Annealing,
                StrategyKind::Tabu,
                StrategyKind::Genetic,
            ],
            seed: None,
        }
    }
}

impl IslandConfig {
    pub fn with_num_islands(mut self, n: usize) -> Self {
        self.num_islands = n;
        self
    }

    pub fn with_iterations_per_island(mut self, n: usize) -> Self {
        self.iterations_per_island = n;
        self
    }

    pub fn with_timeout_seconds(mut self, secs: u64) -> Self {
        self.timeout_seconds = secs;
        self
    }

    pub fn with_rotation(mut self, rotation: Vec<StrategyKind>) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks parameter ranges.
    pub fn validate(&self) -> Result<(), OptimizeError> {
        if self.num_islands == 0 {
            return Err(OptimizeError::InvalidConfig(
                "num_islands must be at least 1".into(),
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(OptimizeError::InvalidConfig(
                "timeout_seconds must be at least 1".into(),
            ));
        }
        if self.rotation.is_empty() {
            return Err(OptimizeError::InvalidConfig(
                "rotation must name at least one strategy".into(),
            ));
        }
        Ok(())
    }
}

/// The strategy one island runs.
#[derive(Debug, Clone)]
pub enum IslandStrategy {
    Annealing(SimulatedAnnealing),
    Tabu(TabuSearch),
    Genetic(GeneticAlgorithm),
}

impl IslandStrategy {
    /// Builds island `id` from the rotation and its perturbation rule.
    pub fn for_island(id: usize, config: &IslandConfig) -> Self {
        let kind = config
            .rotation
            .get(id % config.rotation.len().max(1))
            .copied()
            .unwrap_or(StrategyKind::Annealing);
        let iterations = config.iterations_per_island;

        match kind {
            StrategyKind::Annealing => Self::Annealing(SimulatedAnnealing::new(
                AnnealingConfig::default()
                    .with_initial_temperature(1000.0 + id as f64 * 100.0)
                    .with_max_iterations(iterations),
            )),
            StrategyKind::Tabu => Self::Tabu(TabuSearch::new(
                TabuConfig::default()
                    .with_initial_tenure(7 + id)
                    .with_tenure_bounds(3, 20)
                    .with_neighborhood_size(20)
                    .with_max_iterations(iterations),
            )),
            StrategyKind::Genetic => Self::Genetic(GeneticAlgorithm::new(
                GeneticConfig::default()
                    .with_population_size(50)
                    .with_generations((iterations / 50).max(1))
                    .with_mutation_rate(0.1 + id as f64 * 0.02)
                    .with_elitism_rate(0.1)
                    .with_tournament_size(3),
            )),
        }
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::Annealing(_) => StrategyKind::Annealing,
            Self::Tabu(_) => StrategyKind::Tabu,
            Self::Genetic(_) => StrategyKind::Genetic,
        }
    }

    pub fn strategy(&self) -> &dyn Strategy {
        match self {
            Self::Annealing(s) => s,
            Self::Tabu(s) => s,
            Self::Genetic(s) => s,
        }
    }
}

/// How one island ended.
#[derive(Debug, Clone, PartialEq)]
pub enum IslandStatus {
    /// Returned a result with this final energy.
    Completed { energy: f64 },
    /// Returned an error or panicked.
    Failed(String),
    /// Missed the coordinator's deadline.
    TimedOut,
}

/// Per-island line of a [`CoordinatorReport`].
#[derive(Debug, Clone, PartialEq)]
pub struct IslandReport {
    pub id: usize,
    pub kind: StrategyKind,
    pub status: IslandStatus,
}

/// Outcome of a coordinator run.
#[derive(Debug, Clone)]
pub struct CoordinatorReport {
    /// Lowest-energy surviving result, relabeled; `None` if no island survived.
    pub best: Option<OptimizationResult>,
    /// One entry per island, by id.
    pub islands: Vec<IslandReport>,
}

impl CoordinatorReport {
    /// Number of islands that completed.
    pub fn survivors(&self) -> usize {
        self.islands
            .iter()
            .filter(|r| matches!(r.status, IslandStatus::Completed { .. }))
            .count()
    }
}

type IslandOutcome = Result<OptimizationResult, String>;

/// Runs islands in parallel and keeps the best result.
#[derive(Debug, Clone)]
pub struct IslandCoordinator {
    config: IslandConfig,
    islands: Option<Vec<IslandStrategy>>,
    timeout: Option<Duration>,
}

impl Default for IslandCoordinator {
    fn default() -> Self {
        Self::new(IslandConfig::default())
    }
}

impl IslandCoordinator {
    pub fn new(config: IslandConfig) -> Self {
        Self {
            config,
            islands: None,
            timeout: None,
        }
    }

    /// Replaces the rotation-built islands with an explicit list.
    pub fn with_islands(mut self, islands: Vec<IslandStrategy>) -> Self {
        self.islands = Some(islands);
        self
    }

    /// Overrides `timeout_seconds` with a finer-grained budget.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn config(&self) -> &IslandConfig {
        &self.config
    }

    /// Islands this coordinator will launch.
    pub fn islands(&self) -> Vec<IslandStrategy> {
        match &self.islands {
            Some(islands) => islands.clone(),
            None => (0..self.config.num_islands)
                .map(|id| IslandStrategy::for_island(id, &self.config))
                .collect(),
        }
    }

    fn timeout(&self) -> Duration {
        self.timeout
            .unwrap_or_else(|| Duration::from_secs(self.config.timeout_seconds))
    }

    /// Runs all islands with the configured seed.
    pub fn run(&self, initial: &Solution) -> Result<CoordinatorReport, OptimizeError> {
        self.run_with_control(initial, self.config.seed, &SearchControl::new())
    }

    /// Runs all islands under `control`.
    ///
    /// Island `i` is seeded with `base_seed + i`, or from the OS when
    /// `base_seed` is `None`.
    ///
    /// # Errors
    /// Invalid input or configuration. Island failures are reported in the
    /// [`CoordinatorReport`], not as errors.
    pub fn run_with_control(
        &self,
        initial: &Solution,
        base_seed: Option<u64>,
        control: &SearchControl,
    ) -> Result<CoordinatorReport, OptimizeError> {
        check_input(initial)?;
        self.config.validate()?;

        let islands = self.islands();
        let start = Instant::now();
        // A timeout too large to represent as an instant means no timeout.
        let deadline = start.checked_add(self.timeout());
        let initial_score = Evaluator::new().evaluate(initial);
        let controls: Vec<SearchControl> = islands.iter().map(|_| control.child()).collect();

        info!(
            islands = islands.len(),
            initial_energy = initial_score.energy(),
            timeout = ?self.timeout(),
            "island coordinator started"
        );

        let outcomes = thread::scope(|scope| {
            let (tx, rx) = mpsc::channel::<(usize, IslandOutcome)>();

            for (id, (island, island_control)) in islands.iter().zip(&controls).enumerate() {
                let seed = base_seed.map(|s| s.wrapping_add(id as u64));
                let thread_tx = tx.clone();
                let spawned = thread::Builder::new()
                    .name(format!("island-{id}"))
                    .spawn_scoped(scope, move || {
                        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                            let mut rng = make_rng(seed);
                            island
                                .strategy()
                                .optimize_with_rng(initial, &mut rng, island_control)
                        }));
                        let outcome = match outcome {
                            Ok(Ok(result)) => Ok(result),
                            Ok(Err(e)) => Err(e.to_string()),
                            Err(payload) => Err(panic_message(payload.as_ref())),
                        };
                        let _ = thread_tx.send((id, outcome));
                    });
                if let Err(e) = spawned {
                    let _ = tx.send((id, Err(format!("failed to spawn island thread: {e}"))));
                }
            }
            drop(tx);

            let mut outcomes: Vec<Option<IslandOutcome>> =
                (0..islands.len()).map(|_| None).collect();
            let mut pending = islands.len();
            while pending > 0 {
                let received = match deadline {
                    Some(deadline) => {
                        rx.recv_timeout(deadline.saturating_duration_since(Instant::now()))
                    }
                    None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
                };
                match received {
                    Ok((id, outcome)) => {
                        if outcomes[id].is_none() {
                            pending -= 1;
                        }
                        outcomes[id] = Some(outcome);
                    }
                    Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }

            for (slot, island_control) in outcomes.iter().zip(&controls) {
                if slot.is_none() {
                    island_control.cancel();
                }
            }
            outcomes
        });

        let mut reports = Vec::with_capacity(islands.len());
        let mut best: Option<OptimizationResult> = None;
        for (id, (island, outcome)) in islands.iter().zip(outcomes).enumerate() {
            let kind = island.kind();
            let status = match outcome {
                Some(Ok(result)) if result.stop_reason == StopReason::DeadlineReached => {
                    warn!(island = id, %kind, "island stopped at the deadline");
                    IslandStatus::TimedOut
                }
                Some(Ok(result)) => {
                    let energy = result.final_energy();
                    info!(island = id, %kind, energy, "island completed");
                    if best
                        .as_ref()
                        .map_or(true, |b| energy < b.final_energy())
                    {
                        best = Some(result);
                    }
                    IslandStatus::Completed { energy }
                }
                Some(Err(message)) => {
                    warn!(island = id, %kind, error = %message, "island failed");
                    IslandStatus::Failed(message)
                }
                None => {
                    warn!(island = id, %kind, "island timed out");
                    IslandStatus::TimedOut
                }
            };
            reports.push(IslandReport { id, kind, status });
        }

        let best = best.map(|mut result| {
            result.algorithm = COORDINATOR_NAME.to_string();
            result.duration = start.elapsed();
            result.initial_score = initial_score;
            result.improvement_percentage =
                improvement_percentage(&initial_score, &result.final_score);
            result
        });

        match &best {
            Some(result) => info!(
                final_energy = result.final_energy(),
                survivors = reports
                    .iter()
                    .filter(|r| matches!(r.status, IslandStatus::Completed { .. }))
                    .count(),
                duration = ?start.elapsed(),
                "island coordinator finished"
            ),
            None => warn!("no island produced a result"),
        }

        Ok(CoordinatorReport {
            best,
            islands: reports,
        })
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("island panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("island panicked: {s}")
    } else {
        "island panicked".to_string()
    }
}

impl Strategy for IslandCoordinator {
    fn name(&self) -> &str {
        COORDINATOR_NAME
    }

    fn seed(&self) -> Option<u64> {
        self.config.seed
    }

    /// Draws the base seed from `rng` when none is configured.
    ///
    /// # Errors
    /// [`OptimizeError::NoSurvivingIsland`] if every island failed.
    fn optimize_with_rng(
        &self,
        initial: &Solution,
        rng: &mut dyn RngCore,
        control: &SearchControl,
    ) -> Result<OptimizationResult, OptimizeError> {
        let base_seed = self.config.seed.unwrap_or_else(|| rng.next_u64());
        self.run_with_control(initial, Some(base_seed), control)?
            .best
            .ok_or(OptimizeError::NoSurvivingIsland)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::toy;

    fn quick() -> IslandConfig {
        IslandConfig::default()
            .with_iterations_per_island(500)
            .with_seed(42)
    }

    fn broken_ga() -> IslandStrategy {
        IslandStrategy::Genetic(GeneticAlgorithm::new(
            GeneticConfig::default().with_population_size(1),
        ))
    }

    #[test]
    fn test_config_defaults() {
        let cfg: IslandConfig = serde_json::from_str(r#"{"num_islands": 6}"#).unwrap();
        assert_eq!(cfg.num_islands, 6);
        assert_eq!(cfg.iterations_per_island, 2000);
        assert_eq!(cfg.timeout_seconds, 60);
        assert_eq!(cfg.rotation.len(), 3);
        assert!(IslandConfig::default().with_num_islands(0).validate().is_err());
        assert!(IslandConfig::default().with_rotation(vec![]).validate().is_err());
    }

    #[test]
    fn test_round_robin_assignment() {
        let coordinator = IslandCoordinator::new(IslandConfig::default());
        let kinds: Vec<_> = coordinator.islands().iter().map(|i| i.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                StrategyKind::Annealing,
                StrategyKind::Tabu,
                StrategyKind::Genetic,
                StrategyKind::Annealing
            ]
        );

        let custom = IslandConfig::default()
            .with_num_islands(2)
            .with_rotation(vec![StrategyKind::Genetic]);
        let kinds: Vec<_> = IslandCoordinator::new(custom)
            .islands()
            .iter()
            .map(|i| i.kind())
            .collect();
        assert_eq!(kinds, vec![StrategyKind::Genetic, StrategyKind::Genetic]);
    }

    #[test]
    fn test_island_perturbations() {
        let cfg = IslandConfig::default();
        match IslandStrategy::for_island(3, &cfg) {
            IslandStrategy::Annealing(sa) => {
                assert_eq!(sa.config().initial_temperature, 1300.0);
                assert_eq!(sa.config().max_iterations, 2000);
            }
            other => panic!("expected annealing, got {:?}", other.kind()),
        }
        match IslandStrategy::for_island(1, &cfg) {
            IslandStrategy::Tabu(ts) => assert_eq!(ts.config().initial_tenure, 8),
            other => panic!("expected tabu, got {:?}", other.kind()),
        }
        match IslandStrategy::for_island(2, &cfg) {
            IslandStrategy::Genetic(ga) => {
                assert!((ga.config().mutation_rate - 0.14).abs() < 1e-12);
                assert_eq!(ga.config().generations, 40);
                assert_eq!(ga.config().population_size, 50);
            }
            other => panic!("expected genetic, got {:?}", other.kind()),
        }
    }

    #[test]
    fn test_best_is_no_worse_than_any_survivor() {
        let report = IslandCoordinator::new(quick()).run(&toy()).unwrap();
        assert_eq!(report.islands.len(), 4);
        assert_eq!(report.survivors(), 4);

        let best = report.best.unwrap();
        assert_eq!(best.algorithm, COORDINATOR_NAME);
        for island in &report.islands {
            if let IslandStatus::Completed { energy } = island.status {
                assert!(best.final_energy() <= energy);
            }
        }
    }

    #[test]
    fn test_failed_island_is_dropped() {
        let sa = IslandStrategy::for_island(0, &quick());
        let report = IslandCoordinator::new(quick())
            .with_islands(vec![sa, broken_ga()])
            .run(&toy())
            .unwrap();
        assert!(matches!(report.islands[0].status, IslandStatus::Completed { .. }));
        assert!(matches!(report.islands[1].status, IslandStatus::Failed(_)));
        assert_eq!(report.survivors(), 1);
        assert!(report.best.is_some());
    }

    #[test]
    fn test_all_islands_failing_yields_no_result() {
        let coordinator =
            IslandCoordinator::new(quick()).with_islands(vec![broken_ga(), broken_ga()]);
        let report = coordinator.run(&toy()).unwrap();
        assert!(report.best.is_none());
        assert_eq!(report.survivors(), 0);

        let err = coordinator.optimize(&toy()).unwrap_err();
        assert!(matches!(err, OptimizeError::NoSurvivingIsland));
    }

    #[test]
    fn test_slow_island_times_out_and_is_cancelled() {
        let endless = IslandStrategy::Annealing(SimulatedAnnealing::new(
            AnnealingConfig::default()
                .with_cooling_rate(0.999_999)
                .with_max_iterations(usize::MAX),
        ));
        let started = Instant::now();
        let report = IslandCoordinator::new(quick())
            .with_islands(vec![endless])
            .with_timeout(Duration::from_millis(50))
            .run(&toy())
            .unwrap();
        assert_eq!(report.islands[0].status, IslandStatus::TimedOut);
        assert!(report.best.is_none());
        assert!(started.elapsed() < Duration::from_secs(30));
    }

    #[test]
    fn test_island_stopped_by_inherited_deadline_is_timed_out() {
        let endless = IslandStrategy::Annealing(SimulatedAnnealing::new(
            AnnealingConfig::default()
                .with_cooling_rate(0.999_999)
                .with_max_iterations(usize::MAX),
        ));
        let control = SearchControl::new().with_time_limit(Duration::from_millis(20));
        let report = IslandCoordinator::new(quick())
            .with_islands(vec![endless.clone(), endless])
            .run_with_control(&toy(), Some(1), &control)
            .unwrap();
        assert!(report
            .islands
            .iter()
            .all(|island| island.status == IslandStatus::TimedOut));
        assert!(report.best.is_none());
    }

    #[test]
    fn test_huge_timeout_means_no_deadline() {
        let config = quick().with_num_islands(2).with_timeout_seconds(u64::MAX);
        assert!(config.validate().is_ok());
        let report = IslandCoordinator::new(config).run(&toy()).unwrap();
        assert_eq!(report.survivors(), 2);
        assert!(report.best.is_some());

        let report = IslandCoordinator::new(quick().with_num_islands(1))
            .with_timeout(Duration::MAX)
            .run(&toy())
            .unwrap();
        assert_eq!(report.survivors(), 1);
    }

    #[test]
    fn test_invalid_input_rejected_before_spawning() {
        let mut bad = toy();
        bad.sessions[0].assignment.room = Some(crate::models::RoomId(99));
        assert!(matches!(
            IslandCoordinator::new(quick()).run(&bad),
            Err(OptimizeError::InvalidSolution(_))
        ));
    }
}
