//! Simulated annealing with adaptive reheating.
//!
//! Single-trajectory search over time-slot moves. A worsening neighbor is
//! accepted with the Metropolis probability `exp(-ΔE / T)`; improving and
//! equal-energy neighbors are always accepted. Temperature decays
//! geometrically.
//!
//! # Reheating
//!
//! After more than [`STAGNATION_LIMIT`] consecutive iterations without a new
//! best, the temperature jumps to `min(T * 1.5, T0 * 0.5)` and the cooling
//! rate is slowed by 5% (`1 - rate` shrinks by 5%). Outside reheats the
//! temperature strictly decreases.
//!
//! # Termination
//!
//! `T < min_temperature` ([`StopReason::Frozen`]), the iteration cap
//! ([`StopReason::Completed`]), or the [`SearchControl`].
//!
//! # Reference
//! Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"

use std::time::Instant;

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{
    check_input, improvement_percentage, OptimizationResult, SearchControl, StopReason, Strategy,
};
use crate::error::OptimizeError;
use crate::models::Solution;
use crate::moves::random_move;
use crate::score::Evaluator;

/// Iterations without a new best before a reheat.
pub const STAGNATION_LIMIT: usize = 100;

const REHEAT_FACTOR: f64 = 1.5;
const REHEAT_CAP: f64 = 0.5;
const COOLING_SLOWDOWN: f64 = 0.95;
const LOG_EVERY: usize = 500;

/// Simulated annealing parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnealingConfig {
    /// Starting temperature `T0`.
    pub initial_temperature: f64,
    /// Search stops once the temperature falls below this.
    pub min_temperature: f64,
    /// Geometric decay factor in `(0, 1)`.
    pub cooling_rate: f64,
    /// Iteration cap.
    pub max_iterations: usize,
    /// Random seed for [`Strategy::optimize`].
    pub seed: Option<u64>,
}

impl Default for AnnealingConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 1000.0,
            min_temperature: 0.1,
            cooling_rate: 0.995,
            max_iterations: 10_000,
            seed: None,
        }
    }
}

impl AnnealingConfig {
    pub fn with_initial_temperature(mut self, t0: f64) -> Self {
        self.initial_temperature = t0;
        self
    }

    pub fn with_min_temperature(mut self, t_min: f64) -> Self {
        self.min_temperature = t_min;
        self
    }

    pub fn with_cooling_rate(mut self, rate: f64) -> Self {
        self.cooling_rate = rate;
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks parameter ranges.
    pub fn validate(&self) -> Result<(), OptimizeError> {
        if !(self.initial_temperature.is_finite() && self.initial_temperature > 0.0) {
            return Err(OptimizeError::InvalidConfig(format!(
                "initial_temperature must be positive, got {}",
                self.initial_temperature
            )));
        }
        if !(self.min_temperature > 0.0 && self.min_temperature < self.initial_temperature) {
            return Err(OptimizeError::InvalidConfig(format!(
                "min_temperature must be in (0, {}), got {}",
                self.initial_temperature, self.min_temperature
            )));
        }
        if !(self.cooling_rate > 0.0 && self.cooling_rate < 1.0) {
            return Err(OptimizeError::InvalidConfig(format!(
                "cooling_rate must be in (0, 1), got {}",
                self.cooling_rate
            )));
        }
        Ok(())
    }
}

/// Per-iteration diagnostics of one annealing run.
#[derive(Debug, Clone, Default)]
pub struct AnnealingTrace {
    /// Temperature at the start of each iteration.
    pub temperatures: Vec<f64>,
    /// Iterations that ended with a reheat.
    pub reheats: Vec<usize>,
}

/// Simulated annealing strategy.
#[derive(Debug, Clone, Default)]
pub struct SimulatedAnnealing {
    config: AnnealingConfig,
    evaluator: Evaluator,
}

impl SimulatedAnnealing {
    pub fn new(config: AnnealingConfig) -> Self {
        Self {
            config,
            evaluator: Evaluator::new(),
        }
    }

    pub fn config(&self) -> &AnnealingConfig {
        &self.config
    }

    /// Runs the search and also returns its temperature trace.
    pub fn run_traced(
        &self,
        initial: &Solution,
        rng: &mut dyn RngCore,
        control: &SearchControl,
    ) -> Result<(OptimizationResult, AnnealingTrace), OptimizeError> {
        check_input(initial)?;
        self.config.validate()?;

        let cfg = &self.config;
        let start = Instant::now();
        let initial_score = self.evaluator.evaluate(initial);

        let mut current = initial.clone();
        let mut current_energy = initial_score.energy();
        let mut best = current.clone();
        let mut best_energy = current_energy;

        let mut temperature = cfg.initial_temperature;
        let mut cooling_rate = cfg.cooling_rate;
        let mut stagnation = 0usize;

        let mut history = Vec::new();
        let mut best_history = Vec::new();
        let mut trace = AnnealingTrace::default();
        let mut iterations = 0usize;
        let mut stop_reason = StopReason::Completed;

        info!(
            sessions = initial.len(),
            initial_energy = current_energy,
            t0 = cfg.initial_temperature,
            "simulated annealing started"
        );

        let has_moves = !initial.movable_indices().is_empty();

        while has_moves && iterations < cfg.max_iterations {
            if let Some(reason) = control.check() {
                stop_reason = reason;
                break;
            }
            if temperature < cfg.min_temperature {
                stop_reason = StopReason::Frozen;
                break;
            }
            trace.temperatures.push(temperature);

            if let Some(mv) = random_move(&current, rng) {
                let applied = mv.apply(&mut current);
                let candidate_energy = self.evaluator.energy(&current);
                let delta = candidate_energy - current_energy;
                if accept(delta, temperature, rng) {
                    current_energy = candidate_energy;
                } else {
                    applied.revert(&mut current);
                }
            }

            if current_energy < best_energy {
                best_energy = current_energy;
                best = current.clone();
                stagnation = 0;
            } else {
                stagnation += 1;
            }

            history.push(current_energy);
            best_history.push(best_energy);

            if stagnation > STAGNATION_LIMIT {
                temperature =
                    (temperature * REHEAT_FACTOR).min(cfg.initial_temperature * REHEAT_CAP);
                cooling_rate = 1.0 - (1.0 - cooling_rate) * COOLING_SLOWDOWN;
                stagnation = 0;
                trace.reheats.push(iterations);
            } else {
                temperature *= cooling_rate;
            }

            iterations += 1;
            if iterations % LOG_EVERY == 0 {
                debug!(
                    iteration = iterations,
                    temperature,
                    current_energy,
                    best_energy,
                    "annealing progress"
                );
            }
        }

        if !has_moves {
            debug!("no movable sessions; annealing returns the input unchanged");
        }

        let best = self.evaluator.scored(best);
        let final_score = best.score.unwrap_or_else(|| self.evaluator.evaluate(&best));
        let duration = start.elapsed();

        info!(
            iterations,
            final_energy = final_score.energy(),
            reheats = trace.reheats.len(),
            stop = %stop_reason,
            ?duration,
            "simulated annealing finished"
        );

        let result = OptimizationResult {
            algorithm: self.name().to_string(),
            initial_score,
            final_score,
            improvement_percentage: improvement_percentage(&initial_score, &final_score),
            iterations,
            duration,
            solution: best,
            history,
            best_history,
            stop_reason,
        };
        Ok((result, trace))
    }
}

/// Metropolis criterion.
fn accept<R: Rng + ?Sized>(delta: f64, temperature: f64, rng: &mut R) -> bool {
    if delta < 0.0 {
        return true;
    }
    rng.random::<f64>() < (-delta / temperature).exp()
}

impl Strategy for SimulatedAnnealing {
    fn name(&self) -> &str {
        "Simulated Annealing"
    }

    fn seed(&self) -> Option<u64> {
        self.config.seed
    }

    fn optimize_with_rng(
        &self,
        initial: &Solution,
        rng: &mut dyn RngCore,
        control: &SearchControl,
    ) -> Result<OptimizationResult, OptimizeError> {
        self.run_traced(initial, rng, control).map(|(result, _)| result)
    }
}
