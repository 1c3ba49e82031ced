//! Tabu search with dynamic tenure.
//!
//! Each iteration samples a neighborhood of candidate moves, scores each by
//! applying and reverting it, and takes the lowest-energy move that is not
//! tabu. A tabu move is still admissible when its energy beats the best
//! energy seen so far (aspiration). The chosen move is taken even if it
//! worsens the current solution.
//!
//! The tabu list is a FIFO of move signatures. Its length is bounded by the
//! tenure, which shrinks toward `min_tenure` after a new best (intensify)
//! and grows toward `max_tenure` otherwise (diversify).
//!
//! # Reference
//! Glover (1989), "Tabu Search - Part I"

use std::collections::VecDeque;
use std::time::Instant;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{
    check_input, improvement_percentage, OptimizationResult, SearchControl, StopReason, Strategy,
};
use crate::error::OptimizeError;
use crate::models::Solution;
use crate::moves::{neighborhood, Move};
use crate::score::Evaluator;

const LOG_EVERY: usize = 500;

/// Tabu search parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabuConfig {
    /// Starting tenure, clamped into `[min_tenure, max_tenure]`.
    pub initial_tenure: usize,
    pub min_tenure: usize,
    pub max_tenure: usize,
    /// Candidate moves sampled per iteration.
    pub neighborhood_size: usize,
    pub max_iterations: usize,
    /// Random seed for [`Strategy::optimize`].
    pub seed: Option<u64>,
}

impl Default for TabuConfig {
    fn default() -> Self {
        Self {
            initial_tenure: 7,
            min_tenure: 3,
            max_tenure: 20,
            neighborhood_size: 20,
            max_iterations: 5000,
            seed: None,
        }
    }
}

impl TabuConfig {
    pub fn with_initial_tenure(mut self, tenure: usize) -> Self {
        self.initial_tenure = tenure;
        self
    }

    pub fn with_tenure_bounds(mut self, min: usize, max: usize) -> Self {
        self.min_tenure = min;
        self.max_tenure = max;
        self
    }

    pub fn with_neighborhood_size(mut self, k: usize) -> Self {
        self.neighborhood_size = k;
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
        if self.min_tenure > self.max_tenure {
            return Err(OptimizeError::InvalidConfig(format!(
                "min_tenure ({}) exceeds max_tenure ({})",
                self.min_tenure, self.max_tenure
            )));
        }
        if self.neighborhood_size == 0 {
            return Err(OptimizeError::InvalidConfig(
                "neighborhood_size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// One iteration that took a move.
#[derive(Debug, Clone, PartialEq)]
pub struct TabuStep {
    pub iteration: usize,
    /// Signature of the chosen move.
    pub signature: String,
    /// Whether the signature was tabu when chosen (admitted by aspiration).
    pub was_tabu: bool,
    /// Energy after the move.
    pub energy: f64,
    /// Best-ever energy before the move.
    pub best_before: f64,
    /// Tenure after the update.
    pub tenure: usize,
}

/// Per-iteration diagnostics of one tabu run.
#[derive(Debug, Clone, Default)]
pub struct TabuTrace {
    pub steps: Vec<TabuStep>,
    /// Iterations in which no admissible move existed.
    pub idle_iterations: usize,
}

/// FIFO of forbidden move signatures.
#[derive(Debug, Clone)]
struct TabuList {
    entries: VecDeque<String>,
    tenure: usize,
    min: usize,
    max: usize,
}

impl TabuList {
    fn new(config: &TabuConfig) -> Self {
        let tenure = config
            .initial_tenure
            .clamp(config.min_tenure, config.max_tenure);
        Self {
            entries: VecDeque::with_capacity(config.max_tenure + 1),
            tenure,
            min: config.min_tenure,
            max: config.max_tenure,
        }
    }

    fn contains(&self, signature: &str) -> bool {
        self.entries.iter().any(|s| s == signature)
    }

    fn push(&mut self, signature: String) {
        self.entries.push_back(signature);
        self.evict();
    }

    fn evict(&mut self) {
        while self.entries.len() > self.tenure {
            self.entries.pop_front();
        }
    }

    /// Shorter memory after a new best.
    fn intensify(&mut self) {
        let scaled = (self.tenure as f64 * 0.9).floor() as usize;
        self.tenure = scaled.min(self.tenure.saturating_sub(1)).max(self.min);
        self.evict();
    }

    /// Longer memory while stuck.
    fn diversify(&mut self) {
        let scaled = (self.tenure as f64 * 1.1).ceil() as usize;
        self.tenure = scaled.max(self.tenure + 1).min(self.max);
    }
}

/// Tabu search strategy.
#[derive(Debug, Clone, Default)]
pub struct TabuSearch {
    config: TabuConfig,
    evaluator: Evaluator,
}

impl TabuSearch {
    pub fn new(config: TabuConfig) -> Self {
        Self {
            config,
            evaluator: Evaluator::new(),
        }
    }

    pub fn config(&self) -> &TabuConfig {
        &self.config
    }

    /// Runs the search and also returns the per-step record.
    pub fn run_traced(
        &self,
        initial: &Solution,
        rng: &mut dyn RngCore,
        control: &SearchControl,
    ) -> Result<(OptimizationResult, TabuTrace), OptimizeError> {
        check_input(initial)?;
        self.config.validate()?;

        let cfg = &self.config;
        let start = Instant::now();
        let initial_score = self.evaluator.evaluate(initial);

        let mut current = initial.clone();
        let mut current_energy = initial_score.energy();
        let mut best = current.clone();
        let mut best_energy = current_energy;
        let mut tabu = TabuList::new(cfg);

        let mut history = Vec::new();
        let mut best_history = Vec::new();
        let mut trace = TabuTrace::default();
        let mut iterations = 0usize;
        let mut stop_reason = StopReason::Completed;

        info!(
            sessions = initial.len(),
            initial_energy = current_energy,
            tenure = tabu.tenure,
            "tabu search started"
        );

        while iterations < cfg.max_iterations {
            if let Some(reason) = control.check() {
                stop_reason = reason;
                break;
            }

            let candidates = neighborhood(&current, cfg.neighborhood_size, rng);
            match self.select(&mut current, &candidates, &tabu, best_energy) {
                Some((mv, energy, was_tabu)) => {
                    let signature = mv.signature(&current);
                    let _ = mv.apply(&mut current);
                    current_energy = energy;
                    tabu.push(signature.clone());

                    let best_before = best_energy;
                    if energy < best_energy {
                        best_energy = energy;
                        best = current.clone();
                        tabu.intensify();
                    } else {
                        tabu.diversify();
                    }

                    trace.steps.push(TabuStep {
                        iteration: iterations,
                        signature,
                        was_tabu,
                        energy,
                        best_before,
                        tenure: tabu.tenure,
                    });
                }
                None => trace.idle_iterations += 1,
            }

            history.push(current_energy);
            best_history.push(best_energy);
            iterations += 1;

            if iterations % LOG_EVERY == 0 {
                debug!(
                    iteration = iterations,
                    current_energy,
                    best_energy,
                    tenure = tabu.tenure,
                    "tabu progress"
                );
            }
        }

        let best = self.evaluator.scored(best);
        let final_score = best.score.unwrap_or_else(|| self.evaluator.evaluate(&best));
        let duration = start.elapsed();

        info!(
            iterations,
            final_energy = final_score.energy(),
            stop = %stop_reason,
            ?duration,
            "tabu search finished"
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

    /// Lowest-energy admissible candidate: `(move, energy, was_tabu)`.
    ///
    /// Each candidate is applied to `current` and reverted, so `current` is
    /// unchanged on return.
    fn select(
        &self,
        current: &mut Solution,
        candidates: &[Move],
        tabu: &TabuList,
        best_energy: f64,
    ) -> Option<(Move, f64, bool)> {
        let mut chosen: Option<(Move, f64, bool)> = None;
        for mv in candidates {
            let is_tabu = tabu.contains(&mv.signature(current));
            let applied = mv.apply(current);
            let energy = self.evaluator.energy(current);
            applied.revert(current);

            if is_tabu && energy >= best_energy {
                continue;
            }
            if chosen.as_ref().map_or(true, |&(_, e, _)| energy < e) {
                chosen = Some((*mv, energy, is_tabu));
            }
        }
        chosen
    }
}

impl Strategy for TabuSearch {
    fn name(&self) -> &str {
        "Tabu Search"
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
