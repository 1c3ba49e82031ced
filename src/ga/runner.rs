//! Generational GA loop with elitism.

use std::time::Instant;

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::operators::{mutate, single_point_crossover, tournament_select};
use crate::error::OptimizeError;
use crate::models::Solution;
use crate::moves::random_move;
use crate::score::Evaluator;
use crate::search::{
    check_input, improvement_percentage, OptimizationResult, SearchControl, StopReason, Strategy,
};

const LOG_EVERY: usize = 50;

/// Genetic algorithm parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneticConfig {
    pub population_size: usize,
    pub generations: usize,
    /// Probability that a child is produced by crossover rather than cloning.
    pub crossover_rate: f64,
    /// Probability that a child receives one random move.
    pub mutation_rate: f64,
    /// Fraction of the population copied unchanged (rounded up).
    pub elitism_rate: f64,
    pub tournament_size: usize,
    /// Random seed for [`Strategy::optimize`].
    pub seed: Option<u64>,
}

impl Default for GeneticConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            generations: 200,
            crossover_rate: 0.8,
            mutation_rate: 0.1,
            elitism_rate: 0.1,
            tournament_size: 3,
            seed: None,
        }
    }
}

impl GeneticConfig {
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    pub fn with_generations(mut self, n: usize) -> Self {
        self.generations = n;
        self
    }

    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    pub fn with_elitism_rate(mut self, rate: f64) -> Self {
        self.elitism_rate = rate;
        self
    }

    pub fn with_tournament_size(mut self, size: usize) -> Self {
        self.tournament_size = size;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of elites: `ceil(population_size * elitism_rate)`.
    pub fn elite_count(&self) -> usize {
        ((self.population_size as f64 * self.elitism_rate).ceil() as usize)
            .min(self.population_size)
    }

    /// Checks parameter ranges.
    pub fn validate(&self) -> Result<(), OptimizeError> {
        if self.population_size < 2 {
            return Err(OptimizeError::InvalidConfig(format!(
                "population_size must be at least 2, got {}",
                self.population_size
            )));
        }
        for (name, rate) in [
            ("crossover_rate", self.crossover_rate),
            ("mutation_rate", self.mutation_rate),
            ("elitism_rate", self.elitism_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(OptimizeError::InvalidConfig(format!(
                    "{name} must be in [0, 1], got {rate}"
                )));
            }
        }
        if self.tournament_size == 0 {
            return Err(OptimizeError::InvalidConfig(
                "tournament_size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// A scored member of the population.
#[derive(Debug, Clone)]
pub struct Individual {
    pub solution: Solution,
    pub energy: f64,
}

/// Genetic algorithm strategy.
#[derive(Debug, Clone, Default)]
pub struct GeneticAlgorithm {
    config: GeneticConfig,
    evaluator: Evaluator,
}

impl GeneticAlgorithm {
    pub fn new(config: GeneticConfig) -> Self {
        Self {
            config,
            evaluator: Evaluator::new(),
        }
    }

    pub fn config(&self) -> &GeneticConfig {
        &self.config
    }

    fn individual(&self, solution: Solution) -> Individual {
        let energy = self.evaluator.energy(&solution);
        Individual { solution, energy }
    }

    /// Seeds the population from `template`.
    ///
    /// The first individual is the template itself; every other one is the
    /// template perturbed by `len / 2` (at least one) random moves.
    pub fn initial_population<R: Rng + ?Sized>(
        &self,
        template: &Solution,
        rng: &mut R,
    ) -> Vec<Individual> {
        let perturbations = (template.len() / 2).max(1);
        let mut population = Vec::with_capacity(self.config.population_size);
        population.push(self.individual(template.clone()));
        while population.len() < self.config.population_size {
            let mut solution = template.clone();
            for _ in 0..perturbations {
                if let Some(mv) = random_move(&solution, rng) {
                    let _ = mv.apply(&mut solution);
                }
            }
            population.push(self.individual(solution));
        }
        population
    }

    /// Produces generation N+1 from generation N.
    ///
    /// The [`elite_count`](GeneticConfig::elite_count) lowest-energy
    /// individuals are copied unchanged; the rest are bred by tournament
    /// selection, crossover, and mutation.
    pub fn evolve_generation<R: Rng + ?Sized>(
        &self,
        population: &[Individual],
        rng: &mut R,
    ) -> Result<Vec<Individual>, OptimizeError> {
        let cfg = &self.config;
        let mut ranked: Vec<&Individual> = population.iter().collect();
        ranked.sort_by(|a, b| a.energy.total_cmp(&b.energy));

        let mut next: Vec<Individual> = ranked
            .iter()
            .take(cfg.elite_count())
            .map(|&ind| ind.clone())
            .collect();

        while next.len() < cfg.population_size {
            let (Some(first), Some(second)) = (
                tournament_select(population, cfg.tournament_size, rng),
                tournament_select(population, cfg.tournament_size, rng),
            ) else {
                break;
            };

            let mut child = if rng.random::<f64>() < cfg.crossover_rate {
                single_point_crossover(&first.solution, &second.solution, rng)?
            } else if rng.random_bool(0.5) {
                first.solution.clone()
            } else {
                second.solution.clone()
            };

            if rng.random::<f64>() < cfg.mutation_rate {
                mutate(&mut child, rng);
            }
            next.push(self.individual(child));
        }
        Ok(next)
    }
}

fn fittest(population: &[Individual]) -> Option<&Individual> {
    population.iter().min_by(|a, b| a.energy.total_cmp(&b.energy))
}

impl Strategy for GeneticAlgorithm {
    fn name(&self) -> &str {
        "Genetic Algorithm"
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
        check_input(initial)?;
        self.config.validate()?;

        let cfg = &self.config;
        let start = Instant::now();
        let initial_score = self.evaluator.evaluate(initial);

        let mut population = self.initial_population(initial, rng);
        let mut best = match fittest(&population) {
            Some(ind) => ind.clone(),
            None => self.individual(initial.clone()),
        };
        let mut history = Vec::with_capacity(cfg.generations);
        let mut generation = 0usize;
        let mut stop_reason = StopReason::Completed;

        info!(
            sessions = initial.len(),
            initial_energy = initial_score.energy(),
            population = cfg.population_size,
            generations = cfg.generations,
            "genetic algorithm started"
        );

        while generation < cfg.generations {
            if let Some(reason) = control.check() {
                stop_reason = reason;
                break;
            }

            population = self.evolve_generation(&population, rng)?;
            if let Some(gen_best) = fittest(&population) {
                if gen_best.energy < best.energy {
                    best = gen_best.clone();
                }
            }
            history.push(best.energy);
            generation += 1;

            if generation % LOG_EVERY == 0 {
                debug!(generation, best_energy = best.energy, "genetic progress");
            }
        }

        let solution = self.evaluator.scored(best.solution);
        let final_score = solution
            .score
            .unwrap_or_else(|| self.evaluator.evaluate(&solution));
        let duration = start.elapsed();

        info!(
            generations = generation,
            final_energy = final_score.energy(),
            stop = %stop_reason,
            ?duration,
            "genetic algorithm finished"
        );

        Ok(OptimizationResult {
            algorithm: self.name().to_string(),
            initial_score,
            final_score,
            improvement_percentage: improvement_percentage(&initial_score, &final_score),
            iterations: generation,
            duration,
            solution,
            best_history: history.clone(),
            history,
            stop_reason,
        })
    }
}
