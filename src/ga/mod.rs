//! GA-based timetable optimization.
//!
//! Population-based search over complete timetables. Fitness is the same
//! energy the single-trajectory searches minimize: lower is fitter.
//!
//! # Encoding
//!
//! A chromosome is a [`Solution`](crate::models::Solution); gene `i` is the
//! assignment of session `i`. All individuals of one run share the session
//! list of the template they were seeded from.
//!
//! # Submodules
//!
//! - [`operators`]: Tournament selection, single-point crossover, mutation
//!
//! # Reference
//! - Holland (1975), "Adaptation in Natural and Artificial Systems"
//! - Goldberg & Deb (1991), "A Comparative Analysis of Selection Schemes"

pub mod operators;
mod runner;

pub use operators::{mutate, single_point_crossover, tournament_select};
pub use runner::{GeneticAlgorithm, GeneticConfig, Individual};
