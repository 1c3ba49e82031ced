//! School timetable optimization.
//!
//! Assigns every weekly session of every course a teacher, a room, and a
//! time slot, then improves the draft with local search, evolutionary
//! search, or a parallel mix of both. Whatever cannot be resolved is
//! explained by the conflict analyzer.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Teacher`, `Room`, `TimeSlot`, `Course`,
//!   `Session`, `Assignment`, `ProblemFacts`, `Solution`, `Score`
//! - **`score`**: Energy evaluation (hard clashes, workload balance)
//! - **`moves`**: Neighborhood moves with in-place undo
//! - **`search`**: Simulated annealing, tabu search, island coordinator
//! - **`ga`**: Genetic algorithm
//! - **`conflict`**: Post-hoc conflict diagnosis and remediation hints
//! - **`scheduler`**: Initial construction and KPIs
//! - **`validation`**: Input integrity checks (duplicate ids, dangling refs)
//! - **`config`** / **`optimizer`**: JSON configuration and the facade
//!
//! # Pipeline
//!
//! ```text
//! construct (scheduler) -> optimize (search / ga) -> accept (optimizer) -> analyze (conflict)
//! ```
//!
//! Logging goes through `tracing`; the library installs no subscriber.
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! - Glover & Laguna (1997), "Tabu Search"

pub mod config;
pub mod conflict;
pub mod error;
pub mod ga;
pub mod models;
pub mod moves;
pub mod optimizer;
pub mod scheduler;
pub mod score;
pub mod search;
pub mod validation;

#[cfg(test)]
mod fixtures;

pub use config::OptimizerConfig;
pub use error::OptimizeError;
pub use optimizer::{AcceptanceMode, Accepted, Algorithm, Optimizer};
pub use score::Evaluator;
pub use search::{OptimizationResult, SearchControl, StopReason, Strategy};
