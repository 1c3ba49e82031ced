//! Constructive heuristics and KPI evaluation.
//!
//! Provides the starting assignments the searches improve on and timetable
//! quality metrics.
//!
//! # Algorithm
//!
//! `InitialAssigner` offers a round-robin pass and a greedy first-fit pass.
//! Neither is optimal; both are fast baselines.
//!
//! # KPI
//!
//! `TimetableKpi` computes completion, hard violations, teacher load balance,
//! and room/seat utilization.
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Burke & Petrovic (2002), "Recent Research Directions in Automated Timetabling"

mod initial;
mod kpi;

pub use initial::InitialAssigner;
pub use kpi::TimetableKpi;
