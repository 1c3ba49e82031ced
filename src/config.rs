//! Optimizer configuration.
//!
//! Every section is optional; a missing section means that strategy runs
//! with its defaults. Within a section any subset of fields may be given.
//!
//! ```
//! use u_timetable::config::OptimizerConfig;
//!
//! let config = OptimizerConfig::from_json_str(
//!     r#"{ "annealing": { "cooling_rate": 0.99 }, "acceptance": "Partial" }"#,
//! ).unwrap();
//! assert_eq!(config.annealing_or_default().cooling_rate, 0.99);
//! assert_eq!(config.annealing_or_default().max_iterations, 10_000);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::OptimizeError;
use crate::ga::GeneticConfig;
use crate::optimizer::AcceptanceMode;
use crate::search::{AnnealingConfig, IslandConfig, TabuConfig};

/// Parameters for every strategy plus the acceptance mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub annealing: Option<AnnealingConfig>,
    pub tabu: Option<TabuConfig>,
    pub genetic: Option<GeneticConfig>,
    pub islands: Option<IslandConfig>,
    /// `None` = [`AcceptanceMode::Partial`].
    pub acceptance: Option<AcceptanceMode>,
}

impl OptimizerConfig {
    /// Parses a JSON document and validates every section present.
    pub fn from_json_str(json: &str) -> Result<Self, OptimizeError> {
        let config: OptimizerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String, OptimizeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with_annealing(mut self, config: AnnealingConfig) -> Self {
        self.annealing = Some(config);
        self
    }

    pub fn with_tabu(mut self, config: TabuConfig) -> Self {
        self.tabu = Some(config);
        self
    }

    pub fn with_genetic(mut self, config: GeneticConfig) -> Self {
        self.genetic = Some(config);
        self
    }

    pub fn with_islands(mut self, config: IslandConfig) -> Self {
        self.islands = Some(config);
        self
    }

    pub fn with_acceptance(mut self, mode: AcceptanceMode) -> Self {
        self.acceptance = Some(mode);
        self
    }

    pub fn annealing_or_default(&self) -> AnnealingConfig {
        self.annealing.clone().unwrap_or_default()
    }

    pub fn tabu_or_default(&self) -> TabuConfig {
        self.tabu.clone().unwrap_or_default()
    }

    pub fn genetic_or_default(&self) -> GeneticConfig {
        self.genetic.clone().unwrap_or_default()
    }

    pub fn islands_or_default(&self) -> IslandConfig {
        self.islands.clone().unwrap_or_default()
    }

    pub fn acceptance_or_default(&self) -> AcceptanceMode {
        self.acceptance.unwrap_or_default()
    }

    /// Validates every section that is present.
    pub fn validate(&self) -> Result<(), OptimizeError> {
        if let Some(c) = &self.annealing {
            c.validate()?;
        }
        if let Some(c) = &self.tabu {
            c.validate()?;
        }
        if let Some(c) = &self.genetic {
            c.validate()?;
        }
        if let Some(c) = &self.islands {
            c.validate()?;
        }
        Ok(())
    }
}
