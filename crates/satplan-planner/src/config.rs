//! Planner configuration loading.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use satplan_encoding::StepSemantics;
use satplan_solver::{BackendKind, SolverLimits};

/// Planner settings, loadable from a YAML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Wall-clock budget per solve call in seconds, 0 for none
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Largest horizon tried before giving up
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,

    /// Actions allowed per time step
    pub semantics: StepSemantics,

    /// Variable and clause caps
    pub limits: SolverLimits,

    /// SAT engine
    pub backend: BackendKind,
}

fn default_timeout_secs() -> u64 {
    300
}
fn default_max_steps() -> u32 {
    100
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_steps: default_max_steps(),
            semantics: StepSemantics::default(),
            limits: SolverLimits::default(),
            backend: BackendKind::default(),
        }
    }
}

impl PlannerConfig {
    /// Load from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        Ok(config)
    }

    /// Per-call solver timeout, `None` when unlimited.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}
