//! JSON summary of a planning run.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use satplan_core::{GroundProblem, Plan};
use satplan_encoding::StepSemantics;
use satplan_solver::BackendKind;

use crate::outcome::{HorizonStatus, PlanOutcome, PlanRun};
use crate::PlannerConfig;

/// Report written after a planning run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanReport {
    /// Outcome tag (`found`, `timed-out`, ...)
    pub outcome: String,

    /// Human-readable outcome
    pub message: String,

    /// Horizon the plan was found at
    pub horizon: Option<u32>,

    /// Plan steps with action names
    pub steps: Vec<ReportStep>,

    /// The plan itself, by action id
    pub plan: Option<Plan>,

    /// Whether the plan re-simulates to the goal
    pub validated: bool,

    pub semantics: StepSemantics,

    pub backend: BackendKind,

    /// Per-horizon solver statistics
    pub horizons: Vec<HorizonRecord>,

    /// Wall-clock time of the whole run in milliseconds
    pub total_time_ms: u64,

    /// Generation timestamp
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportStep {
    pub time: u32,
    pub actions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HorizonRecord {
    pub horizon: u32,
    pub vars: u32,
    pub clauses: usize,
    pub status: HorizonStatus,
    pub solve_time_ms: u64,
}

impl PlanReport {
    pub fn new(problem: &GroundProblem, run: &PlanRun, config: &PlannerConfig) -> Self {
        let plan = run.outcome.plan();
        let steps = plan
            .map(|plan| {
                plan.steps
                    .iter()
                    .map(|step| ReportStep {
                        time: step.time,
                        actions: step
                            .actions
                            .iter()
                            .filter_map(|&id| problem.action(id).map(|a| a.name.clone()))
                            .collect(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        let horizon = match run.outcome {
            PlanOutcome::Found { horizon, .. } => Some(horizon),
            _ => None,
        };

        Self {
            outcome: run.outcome.kind().to_string(),
            message: run.outcome.to_string(),
            horizon,
            steps,
            plan: plan.cloned(),
            validated: plan.is_some_and(|plan| plan.achieves_goal(problem)),
            semantics: config.semantics,
            backend: config.backend,
            horizons: run
                .stats
                .iter()
                .map(|s| HorizonRecord {
                    horizon: s.horizon,
                    vars: s.vars,
                    clauses: s.clauses,
                    status: s.status,
                    solve_time_ms: s.solve_time.as_millis() as u64,
                })
                .collect(),
            total_time_ms: run.elapsed.as_millis() as u64,
            generated_at: Utc::now(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize plan report")
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)
            .with_context(|| format!("Failed to write report to {}", path.display()))
    }
}
