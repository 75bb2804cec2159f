use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use satplan_core::Plan;

/// How a planning attempt ended, when it ended without a fatal error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanOutcome {
    /// A plan was found at `horizon` steps.
    Found { plan: Plan, horizon: u32 },
    /// The solve call at `horizon` ran out of time.
    TimedOut { horizon: u32 },
    /// Every horizon up to `max_steps` was unsatisfiable.
    ResourceExhausted { max_steps: u32 },
    /// The goal was shown unreachable before any solving.
    Unreachable,
}

impl PlanOutcome {
    pub fn plan(&self) -> Option<&Plan> {
        match self {
            PlanOutcome::Found { plan, .. } => Some(plan),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, PlanOutcome::Found { .. })
    }

    /// Short machine-friendly tag.
    pub fn kind(&self) -> &'static str {
        match self {
            PlanOutcome::Found { .. } => "found",
            PlanOutcome::TimedOut { .. } => "timed-out",
            PlanOutcome::ResourceExhausted { .. } => "resource-exhausted",
            PlanOutcome::Unreachable => "unreachable",
        }
    }
}

impl fmt::Display for PlanOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanOutcome::Found { plan, horizon } => write!(
                f,
                "plan with {} action(s) found at horizon {horizon}",
                plan.action_count()
            ),
            PlanOutcome::TimedOut { horizon } => {
                write!(f, "solver timed out at horizon {horizon}")
            }
            PlanOutcome::ResourceExhausted { max_steps } => {
                write!(f, "no plan within {max_steps} steps")
            }
            PlanOutcome::Unreachable => {
                f.write_str("goal can be simplified to FALSE, no search will solve it")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HorizonStatus {
    Sat,
    Unsat,
    TimedOut,
}

/// Formula size and solve time at one horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HorizonStats {
    pub horizon: u32,
    pub vars: u32,
    pub clauses: usize,
    pub solve_time: Duration,
    pub status: HorizonStatus,
}

/// Outcome of [`SatPlanner::plan`](crate::SatPlanner::plan) plus the
/// statistics gathered on the way.
#[derive(Debug, Clone)]
pub struct PlanRun {
    pub outcome: PlanOutcome,
    pub stats: Vec<HorizonStats>,
    pub elapsed: Duration,
}

impl PlanRun {
    /// Sum of solver time across horizons.
    pub fn solve_time(&self) -> Duration {
        self.stats.iter().map(|s| s.solve_time).sum()
    }
}
