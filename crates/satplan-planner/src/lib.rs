//! Bounded SAT planning.
//!
//! [`SatPlanner`] grows the horizon from 0, extending the encoding by one step
//! at a time and asking the solver whether the goal holds at the last step.
//! The first satisfiable horizon yields the plan.
//!
//! ```
//! use satplan_core::{GroundAction, GroundProblemBuilder};
//! use satplan_planner::{PlanOutcome, PlannerConfig, SatPlanner};
//! use satplan_solver::ReferenceSolver;
//!
//! let mut builder = GroundProblemBuilder::new();
//! let lit = builder.fact("lit").unwrap();
//! builder.action(GroundAction::new("switch-on").with_add([lit]));
//! builder.goal_true(lit);
//! let problem = builder.build().unwrap();
//!
//! let planner = SatPlanner::new(PlannerConfig::default());
//! let run = planner
//!     .plan_with(&problem, &mut ReferenceSolver::default())
//!     .unwrap();
//! match run.outcome {
//!     PlanOutcome::Found { plan, horizon } => {
//!         assert_eq!(horizon, 1);
//!         assert_eq!(plan.action_names(&problem), vec!["switch-on"]);
//!     }
//!     other => panic!("no plan: {other}"),
//! }
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod outcome;
pub mod planner;
pub mod report;

pub use config::PlannerConfig;
pub use outcome::{HorizonStats, HorizonStatus, PlanOutcome, PlanRun};
pub use planner::SatPlanner;
pub use report::PlanReport;

use satplan_core::SimulationError;
use satplan_encoding::EncodingError;
use satplan_solver::SolverError;
use thiserror::Error;

/// Fatal planning errors. Terminal non-plan results are [`PlanOutcome`]s.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error("decoded plan does not execute: {0}")]
    InvalidPlan(#[from] SimulationError),

    #[error("decoded plan at horizon {0} does not reach the goal")]
    GoalNotReached(u32),
}

pub type Result<T> = std::result::Result<T, PlanError>;
