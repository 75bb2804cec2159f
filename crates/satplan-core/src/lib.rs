//! Grounded STRIPS problem model shared by the satplan crates.
//!
//! A [`GroundProblem`] is what an external grounder hands to the planner: a
//! dense fact universe, ground actions over it, a closed-world initial state
//! and a partial goal. [`Plan`] is what comes back, and can be re-simulated
//! against the problem it was produced for.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod action;
pub mod plan;
pub mod problem;
pub mod state;

pub use action::{ActionId, FactId, GroundAction};
pub use plan::{Plan, PlanStep, SimulationError};
pub use problem::{Goal, GroundProblem, GroundProblemBuilder, ProblemError};
pub use state::State;
