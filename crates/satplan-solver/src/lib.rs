//! # satplan-solver
//!
//! Narrow adapter over incremental SAT engines.
//!
//! The planner only needs three capabilities from a solver: accept clauses
//! over DIMACS-style signed literals, decide satisfiability under a set of
//! assumption literals within a time budget, and hand back a model. Any
//! engine exposing those is a [`SatBackend`].
//!
//! ## Backends
//!
//! - [`BatsatBackend`] (feature `batsat`, default): pure-Rust CDCL through
//!   `rustsat-batsat`.
//! - `Z3Backend` (feature `z3`): Z3 through its propositional fragment.
//! - [`ReferenceSolver`]: small deterministic DPLL used for tests and
//!   benchmarks.
//!
//! ## Example
//!
//! ```rust
//! use satplan_solver::{ReferenceSolver, SatBackend, SolveResult};
//!
//! let mut solver = ReferenceSolver::default();
//! solver.reserve_vars(2).unwrap();
//! solver.add_clause(&[1, 2]).unwrap();
//! solver.add_clause(&[-1]).unwrap();
//!
//! match solver.solve(&[], None).unwrap() {
//!     SolveResult::Sat(model) => assert_eq!(model.value(2), Some(true)),
//!     other => panic!("unexpected {other:?}"),
//! }
//! ```

#![forbid(unsafe_code)]

mod intake;
pub mod model;
pub mod reference;

#[cfg(feature = "batsat")]
pub mod batsat;
#[cfg(feature = "z3")]
pub mod z3_backend;

use core::fmt;
use core::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(feature = "batsat")]
pub use batsat::BatsatBackend;
pub use model::Model;
pub use reference::ReferenceSolver;
#[cfg(feature = "z3")]
pub use z3_backend::Z3Backend;

/// Errors raised by a solver backend.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SolverError {
    #[error("clause set is contradictory: {0}")]
    Contradiction(String),

    #[error("literal 0 is not a valid clause literal")]
    ZeroLiteral,

    #[error("variable {var} exceeds the reserved ceiling of {reserved}")]
    VariableOutOfRange { var: u32, reserved: u32 },

    #[error("{what} cap exceeded: {requested} requested, limit is {limit}")]
    LimitExceeded {
        what: &'static str,
        requested: usize,
        limit: usize,
    },

    #[error("solver backend `{0}` is not compiled in")]
    BackendUnavailable(&'static str),

    #[error("solver backend error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, SolverError>;

/// Outcome of one solve call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveResult {
    Sat(Model),
    Unsat,
    TimedOut,
}

/// Hard caps the adapter enforces on clause submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverLimits {
    pub max_vars: u32,
    pub max_clauses: usize,
}

impl Default for SolverLimits {
    fn default() -> Self {
        Self {
            max_vars: 1_000_000,
            max_clauses: 500_000,
        }
    }
}

/// Capability set the planner consumes from a SAT engine.
///
/// Literals are non-zero `i32`s; `v` means variable `v` true, `-v` false.
/// Clauses persist across solve calls, assumptions hold for one call only.
pub trait SatBackend {
    fn name(&self) -> &'static str;

    fn limits(&self) -> SolverLimits;

    /// Announces the highest variable id clauses may reference.
    ///
    /// Must be called before submitting clauses over new variables. The
    /// ceiling only ever grows.
    fn reserve_vars(&mut self, max_var: u32) -> Result<()>;

    /// Adds a permanent clause.
    ///
    /// Fails with [`SolverError::Contradiction`] on an empty clause or on a
    /// unit clause opposing an earlier unit clause.
    fn add_clause(&mut self, lits: &[i32]) -> Result<()>;

    fn solve(&mut self, assumptions: &[i32], timeout: Option<Duration>) -> Result<SolveResult>;

    fn num_vars(&self) -> u32;

    fn num_clauses(&self) -> usize;
}

impl<B: SatBackend + ?Sized> SatBackend for Box<B> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn limits(&self) -> SolverLimits {
        (**self).limits()
    }

    fn reserve_vars(&mut self, max_var: u32) -> Result<()> {
        (**self).reserve_vars(max_var)
    }

    fn add_clause(&mut self, lits: &[i32]) -> Result<()> {
        (**self).add_clause(lits)
    }

    fn solve(&mut self, assumptions: &[i32], timeout: Option<Duration>) -> Result<SolveResult> {
        (**self).solve(assumptions, timeout)
    }

    fn num_vars(&self) -> u32 {
        (**self).num_vars()
    }

    fn num_clauses(&self) -> usize {
        (**self).num_clauses()
    }
}

/// Selectable backend, as named in configuration files and on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Batsat,
    Z3,
    Reference,
}

impl BackendKind {
    pub fn create(self, limits: SolverLimits) -> Result<Box<dyn SatBackend>> {
        match self {
            #[cfg(feature = "batsat")]
            BackendKind::Batsat => Ok(Box::new(BatsatBackend::new(limits))),
            #[cfg(not(feature = "batsat"))]
            BackendKind::Batsat => Err(SolverError::BackendUnavailable("batsat")),
            #[cfg(feature = "z3")]
            BackendKind::Z3 => Ok(Box::new(Z3Backend::new(limits))),
            #[cfg(not(feature = "z3"))]
            BackendKind::Z3 => Err(SolverError::BackendUnavailable("z3")),
            BackendKind::Reference => Ok(Box::new(ReferenceSolver::new(limits))),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BackendKind::Batsat => "batsat",
            BackendKind::Z3 => "z3",
            BackendKind::Reference => "reference",
        })
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "batsat" => Ok(BackendKind::Batsat),
            "z3" => Ok(BackendKind::Z3),
            "reference" => Ok(BackendKind::Reference),
            other => Err(format!(
                "unknown solver backend `{other}` (expected batsat, z3 or reference)"
            )),
        }
    }
}
