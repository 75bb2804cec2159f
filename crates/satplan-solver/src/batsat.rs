//! Incremental CDCL backend on `rustsat-batsat`.
//!
//! Timed solves install a stop predicate on batsat's callbacks that trips once
//! the deadline has passed. batsat polls it between decisions and returns
//! `Interrupted`, after which the engine keeps its clauses and accepts further
//! calls.

use std::time::{Duration, Instant};

use rustsat::solvers::{Solve, SolveIncremental, SolverResult};
use rustsat::types::{Clause, Lit, TernaryVal};
use rustsat_batsat::BasicSolver;

use crate::intake::Intake;
use crate::{Model, Result, SatBackend, SolveResult, SolverError, SolverLimits};

pub struct BatsatBackend {
    engine: BasicSolver,
    intake: Intake,
    /// Highest variable the engine has actually seen.
    max_used: u32,
}

impl Default for BatsatBackend {
    fn default() -> Self {
        Self::new(SolverLimits::default())
    }
}

fn to_lit(lit: i32) -> Lit {
    Lit::new(lit.unsigned_abs() - 1, lit < 0)
}

fn backend_err(err: impl core::fmt::Display) -> SolverError {
    SolverError::Backend(err.to_string())
}

impl BatsatBackend {
    pub fn new(limits: SolverLimits) -> Self {
        Self {
            engine: BasicSolver::default(),
            intake: Intake::new(limits),
            max_used: 0,
        }
    }

    fn extract_model(&self) -> Result<Model> {
        let mut values = Vec::with_capacity(self.max_used as usize);
        for var in 1..=self.max_used {
            let value = self
                .engine
                .lit_val(Lit::new(var - 1, false))
                .map_err(backend_err)?;
            values.push(value == TernaryVal::True);
        }
        Ok(Model::from_values(values))
    }

    /// Arms or clears the stop predicate for the next call.
    fn set_deadline(&mut self, timeout: Option<Duration>) {
        let callbacks = self.engine.batsat_mut().cb_mut();
        match timeout {
            Some(limit) => {
                let deadline = Instant::now() + limit;
                callbacks.set_stop(move || Instant::now() >= deadline);
            }
            None => callbacks.set_stop(|| false),
        }
    }
}

impl SatBackend for BatsatBackend {
    fn name(&self) -> &'static str {
        "batsat"
    }

    fn limits(&self) -> SolverLimits {
        self.intake.limits()
    }

    fn reserve_vars(&mut self, max_var: u32) -> Result<()> {
        self.intake.reserve(max_var)
    }

    fn add_clause(&mut self, lits: &[i32]) -> Result<()> {
        self.intake.admit(lits)?;
        let clause: Clause = lits.iter().map(|&l| to_lit(l)).collect();
        self.engine.add_clause(clause).map_err(backend_err)?;
        let top = lits.iter().map(|l| l.unsigned_abs()).max().unwrap_or(0);
        self.max_used = self.max_used.max(top);
        Ok(())
    }

    fn solve(&mut self, assumptions: &[i32], timeout: Option<Duration>) -> Result<SolveResult> {
        self.intake.check_literals(assumptions)?;
        let top = assumptions.iter().map(|l| l.unsigned_abs()).max().unwrap_or(0);
        self.max_used = self.max_used.max(top);
        let lits: Vec<Lit> = assumptions.iter().map(|&l| to_lit(l)).collect();

        self.set_deadline(timeout);
        let result = self.engine.solve_assumps(&lits).map_err(backend_err)?;

        match result {
            SolverResult::Sat => Ok(SolveResult::Sat(self.extract_model()?)),
            SolverResult::Unsat => Ok(SolveResult::Unsat),
            SolverResult::Interrupted => {
                tracing::debug!(
                    timeout_ms = timeout.map_or(0, |t| t.as_millis() as u64),
                    "batsat solve interrupted at deadline"
                );
                Ok(SolveResult::TimedOut)
            }
        }
    }

    fn num_vars(&self) -> u32 {
        self.intake.reserved()
    }

    fn num_clauses(&self) -> usize {
        self.intake.clauses()
    }
}
