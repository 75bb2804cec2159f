//! Z3 backend.
//!
//! Clauses are buffered here and replayed into a fresh context on each solve,
//! which keeps the context lifetime local to the call. Timeouts go through the
//! solver's `timeout` parameter and surface as `unknown`.

use std::time::Duration;

use z3::ast::Bool;
use z3::{Config, Context, Params, SatResult, Solver};

use crate::intake::Intake;
use crate::{Model, Result, SatBackend, SolveResult, SolverError, SolverLimits};

#[derive(Debug, Clone)]
pub struct Z3Backend {
    intake: Intake,
    clauses: Vec<Vec<i32>>,
}

impl Default for Z3Backend {
    fn default() -> Self {
        Self::new(SolverLimits::default())
    }
}

impl Z3Backend {
    pub fn new(limits: SolverLimits) -> Self {
        Self {
            intake: Intake::new(limits),
            clauses: Vec::new(),
        }
    }
}

fn literal<'ctx>(vars: &[Bool<'ctx>], lit: i32) -> Bool<'ctx> {
    let var = &vars[lit.unsigned_abs() as usize - 1];
    if lit > 0 {
        var.clone()
    } else {
        var.not()
    }
}

impl SatBackend for Z3Backend {
    fn name(&self) -> &'static str {
        "z3"
    }

    fn limits(&self) -> SolverLimits {
        self.intake.limits()
    }

    fn reserve_vars(&mut self, max_var: u32) -> Result<()> {
        self.intake.reserve(max_var)
    }

    fn add_clause(&mut self, lits: &[i32]) -> Result<()> {
        self.intake.admit(lits)?;
        self.clauses.push(lits.to_vec());
        Ok(())
    }

    fn solve(&mut self, assumptions: &[i32], timeout: Option<Duration>) -> Result<SolveResult> {
        self.intake.check_literals(assumptions)?;

        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let solver = Solver::new(&ctx);
        if let Some(limit) = timeout {
            let mut params = Params::new(&ctx);
            params.set_u32("timeout", limit.as_millis().min(u32::MAX as u128) as u32);
            solver.set_params(&params);
        }

        let vars: Vec<Bool> = (1..=self.intake.reserved())
            .map(|v| Bool::new_const(&ctx, format!("v{v}")))
            .collect();

        for clause in &self.clauses {
            let lits: Vec<Bool> = clause.iter().map(|&l| literal(&vars, l)).collect();
            let refs: Vec<&Bool> = lits.iter().collect();
            solver.assert(&Bool::or(&ctx, &refs));
        }

        let assumed: Vec<Bool> = assumptions.iter().map(|&l| literal(&vars, l)).collect();
        match solver.check_assumptions(&assumed) {
            SatResult::Sat => {
                let model = solver
                    .get_model()
                    .ok_or_else(|| SolverError::Backend("z3 returned sat without a model".into()))?;
                let values = vars
                    .iter()
                    .map(|v| model.eval(v, true).and_then(|b| b.as_bool()).unwrap_or(false))
                    .collect();
                Ok(SolveResult::Sat(Model::from_values(values)))
            }
            SatResult::Unsat => Ok(SolveResult::Unsat),
            SatResult::Unknown => {
                let reason = solver.get_reason_unknown().unwrap_or_default();
                if timeout.is_some() && (reason.contains("timeout") || reason.contains("canceled")) {
                    Ok(SolveResult::TimedOut)
                } else {
                    Err(SolverError::Backend(format!("z3 returned unknown: {reason}")))
                }
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
