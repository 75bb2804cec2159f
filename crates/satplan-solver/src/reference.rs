//! Deterministic DPLL over the accumulated clause list.
//!
//! Meant for tests and small benchmarks: no learning, no heuristics beyond
//! branching on the first open literal of the first unsatisfied clause.

use std::time::{Duration, Instant};

use crate::intake::Intake;
use crate::{Model, Result, SatBackend, SolveResult, SolverLimits};

#[derive(Debug, Clone)]
pub struct ReferenceSolver {
    intake: Intake,
    clauses: Vec<Vec<i32>>,
    solves: usize,
}

impl Default for ReferenceSolver {
    fn default() -> Self {
        Self::new(SolverLimits::default())
    }
}

struct Interrupted;

impl ReferenceSolver {
    pub fn new(limits: SolverLimits) -> Self {
        Self {
            intake: Intake::new(limits),
            clauses: Vec::new(),
            solves: 0,
        }
    }

    /// Every clause accepted so far, in submission order.
    pub fn clauses(&self) -> &[Vec<i32>] {
        &self.clauses
    }

    /// Number of completed `solve` calls.
    pub fn solve_count(&self) -> usize {
        self.solves
    }

    fn value(assignment: &[Option<bool>], lit: i32) -> Option<bool> {
        assignment[lit.unsigned_abs() as usize].map(|v| v == (lit > 0))
    }

    fn assign(assignment: &mut [Option<bool>], lit: i32) {
        assignment[lit.unsigned_abs() as usize] = Some(lit > 0);
    }

    /// Unit propagation to fixpoint; `false` on conflict.
    fn propagate(&self, assignment: &mut [Option<bool>]) -> bool {
        loop {
            let mut changed = false;
            for clause in &self.clauses {
                let mut open = None;
                let mut open_count = 0;
                let mut satisfied = false;
                for &lit in clause {
                    match Self::value(assignment, lit) {
                        Some(true) => {
                            satisfied = true;
                            break;
                        }
                        Some(false) => {}
                        None => {
                            open_count += 1;
                            open = Some(lit);
                        }
                    }
                }
                if satisfied {
                    continue;
                }
                match (open_count, open) {
                    (0, _) => return false,
                    (1, Some(lit)) => {
                        Self::assign(assignment, lit);
                        changed = true;
                    }
                    _ => {}
                }
            }
            if !changed {
                return true;
            }
        }
    }

    fn branch_literal(&self, assignment: &[Option<bool>]) -> Option<i32> {
        self.clauses
            .iter()
            .filter(|clause| {
                !clause
                    .iter()
                    .any(|&lit| Self::value(assignment, lit) == Some(true))
            })
            .find_map(|clause| {
                clause
                    .iter()
                    .copied()
                    .find(|&lit| Self::value(assignment, lit).is_none())
            })
    }

    fn search(
        &self,
        mut assignment: Vec<Option<bool>>,
        deadline: Option<Instant>,
    ) -> std::result::Result<Option<Vec<Option<bool>>>, Interrupted> {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(Interrupted);
        }
        if !self.propagate(&mut assignment) {
            return Ok(None);
        }
        let Some(lit) = self.branch_literal(&assignment) else {
            return Ok(Some(assignment));
        };
        for choice in [lit, -lit] {
            let mut next = assignment.clone();
            Self::assign(&mut next, choice);
            if let Some(found) = self.search(next, deadline)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }
}

impl SatBackend for ReferenceSolver {
    fn name(&self) -> &'static str {
        "reference"
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
        let deadline = timeout.map(|t| Instant::now() + t);

        let mut assignment = vec![None; self.intake.reserved() as usize + 1];
        for &lit in assumptions {
            if Self::value(&assignment, lit) == Some(false) {
                self.solves += 1;
                return Ok(SolveResult::Unsat);
            }
            Self::assign(&mut assignment, lit);
        }

        let result = match self.search(assignment, deadline) {
            Ok(Some(found)) => SolveResult::Sat(Model::from_values(
                found.iter().skip(1).map(|v| v.unwrap_or(false)).collect(),
            )),
            Ok(None) => SolveResult::Unsat,
            Err(Interrupted) => SolveResult::TimedOut,
        };
        self.solves += 1;
        Ok(result)
    }

    fn num_vars(&self) -> u32 {
        self.intake.reserved()
    }

    fn num_clauses(&self) -> usize {
        self.intake.clauses()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solver(vars: u32, clauses: &[&[i32]]) -> ReferenceSolver {
        let mut solver = ReferenceSolver::default();
        solver.reserve_vars(vars).unwrap();
        for clause in clauses {
            solver.add_clause(clause).unwrap();
        }
        solver
    }

    fn assert_model_satisfies(model: &Model, clauses: &[&[i32]]) {
        for clause in clauses {
            assert!(
                clause.iter().any(|&lit| model.satisfies(lit)),
                "clause {clause:?} violated by {model:?}"
            );
        }
    }

    #[test]
    fn finds_model_for_satisfiable_formula() {
        let clauses: &[&[i32]] = &[&[1, 2], &[-1, 3], &[-3, -2], &[2, 3]];
        let mut s = solver(3, clauses);
        match s.solve(&[], None).unwrap() {
            SolveResult::Sat(model) => assert_model_satisfies(&model, clauses),
            other => panic!("expected sat, got {other:?}"),
        }
        assert_eq!(s.solve_count(), 1);
    }

    #[test]
    fn pigeonhole_three_into_two_is_unsat() {
        // p_ij: pigeon i in hole j, var = 2 * i + j + 1
        let var = |i: i32, j: i32| 2 * i + j + 1;
        let mut clauses: Vec<Vec<i32>> = (0..3).map(|i| vec![var(i, 0), var(i, 1)]).collect();
        for j in 0..2 {
            for a in 0..3 {
                for b in (a + 1)..3 {
                    clauses.push(vec![-var(a, j), -var(b, j)]);
                }
            }
        }
        let refs: Vec<&[i32]> = clauses.iter().map(Vec::as_slice).collect();
        let mut s = solver(6, &refs);
        assert_eq!(s.solve(&[], None).unwrap(), SolveResult::Unsat);
    }

    #[test]
    fn assumptions_only_last_one_call() {
        let mut s = solver(2, &[&[1, 2]]);
        assert_eq!(s.solve(&[-1, -2], None).unwrap(), SolveResult::Unsat);
        assert!(matches!(s.solve(&[-1], None).unwrap(), SolveResult::Sat(m) if m.value(2) == Some(true)));
        assert!(matches!(s.solve(&[], None).unwrap(), SolveResult::Sat(_)));
        assert_eq!(s.solve(&[1, -1], None).unwrap(), SolveResult::Unsat);
    }

    #[test]
    fn zero_timeout_reports_timed_out() {
        let mut s = solver(2, &[&[1, 2]]);
        assert_eq!(
            s.solve(&[], Some(Duration::ZERO)).unwrap(),
            SolveResult::TimedOut
        );
    }
}
