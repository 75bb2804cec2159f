use std::collections::HashMap;

use crate::{Result, SolverError, SolverLimits};

/// Clause bookkeeping shared by every backend: caps, variable ceiling and
/// the cheap unit-level contradiction check.
#[derive(Debug, Clone)]
pub(crate) struct Intake {
    limits: SolverLimits,
    reserved: u32,
    clauses: usize,
    units: HashMap<u32, bool>,
}

impl Intake {
    pub(crate) fn new(limits: SolverLimits) -> Self {
        Self {
            limits,
            reserved: 0,
            clauses: 0,
            units: HashMap::new(),
        }
    }

    pub(crate) fn limits(&self) -> SolverLimits {
        self.limits
    }

    pub(crate) fn reserved(&self) -> u32 {
        self.reserved
    }

    pub(crate) fn clauses(&self) -> usize {
        self.clauses
    }

    pub(crate) fn reserve(&mut self, max_var: u32) -> Result<()> {
        if max_var > self.limits.max_vars {
            return Err(SolverError::LimitExceeded {
                what: "variable",
                requested: max_var as usize,
                limit: self.limits.max_vars as usize,
            });
        }
        self.reserved = self.reserved.max(max_var);
        Ok(())
    }

    pub(crate) fn check_literals(&self, lits: &[i32]) -> Result<()> {
        for &lit in lits {
            if lit == 0 {
                return Err(SolverError::ZeroLiteral);
            }
            let var = lit.unsigned_abs();
            if var > self.reserved {
                return Err(SolverError::VariableOutOfRange {
                    var,
                    reserved: self.reserved,
                });
            }
        }
        Ok(())
    }

    /// Validates and counts a clause about to be handed to the engine.
    pub(crate) fn admit(&mut self, lits: &[i32]) -> Result<()> {
        self.check_literals(lits)?;

        if lits.is_empty() {
            return Err(SolverError::Contradiction("empty clause".into()));
        }
        if self.clauses >= self.limits.max_clauses {
            return Err(SolverError::LimitExceeded {
                what: "clause",
                requested: self.clauses + 1,
                limit: self.limits.max_clauses,
            });
        }

        if let [lit] = lits {
            let var = lit.unsigned_abs();
            let value = *lit > 0;
            match self.units.get(&var) {
                Some(&previous) if previous != value => {
                    return Err(SolverError::Contradiction(format!(
                        "unit {lit} opposes earlier unit {}",
                        -lit
                    )));
                }
                _ => {
                    self.units.insert(var, value);
                }
            }
        }

        self.clauses += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intake() -> Intake {
        let mut intake = Intake::new(SolverLimits {
            max_vars: 4,
            max_clauses: 3,
        });
        intake.reserve(3).unwrap();
        intake
    }

    #[test]
    fn rejects_zero_and_unreserved_literals() {
        let mut intake = intake();
        assert_eq!(intake.admit(&[1, 0]), Err(SolverError::ZeroLiteral));
        assert_eq!(
            intake.admit(&[-4]),
            Err(SolverError::VariableOutOfRange { var: 4, reserved: 3 })
        );
        assert_eq!(intake.clauses(), 0);
    }

    #[test]
    fn opposing_units_are_contradictions() {
        let mut intake = intake();
        intake.admit(&[2]).unwrap();
        intake.admit(&[2]).unwrap();
        assert!(matches!(intake.admit(&[-2]), Err(SolverError::Contradiction(_))));
        assert!(matches!(intake.admit(&[]), Err(SolverError::Contradiction(_))));
    }

    #[test]
    fn caps_are_enforced() {
        let mut intake = intake();
        assert!(matches!(
            intake.reserve(5),
            Err(SolverError::LimitExceeded { what: "variable", .. })
        ));
        for _ in 0..3 {
            intake.admit(&[1, 2]).unwrap();
        }
        assert!(matches!(
            intake.admit(&[1, 2]),
            Err(SolverError::LimitExceeded { what: "clause", .. })
        ));
    }
}
