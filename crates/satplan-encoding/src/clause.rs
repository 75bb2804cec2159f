use crate::{EncodingError, Result};

/// A disjunction of non-zero literals, free of tautologies.
///
/// Literals are kept sorted by variable, then negative before positive, with
/// duplicates collapsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Clause(Vec<i32>);

impl Clause {
    pub fn new(lits: impl IntoIterator<Item = i32>) -> Result<Self> {
        let mut lits: Vec<i32> = lits.into_iter().collect();
        if lits.contains(&0) {
            return Err(EncodingError::InvalidClause {
                lits,
                reason: "literal 0",
            });
        }
        lits.sort_unstable_by_key(|&l| (l.unsigned_abs(), l > 0));
        lits.dedup();
        if lits
            .windows(2)
            .any(|w| w[0].unsigned_abs() == w[1].unsigned_abs())
        {
            return Err(EncodingError::InvalidClause {
                lits,
                reason: "both polarities of a variable",
            });
        }
        Ok(Self(lits))
    }

    pub fn lits(&self) -> &[i32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_unit(&self) -> bool {
        self.0.len() == 1
    }

    pub fn contains(&self, lit: i32) -> bool {
        self.0.contains(&lit)
    }

    pub fn max_var(&self) -> u32 {
        self.0.iter().map(|l| l.unsigned_abs()).max().unwrap_or(0)
    }
}

/// Clauses emitted for one encoding step, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClauseSet {
    clauses: Vec<Clause>,
}

impl ClauseSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, lits: impl IntoIterator<Item = i32>) -> Result<()> {
        self.clauses.push(Clause::new(lits)?);
        Ok(())
    }

    pub fn extend(&mut self, other: ClauseSet) {
        self.clauses.extend(other.clauses);
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Clause> {
        self.clauses.iter()
    }

    pub fn contains(&self, clause: &Clause) -> bool {
        self.clauses.contains(clause)
    }

    pub fn max_var(&self) -> u32 {
        self.clauses.iter().map(Clause::max_var).max().unwrap_or(0)
    }
}

impl<'a> IntoIterator for &'a ClauseSet {
    type Item = &'a Clause;
    type IntoIter = std::slice::Iter<'a, Clause>;

    fn into_iter(self) -> Self::IntoIter {
        self.clauses.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_collapse_and_order_is_canonical() {
        let clause = Clause::new([3, -1, 3, 2]).unwrap();
        assert_eq!(clause.lits(), &[-1, 2, 3]);
        assert_eq!(clause, Clause::new([2, 3, -1]).unwrap());
        assert_eq!(clause.max_var(), 3);
    }

    #[test]
    fn tautologies_and_zero_are_rejected() {
        assert!(matches!(
            Clause::new([1, -2, 2]),
            Err(EncodingError::InvalidClause { .. })
        ));
        assert!(matches!(
            Clause::new([0, 4]),
            Err(EncodingError::InvalidClause { reason: "literal 0", .. })
        ));
    }
}
