use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::FactId;

/// Full truth assignment over a fact universe.
///
/// Only the initial state and forward simulation ever materialize one; the
/// encoding represents intermediate states purely through clauses.
#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct State {
    values: Vec<bool>,
}

impl State {
    /// All facts false.
    pub fn empty(fact_count: usize) -> Self {
        Self {
            values: vec![false; fact_count],
        }
    }

    /// Closed-world state: the listed facts are true, everything else false.
    ///
    /// Facts outside `0..fact_count` are ignored; callers validate ids first.
    pub fn from_true_facts(fact_count: usize, facts: impl IntoIterator<Item = FactId>) -> Self {
        let mut state = Self::empty(fact_count);
        for fact in facts {
            if fact.index() < fact_count {
                state.values[fact.index()] = true;
            }
        }
        state
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Out-of-range facts read as false.
    pub fn holds(&self, fact: FactId) -> bool {
        self.values.get(fact.index()).copied().unwrap_or(false)
    }

    pub fn set(&mut self, fact: FactId, value: bool) {
        if let Some(slot) = self.values.get_mut(fact.index()) {
            *slot = value;
        }
    }

    pub fn true_facts(&self) -> impl Iterator<Item = FactId> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, &v)| v)
            .map(|(i, _)| FactId(i as u32))
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.true_facts()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_world_construction() {
        let state = State::from_true_facts(4, [FactId(1), FactId(3), FactId(9)]);
        assert_eq!(state.len(), 4);
        assert!(!state.holds(FactId(0)));
        assert!(state.holds(FactId(1)));
        assert!(state.holds(FactId(3)));
        assert!(!state.holds(FactId(9)));
        assert_eq!(state.true_facts().collect::<Vec<_>>(), vec![FactId(1), FactId(3)]);
    }
}
