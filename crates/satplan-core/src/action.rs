use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::State;

/// Dense fact identifier within one grounded problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FactId(pub u32);

impl FactId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f{}", self.0)
    }
}

/// Dense action identifier within one grounded problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ActionId(pub u32);

impl ActionId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a{}", self.0)
    }
}

/// A fully instantiated STRIPS operator.
///
/// Effects are unconditional. When an action both adds and deletes the same
/// fact the add wins, matching the delete-then-add application order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GroundAction {
    pub name: String,
    /// Facts that must hold before the action.
    pub pre: Vec<FactId>,
    /// Facts that must not hold before the action.
    #[cfg_attr(feature = "serde", serde(default))]
    pub pre_neg: Vec<FactId>,
    pub add: Vec<FactId>,
    pub del: Vec<FactId>,
}

impl GroundAction {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pre: Vec::new(),
            pre_neg: Vec::new(),
            add: Vec::new(),
            del: Vec::new(),
        }
    }

    pub fn with_pre(mut self, facts: impl IntoIterator<Item = FactId>) -> Self {
        self.pre.extend(facts);
        self
    }

    pub fn with_pre_neg(mut self, facts: impl IntoIterator<Item = FactId>) -> Self {
        self.pre_neg.extend(facts);
        self
    }

    pub fn with_add(mut self, facts: impl IntoIterator<Item = FactId>) -> Self {
        self.add.extend(facts);
        self
    }

    pub fn with_del(mut self, facts: impl IntoIterator<Item = FactId>) -> Self {
        self.del.extend(facts);
        self
    }

    /// Sorts and dedups every fact list so later set operations are cheap.
    pub(crate) fn normalize(&mut self) {
        for list in [
            &mut self.pre,
            &mut self.pre_neg,
            &mut self.add,
            &mut self.del,
        ] {
            list.sort_unstable();
            list.dedup();
        }
    }

    pub(crate) fn facts(&self) -> impl Iterator<Item = FactId> + '_ {
        self.pre
            .iter()
            .chain(&self.pre_neg)
            .chain(&self.add)
            .chain(&self.del)
            .copied()
    }

    /// Deletes that are not overridden by an add of the same fact.
    pub fn effective_del(&self) -> impl Iterator<Item = FactId> + '_ {
        self.del.iter().copied().filter(|f| !self.add.contains(f))
    }

    pub fn adds(&self, fact: FactId) -> bool {
        self.add.contains(&fact)
    }

    pub fn deletes(&self, fact: FactId) -> bool {
        self.del.contains(&fact) && !self.add.contains(&fact)
    }

    pub fn is_applicable(&self, state: &State) -> bool {
        self.pre.iter().all(|&f| state.holds(f)) && self.pre_neg.iter().all(|&f| !state.holds(f))
    }

    pub fn apply(&self, state: &mut State) {
        for &f in &self.del {
            state.set(f, false);
        }
        for &f in &self.add {
            state.set(f, true);
        }
    }

    /// Whether the two actions may not share a time step.
    ///
    /// They interfere when one deletes something the other requires or adds,
    /// when one adds something the other requires to be false, or when both
    /// write the same fact.
    pub fn interferes_with(&self, other: &GroundAction) -> bool {
        fn clobbers(a: &GroundAction, b: &GroundAction) -> bool {
            a.effective_del()
                .any(|f| b.pre.contains(&f) || b.add.contains(&f) || b.deletes(f))
                || a.add.iter().any(|f| {
                    b.pre_neg.contains(f) || b.add.contains(f) || b.deletes(*f)
                })
        }
        clobbers(self, other) || clobbers(other, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_wins_over_delete() {
        let action = GroundAction::new("toggle")
            .with_add([FactId(0)])
            .with_del([FactId(0), FactId(1)]);
        let mut state = State::from_true_facts(2, [FactId(1)]);
        action.apply(&mut state);
        assert!(state.holds(FactId(0)));
        assert!(!state.holds(FactId(1)));
        assert!(!action.deletes(FactId(0)));
        assert!(action.deletes(FactId(1)));
    }

    #[test]
    fn negative_preconditions_block_application() {
        let action = GroundAction::new("guarded").with_pre_neg([FactId(0)]);
        assert!(action.is_applicable(&State::empty(1)));
        assert!(!action.is_applicable(&State::from_true_facts(1, [FactId(0)])));
    }

    #[test]
    fn interference_is_symmetric() {
        let p = FactId(0);
        let q = FactId(1);
        let r = FactId(2);
        let reads_p = GroundAction::new("reads_p").with_pre([p]).with_add([q]);
        let kills_p = GroundAction::new("kills_p").with_del([p]);
        let adds_r = GroundAction::new("adds_r").with_add([r]);
        let needs_not_r = GroundAction::new("needs_not_r").with_pre_neg([r]);

        assert!(reads_p.interferes_with(&kills_p));
        assert!(kills_p.interferes_with(&reads_p));
        assert!(adds_r.interferes_with(&needs_not_r));
        assert!(!reads_p.interferes_with(&adds_r));
    }

    #[test]
    fn shared_writes_interfere() {
        let a = GroundAction::new("a").with_add([FactId(0)]);
        let b = GroundAction::new("b").with_add([FactId(0)]);
        assert!(a.interferes_with(&b));
    }
}
