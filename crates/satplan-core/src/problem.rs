use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ActionId, FactId, GroundAction, State};

/// Errors raised while assembling a grounded problem.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProblemError {
    #[error("action `{action}` references fact {fact} outside a universe of {fact_count} facts")]
    FactOutOfRange {
        action: String,
        fact: FactId,
        fact_count: usize,
    },

    #[error("{context} references fact {fact} outside a universe of {fact_count} facts")]
    StateOutOfRange {
        context: &'static str,
        fact: FactId,
        fact_count: usize,
    },

    #[error("initial state covers {actual} facts, expected {expected}")]
    InitSizeMismatch { expected: usize, actual: usize },

    #[error("goal requires fact {0} to be both true and false")]
    InconsistentGoal(FactId),

    #[error("duplicate fact name `{0}`")]
    DuplicateFact(String),
}

/// Partial assignment the final state must agree with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Goal {
    /// Facts required true.
    pub pos: Vec<FactId>,
    /// Facts required false.
    #[cfg_attr(feature = "serde", serde(default))]
    pub neg: Vec<FactId>,
}

impl Goal {
    pub fn new(pos: impl IntoIterator<Item = FactId>, neg: impl IntoIterator<Item = FactId>) -> Self {
        Self {
            pos: pos.into_iter().collect(),
            neg: neg.into_iter().collect(),
        }
    }

    pub fn is_satisfied_by(&self, state: &State) -> bool {
        self.pos.iter().all(|&f| state.holds(f)) && self.neg.iter().all(|&f| !state.holds(f))
    }

    /// Every constraint as `(fact, required_value)`.
    pub fn literals(&self) -> impl Iterator<Item = (FactId, bool)> + '_ {
        self.pos
            .iter()
            .map(|&f| (f, true))
            .chain(self.neg.iter().map(|&f| (f, false)))
    }

    pub fn len(&self) -> usize {
        self.pos.len() + self.neg.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pos.is_empty() && self.neg.is_empty()
    }
}

/// An immutable grounded planning problem.
///
/// Fact and action ids are dense indices into `facts` and `actions`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct GroundProblem {
    facts: Vec<String>,
    actions: Vec<GroundAction>,
    init: State,
    goal: Goal,
}

impl GroundProblem {
    /// Validates every fact reference and normalizes action fact lists.
    pub fn new(
        facts: Vec<String>,
        mut actions: Vec<GroundAction>,
        init: State,
        mut goal: Goal,
    ) -> Result<Self, ProblemError> {
        let fact_count = facts.len();

        for action in &mut actions {
            if let Some(fact) = action.facts().find(|f| f.index() >= fact_count) {
                return Err(ProblemError::FactOutOfRange {
                    action: action.name.clone(),
                    fact,
                    fact_count,
                });
            }
            action.normalize();
        }

        if init.len() != fact_count {
            return Err(ProblemError::InitSizeMismatch {
                expected: fact_count,
                actual: init.len(),
            });
        }

        goal.pos.sort_unstable();
        goal.pos.dedup();
        goal.neg.sort_unstable();
        goal.neg.dedup();
        if let Some(&fact) = goal
            .pos
            .iter()
            .chain(&goal.neg)
            .find(|f| f.index() >= fact_count)
        {
            return Err(ProblemError::StateOutOfRange {
                context: "goal",
                fact,
                fact_count,
            });
        }
        if let Some(&fact) = goal.pos.iter().find(|f| goal.neg.contains(f)) {
            return Err(ProblemError::InconsistentGoal(fact));
        }

        Ok(Self {
            facts,
            actions,
            init,
            goal,
        })
    }

    pub fn fact_count(&self) -> usize {
        self.facts.len()
    }

    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    pub fn fact_ids(&self) -> impl Iterator<Item = FactId> {
        (0..self.facts.len() as u32).map(FactId)
    }

    pub fn fact_name(&self, fact: FactId) -> Option<&str> {
        self.facts.get(fact.index()).map(String::as_str)
    }

    pub fn action(&self, id: ActionId) -> Option<&GroundAction> {
        self.actions.get(id.index())
    }

    pub fn actions(&self) -> impl Iterator<Item = (ActionId, &GroundAction)> {
        self.actions
            .iter()
            .enumerate()
            .map(|(i, a)| (ActionId(i as u32), a))
    }

    pub fn init(&self) -> &State {
        &self.init
    }

    pub fn goal(&self) -> &Goal {
        &self.goal
    }

    pub fn init_satisfies_goal(&self) -> bool {
        self.goal.is_satisfied_by(&self.init)
    }

    /// Facts reachable from the initial state when deletes are ignored.
    ///
    /// Negative preconditions are ignored too, so the result over-approximates
    /// every state any plan can visit.
    pub fn relaxed_reachable(&self) -> State {
        let mut reached = self.init.clone();
        let mut pending: Vec<bool> = vec![true; self.actions.len()];

        loop {
            let mut changed = false;
            for (i, action) in self.actions.iter().enumerate() {
                if !pending[i] || !action.pre.iter().all(|&f| reached.holds(f)) {
                    continue;
                }
                pending[i] = false;
                for &f in &action.add {
                    if !reached.holds(f) {
                        reached.set(f, true);
                        changed = true;
                    }
                }
            }
            if !changed {
                return reached;
            }
        }
    }

    /// `false` only when no plan of any length can reach the goal.
    ///
    /// A positive goal fact must be relaxed-reachable; a negative goal fact
    /// that holds initially must be deletable by some action.
    pub fn goal_possibly_reachable(&self) -> bool {
        let reached = self.relaxed_reachable();
        let positives = self.goal.pos.iter().all(|&f| reached.holds(f));
        let negatives = self
            .goal
            .neg
            .iter()
            .filter(|&&f| self.init.holds(f))
            .all(|&f| self.actions.iter().any(|a| a.deletes(f)));
        positives && negatives
    }
}

/// Incremental construction of a [`GroundProblem`] by fact name.
#[derive(Debug, Default)]
pub struct GroundProblemBuilder {
    facts: Vec<String>,
    by_name: HashMap<String, FactId>,
    actions: Vec<GroundAction>,
    init: Vec<FactId>,
    goal: Goal,
}

impl GroundProblemBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a fact, failing on a repeated name.
    pub fn fact(&mut self, name: impl Into<String>) -> Result<FactId, ProblemError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(ProblemError::DuplicateFact(name));
        }
        let id = FactId(self.facts.len() as u32);
        self.by_name.insert(name.clone(), id);
        self.facts.push(name);
        Ok(id)
    }

    pub fn lookup(&self, name: &str) -> Option<FactId> {
        self.by_name.get(name).copied()
    }

    pub fn action(&mut self, action: GroundAction) -> ActionId {
        let id = ActionId(self.actions.len() as u32);
        self.actions.push(action);
        id
    }

    pub fn init_true(&mut self, fact: FactId) -> &mut Self {
        self.init.push(fact);
        self
    }

    pub fn goal_true(&mut self, fact: FactId) -> &mut Self {
        self.goal.pos.push(fact);
        self
    }

    pub fn goal_false(&mut self, fact: FactId) -> &mut Self {
        self.goal.neg.push(fact);
        self
    }

    pub fn build(self) -> Result<GroundProblem, ProblemError> {
        let fact_count = self.facts.len();
        if let Some(&fact) = self.init.iter().find(|f| f.index() >= fact_count) {
            return Err(ProblemError::StateOutOfRange {
                context: "initial state",
                fact,
                fact_count,
            });
        }
        let init = State::from_true_facts(fact_count, self.init);
        GroundProblem::new(self.facts, self.actions, init, self.goal)
    }
}
