#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ActionId, GroundProblem, State};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimulationError {
    #[error("plan references unknown action {0}")]
    UnknownAction(ActionId),

    #[error("step {step}: preconditions of `{action}` do not hold")]
    PreconditionViolated { step: u32, action: String },
}

/// Actions selected at one time step of the encoding.
///
/// A sequential plan has exactly one action per step; a parallel plan may
/// hold several non-interfering actions, kept in ascending id order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlanStep {
    /// Encoding time step the actions were selected at.
    pub time: u32,
    pub actions: Vec<ActionId>,
}

/// Ordered action sequence decoded from a satisfying assignment.
///
/// Time steps where no action was selected are omitted, so `time` values are
/// strictly increasing but not necessarily contiguous.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Plan {
    pub steps: Vec<PlanStep>,
}

impl Plan {
    pub fn new(steps: Vec<PlanStep>) -> Self {
        Self { steps }
    }

    /// Number of non-empty steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn action_count(&self) -> usize {
        self.steps.iter().map(|s| s.actions.len()).sum()
    }

    /// Every action in execution order.
    pub fn actions(&self) -> impl Iterator<Item = ActionId> + '_ {
        self.steps.iter().flat_map(|s| s.actions.iter().copied())
    }

    pub fn action_names<'p>(&'p self, problem: &'p GroundProblem) -> Vec<&'p str> {
        self.actions()
            .filter_map(|id| problem.action(id).map(|a| a.name.as_str()))
            .collect()
    }

    /// Executes the plan forward from the initial state.
    ///
    /// All actions of a step are checked against the state before the step,
    /// then applied together: every delete of the step first, then every add.
    pub fn simulate(&self, problem: &GroundProblem) -> Result<State, SimulationError> {
        let mut state = problem.init().clone();

        for step in &self.steps {
            let mut actions = Vec::with_capacity(step.actions.len());
            for &id in &step.actions {
                let action = problem
                    .action(id)
                    .ok_or(SimulationError::UnknownAction(id))?;
                if !action.is_applicable(&state) {
                    return Err(SimulationError::PreconditionViolated {
                        step: step.time,
                        action: action.name.clone(),
                    });
                }
                actions.push(action);
            }

            for action in &actions {
                for &f in &action.del {
                    state.set(f, false);
                }
            }
            for action in &actions {
                for &f in &action.add {
                    state.set(f, true);
                }
            }
        }

        Ok(state)
    }

    /// The plan is executable and its final state satisfies the goal.
    pub fn achieves_goal(&self, problem: &GroundProblem) -> bool {
        self.simulate(problem)
            .map(|state| problem.goal().is_satisfied_by(&state))
            .unwrap_or(false)
    }
}
