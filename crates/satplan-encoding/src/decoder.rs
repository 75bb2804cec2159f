use std::collections::BTreeMap;

use satplan_core::{ActionId, Plan, PlanStep};
use satplan_solver::Model;

use crate::{EncodingError, Entity, Result, StepSemantics, VariableIndex};

/// Reads the selected actions out of a model.
pub struct PlanDecoder<'a> {
    index: &'a VariableIndex,
    semantics: StepSemantics,
}

impl<'a> PlanDecoder<'a> {
    pub fn new(index: &'a VariableIndex, semantics: StepSemantics) -> Self {
        Self { index, semantics }
    }

    /// Plan of the actions true in `model` at steps `0..horizon`.
    ///
    /// Steps without a selected action are dropped. Every true variable must
    /// have been allocated by the index.
    pub fn decode(&self, model: &Model, horizon: u32) -> Result<Plan> {
        let mut selected: BTreeMap<u32, Vec<ActionId>> = BTreeMap::new();

        for var in model.true_vars() {
            let (entity, step) = self.index.entity_of(var)?;
            if let Entity::Action(action) = entity {
                if step < horizon {
                    selected.entry(step).or_default().push(action);
                }
            }
        }

        let mut steps = Vec::with_capacity(selected.len());
        for (time, mut actions) in selected {
            actions.sort_unstable();
            if self.semantics == StepSemantics::Sequential && actions.len() > 1 {
                return Err(EncodingError::MultipleActionsPerStep {
                    step: time,
                    actions,
                });
            }
            steps.push(PlanStep { time, actions });
        }

        tracing::debug!(horizon, steps = steps.len(), "decoded plan");
        Ok(Plan::new(steps))
    }
}
