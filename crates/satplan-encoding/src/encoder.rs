//! Step-by-step CNF construction.
//!
//! Step 0 pins the initial state. Transition `t` allocates the action
//! variables of step `t - 1` and the fact variables of step `t`, then links
//! them with precondition, effect, frame and exclusion clauses. Sequential
//! exclusion is a ladder at-most-one with `A - 1` auxiliary variables per
//! step; parallel exclusion is one binary clause per interfering pair.
//!
//! The goal is never part of the accumulated formula;
//! [`Encoder::goal_literals`] returns it as assumptions for one solve call.

use rustsat::encodings::am1::{Encode, Ladder};
use rustsat::instances::{BasicVarManager, Cnf};
use rustsat::types::{Lit, Var};
use serde::{Deserialize, Serialize};

use satplan_core::{ActionId, FactId, GroundAction, GroundProblem};

use crate::{ClauseSet, EncodingError, Entity, Result, VarId, VariableIndex};

/// How many actions a single time step may hold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepSemantics {
    /// At most one action per step.
    #[default]
    Sequential,
    /// Any set of pairwise non-interfering actions per step.
    Parallel,
}

impl std::fmt::Display for StepSemantics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepSemantics::Sequential => f.write_str("sequential"),
            StepSemantics::Parallel => f.write_str("parallel"),
        }
    }
}

/// Exact size of one encoding step, known before it is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepEstimate {
    pub vars: usize,
    pub clauses: usize,
}

/// Incremental encoder for one planning attempt.
pub struct Encoder<'p> {
    problem: &'p GroundProblem,
    semantics: StepSemantics,
    index: VariableIndex,
    /// Per fact, the actions that add it.
    adders: Vec<Vec<ActionId>>,
    /// Per fact, the actions whose delete survives add-wins.
    deleters: Vec<Vec<ActionId>>,
    /// Interfering action pairs, only populated in parallel mode.
    interference: Vec<(ActionId, ActionId)>,
    exclusion: StepEstimate,
    transition_clauses: usize,
    next_step: u32,
}

/// Size of a ladder at-most-one over `n` literals.
fn ladder_size(n: usize) -> StepEstimate {
    if n < 2 {
        return StepEstimate::default();
    }
    StepEstimate {
        vars: n - 1,
        clauses: 3 * n - 4,
    }
}

fn touched(action: &GroundAction) -> impl Iterator<Item = &FactId> {
    action
        .pre
        .iter()
        .chain(&action.pre_neg)
        .chain(&action.add)
        .chain(&action.del)
}

/// Pairs of actions that interfere, checking only actions that share a fact.
fn interfering_pairs(problem: &GroundProblem) -> Vec<(ActionId, ActionId)> {
    let mut touching = vec![Vec::new(); problem.fact_count()];
    for (id, action) in problem.actions() {
        for f in touched(action) {
            if touching[f.index()].last() != Some(&id) {
                touching[f.index()].push(id);
            }
        }
    }

    let actions: Vec<_> = problem.actions().map(|(_, action)| action).collect();
    let mut seen = vec![usize::MAX; actions.len()];
    let mut pairs = Vec::new();
    for (id, action) in problem.actions() {
        let i = id.index();
        let mut partners: Vec<ActionId> = Vec::new();
        for f in touched(action) {
            for &other in &touching[f.index()] {
                let j = other.index();
                if j > i && seen[j] != i {
                    seen[j] = i;
                    if action.interferes_with(actions[j]) {
                        partners.push(other);
                    }
                }
            }
        }
        partners.sort_unstable();
        pairs.extend(partners.into_iter().map(|other| (id, other)));
    }
    pairs
}

impl<'p> Encoder<'p> {
    pub fn new(problem: &'p GroundProblem, semantics: StepSemantics) -> Self {
        let facts = problem.fact_count();
        let mut adders = vec![Vec::new(); facts];
        let mut deleters = vec![Vec::new(); facts];
        let mut action_clauses = 0;

        for (id, action) in problem.actions() {
            for f in &action.add {
                adders[f.index()].push(id);
            }
            let mut dels = 0;
            for f in action.effective_del() {
                deleters[f.index()].push(id);
                dels += 1;
            }
            action_clauses += action.pre.len() + action.pre_neg.len() + action.add.len() + dels;
        }

        let (interference, exclusion) = match semantics {
            StepSemantics::Sequential => (Vec::new(), ladder_size(problem.action_count())),
            StepSemantics::Parallel => {
                let pairs = interfering_pairs(problem);
                let size = StepEstimate {
                    vars: 0,
                    clauses: pairs.len(),
                };
                (pairs, size)
            }
        };

        let transition_clauses = action_clauses + 2 * facts + exclusion.clauses;
        tracing::debug!(
            facts,
            actions = problem.action_count(),
            exclusions = exclusion.clauses,
            transition_clauses,
            %semantics,
            "encoder prepared"
        );

        Self {
            problem,
            semantics,
            index: VariableIndex::new(),
            adders,
            deleters,
            interference,
            exclusion,
            transition_clauses,
            next_step: 0,
        }
    }

    pub fn semantics(&self) -> StepSemantics {
        self.semantics
    }

    pub fn index(&self) -> &VariableIndex {
        &self.index
    }

    pub fn problem(&self) -> &'p GroundProblem {
        self.problem
    }

    /// Last step whose fact variables exist, `None` before step 0.
    pub fn encoded_horizon(&self) -> Option<u32> {
        self.next_step.checked_sub(1)
    }

    /// Variables and clauses that encoding `step` will add.
    pub fn estimate_transition(&self, step: u32) -> StepEstimate {
        let facts = self.problem.fact_count();
        if step == 0 {
            StepEstimate {
                vars: facts,
                clauses: facts,
            }
        } else {
            StepEstimate {
                vars: self.problem.action_count() + facts + self.exclusion.vars,
                clauses: self.transition_clauses,
            }
        }
    }

    fn expect_step(&self, step: u32) -> Result<()> {
        if step != self.next_step {
            return Err(EncodingError::OutOfOrder {
                expected: self.next_step,
                requested: step,
            });
        }
        Ok(())
    }

    fn fact(&mut self, fact: FactId, step: u32) -> Result<VarId> {
        self.index.id_of(Entity::Fact(fact), step)
    }

    fn action(&mut self, action: ActionId, step: u32) -> Result<VarId> {
        self.index.id_of(Entity::Action(action), step)
    }

    /// Unit clauses fixing every fact at step 0 to its initial value.
    pub fn encode_step0(&mut self) -> Result<ClauseSet> {
        self.expect_step(0)?;
        let problem = self.problem;
        let mut clauses = ClauseSet::new();
        for fact in problem.fact_ids() {
            let var = self.fact(fact, 0)?;
            clauses.push([var.lit(problem.init().holds(fact))])?;
        }
        tracing::trace!(step = 0, init = clauses.len(), "encoded initial state");
        self.next_step = 1;
        Ok(clauses)
    }

    /// Clauses linking step `step - 1` to step `step`.
    pub fn encode_transition(&mut self, step: u32) -> Result<ClauseSet> {
        if step == 0 {
            return Err(EncodingError::OutOfOrder {
                expected: self.next_step,
                requested: step,
            });
        }
        self.expect_step(step)?;
        let problem = self.problem;
        let prev = step - 1;

        let mut action_vars = Vec::with_capacity(problem.action_count());
        for (id, _) in problem.actions() {
            action_vars.push(self.action(id, prev)?);
        }
        let mut before = Vec::with_capacity(problem.fact_count());
        let mut after = Vec::with_capacity(problem.fact_count());
        for fact in problem.fact_ids() {
            before.push(self.fact(fact, prev)?);
        }
        for fact in problem.fact_ids() {
            after.push(self.fact(fact, step)?);
        }

        let mut clauses = ClauseSet::new();

        for (id, action) in problem.actions() {
            let a = action_vars[id.index()];
            for f in &action.pre {
                clauses.push([a.neg(), before[f.index()].pos()])?;
            }
            for f in &action.pre_neg {
                clauses.push([a.neg(), before[f.index()].neg()])?;
            }
        }
        let conditions = clauses.len();

        for (id, action) in problem.actions() {
            let a = action_vars[id.index()];
            for f in &action.add {
                clauses.push([a.neg(), after[f.index()].pos()])?;
            }
            for f in action.effective_del() {
                clauses.push([a.neg(), after[f.index()].neg()])?;
            }
        }
        let effects = clauses.len() - conditions;

        for fact in problem.fact_ids() {
            let (now, next) = (before[fact.index()], after[fact.index()]);
            let deleters = self.deleters[fact.index()]
                .iter()
                .map(|d| action_vars[d.index()].pos());
            clauses.push([now.neg(), next.pos()].into_iter().chain(deleters))?;
            let adders = self.adders[fact.index()]
                .iter()
                .map(|d| action_vars[d.index()].pos());
            clauses.push([now.pos(), next.neg()].into_iter().chain(adders))?;
        }
        let frame = 2 * problem.fact_count();

        let before_exclusion = clauses.len();
        match self.semantics {
            StepSemantics::Sequential => self.at_most_one(prev, &action_vars, &mut clauses)?,
            StepSemantics::Parallel => {
                for &(a, b) in &self.interference {
                    clauses.push([action_vars[a.index()].neg(), action_vars[b.index()].neg()])?;
                }
            }
        }

        tracing::trace!(
            step,
            conditions,
            effects,
            frame,
            exclusions = clauses.len() - before_exclusion,
            "encoded transition"
        );
        self.next_step = step + 1;
        Ok(clauses)
    }

    /// Ladder at-most-one over the action variables of `step`.
    ///
    /// The auxiliary variables are allocated through the index first, so the
    /// ladder's variable manager starts at the first of them and hands out
    /// exactly those ids.
    fn at_most_one(
        &mut self,
        step: u32,
        actions: &[VarId],
        clauses: &mut ClauseSet,
    ) -> Result<()> {
        let size = ladder_size(actions.len());
        if size.vars == 0 {
            return Ok(());
        }
        let mut aux = Vec::with_capacity(size.vars);
        for n in 0..size.vars {
            aux.push(self.index.id_of(Entity::Aux(n as u32), step)?);
        }
        let first = aux[0].get();
        debug_assert!(aux.iter().zip(first..).all(|(v, id)| v.get() == id));

        let mut ladder: Ladder = actions.iter().map(|v| Lit::positive(v.get() - 1)).collect();
        let mut vars = BasicVarManager::from_next_free(Var::new(first - 1));
        let mut cnf = Cnf::new();
        ladder
            .encode(&mut cnf, &mut vars)
            .map_err(|_| EncodingError::OutOfMemory { step })?;
        for clause in cnf {
            clauses.push(clause.iter().map(|lit| lit.to_ipasir()))?;
        }
        Ok(())
    }

    /// Goal constraints bound to step `horizon`, as unit literals.
    pub fn goal_literals(&self, horizon: u32) -> Result<Vec<i32>> {
        self.problem
            .goal()
            .literals()
            .map(|(fact, value)| {
                self.index
                    .get(Entity::Fact(fact), horizon)
                    .map(|var| var.lit(value))
                    .ok_or(EncodingError::StepNotEncoded(horizon))
            })
            .collect()
    }
}
