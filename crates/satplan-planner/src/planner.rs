//! Iterative-deepening solve loop.

use std::time::Instant;

use satplan_core::GroundProblem;
use satplan_encoding::{Encoder, EncodingError, PlanDecoder};
use satplan_solver::{SatBackend, SolveResult};

use crate::outcome::{HorizonStats, HorizonStatus, PlanOutcome, PlanRun};
use crate::{PlanError, PlannerConfig, Result};

enum LoopState {
    Init,
    Encoding(u32),
    Solving(u32),
    Done(PlanOutcome),
}

/// Bounded SAT planner.
#[derive(Debug, Clone, Default)]
pub struct SatPlanner {
    config: PlannerConfig,
}

impl SatPlanner {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plans with a fresh instance of the configured backend.
    pub fn plan(&self, problem: &GroundProblem) -> Result<PlanRun> {
        let mut backend = self.config.backend.create(self.config.limits)?;
        tracing::debug!(backend = backend.name(), "created solver backend");
        self.plan_with(problem, &mut backend)
    }

    /// Plans against a caller-supplied, empty backend.
    ///
    /// The backend's own limits are the caps checked before each step.
    pub fn plan_with<B>(&self, problem: &GroundProblem, backend: &mut B) -> Result<PlanRun>
    where
        B: SatBackend + ?Sized,
    {
        let started = Instant::now();
        let semantics = self.config.semantics;
        let timeout = self.config.timeout();
        let mut encoder = Encoder::new(problem, semantics);
        let mut assumptions = Vec::new();
        let mut stats = Vec::new();

        let mut state = LoopState::Init;
        let outcome = loop {
            state = match state {
                LoopState::Init => {
                    if problem.goal_possibly_reachable() {
                        LoopState::Encoding(0)
                    } else {
                        LoopState::Done(PlanOutcome::Unreachable)
                    }
                }
                LoopState::Encoding(horizon) => {
                    check_capacity(&encoder, &*backend, horizon)?;
                    let delta = if horizon == 0 {
                        encoder.encode_step0()?
                    } else {
                        encoder.encode_transition(horizon)?
                    };
                    backend.reserve_vars(encoder.index().max_var())?;
                    for clause in &delta {
                        backend.add_clause(clause.lits())?;
                    }
                    tracing::debug!(horizon, delta = delta.len(), "submitted clause delta");
                    assumptions = encoder.goal_literals(horizon)?;
                    LoopState::Solving(horizon)
                }
                LoopState::Solving(horizon) => {
                    let vars = backend.num_vars();
                    let clauses = backend.num_clauses();
                    tracing::info!(horizon, vars, clauses, "solving");

                    let begun = Instant::now();
                    let result = backend.solve(&assumptions, timeout)?;
                    let solve_time = begun.elapsed();
                    let status = match &result {
                        SolveResult::Sat(_) => HorizonStatus::Sat,
                        SolveResult::Unsat => HorizonStatus::Unsat,
                        SolveResult::TimedOut => HorizonStatus::TimedOut,
                    };
                    stats.push(HorizonStats {
                        horizon,
                        vars,
                        clauses,
                        solve_time,
                        status,
                    });

                    match result {
                        SolveResult::Sat(model) => {
                            let plan = PlanDecoder::new(encoder.index(), semantics)
                                .decode(&model, horizon)?;
                            let reached = plan.simulate(problem)?;
                            if !problem.goal().is_satisfied_by(&reached) {
                                return Err(PlanError::GoalNotReached(horizon));
                            }
                            LoopState::Done(PlanOutcome::Found { plan, horizon })
                        }
                        SolveResult::Unsat if horizon < self.config.max_steps => {
                            tracing::debug!(horizon, "unsatisfiable, extending horizon");
                            LoopState::Encoding(horizon + 1)
                        }
                        SolveResult::Unsat => LoopState::Done(PlanOutcome::ResourceExhausted {
                            max_steps: self.config.max_steps,
                        }),
                        SolveResult::TimedOut => {
                            tracing::warn!(
                                horizon,
                                timeout_secs = self.config.timeout_secs,
                                "solver timed out"
                            );
                            LoopState::Done(PlanOutcome::TimedOut { horizon })
                        }
                    }
                }
                LoopState::Done(outcome) => break outcome,
            };
        };

        let elapsed = started.elapsed();
        tracing::info!(
            outcome = outcome.kind(),
            horizons = stats.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "planning finished"
        );
        Ok(PlanRun {
            outcome,
            stats,
            elapsed,
        })
    }
}

/// Fails before encoding `step` if its variables or clauses would not fit.
fn check_capacity<B>(encoder: &Encoder<'_>, backend: &B, step: u32) -> Result<()>
where
    B: SatBackend + ?Sized,
{
    let limits = backend.limits();
    let estimate = encoder.estimate_transition(step);

    let vars = encoder.index().len() + estimate.vars;
    if vars > limits.max_vars as usize {
        return Err(EncodingError::EncodingOverflow {
            step,
            what: "variables",
            required: vars,
            limit: limits.max_vars as usize,
        }
        .into());
    }

    let clauses = backend.num_clauses() + estimate.clauses;
    if clauses > limits.max_clauses {
        return Err(EncodingError::EncodingOverflow {
            step,
            what: "clauses",
            required: clauses,
            limit: limits.max_clauses,
        }
        .into());
    }
    Ok(())
}
