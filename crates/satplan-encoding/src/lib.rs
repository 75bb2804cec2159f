//! Time-indexed CNF encoding of grounded STRIPS problems.
//!
//! The [`Encoder`] extends the formula one step at a time, allocating
//! variables through a [`VariableIndex`] that maps `(entity, step)` pairs to
//! DIMACS-style ids. A satisfying assignment is turned back into a
//! [`Plan`](satplan_core::Plan) by the [`PlanDecoder`].
//!
//! ```
//! use satplan_core::{GroundAction, GroundProblemBuilder};
//! use satplan_encoding::{Encoder, StepSemantics};
//!
//! let mut builder = GroundProblemBuilder::new();
//! let p = builder.fact("p").unwrap();
//! builder.action(GroundAction::new("make-p").with_add([p]));
//! builder.goal_true(p);
//! let problem = builder.build().unwrap();
//!
//! let mut encoder = Encoder::new(&problem, StepSemantics::Sequential);
//! let step0 = encoder.encode_step0().unwrap();
//! assert_eq!(step0.len(), 1);
//! let step1 = encoder.encode_transition(1).unwrap();
//! assert_eq!(encoder.index().len(), 3);
//! assert!(!step1.is_empty());
//! assert_eq!(encoder.goal_literals(1).unwrap().len(), 1);
//! ```

#![forbid(unsafe_code)]

pub mod clause;
pub mod decoder;
pub mod encoder;
pub mod index;
pub mod pairing;

pub use clause::{Clause, ClauseSet};
pub use decoder::PlanDecoder;
pub use encoder::{Encoder, StepEstimate, StepSemantics};
pub use index::{Entity, VarId, VariableIndex};

use satplan_core::ActionId;
use thiserror::Error;

/// Errors produced while building or decoding an encoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error(
        "encoding step {step} needs {required} {what}, exceeding the configured cap of {limit}"
    )]
    EncodingOverflow {
        step: u32,
        what: &'static str,
        required: usize,
        limit: usize,
    },

    #[error("variable {0} was never allocated")]
    UnknownVariable(u32),

    #[error("step {step}: {} actions selected in sequential mode ({actions:?})", actions.len())]
    MultipleActionsPerStep { step: u32, actions: Vec<ActionId> },

    #[error("key for {entity:?} at step {step} does not fit the pairing domain")]
    KeyOverflow { entity: Entity, step: u32 },

    #[error("variable ids exhausted")]
    IdSpaceExhausted,

    #[error("step {requested} requested, next step to encode is {expected}")]
    OutOfOrder { expected: u32, requested: u32 },

    #[error("step {0} has not been encoded yet")]
    StepNotEncoded(u32),

    #[error("out of memory building the at-most-one constraint of step {step}")]
    OutOfMemory { step: u32 },

    #[error("invalid clause {lits:?}: {reason}")]
    InvalidClause {
        lits: Vec<i32>,
        reason: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, EncodingError>;
