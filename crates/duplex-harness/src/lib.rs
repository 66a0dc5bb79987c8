//! Deterministic test harness for the Duplex messaging core.
//!
//! Provides the seeded [`Environment`](duplex_core::Environment)
//! implementation that makes whole runs reproducible (key generation
//! included), and the reference model used for model-based testing.
//!
//! # Model-Based Testing
//!
//! The `model` module is a reference implementation of the conversation
//! semantics. Tests generate random operation sequences, apply them to both
//! the model and the real stack, and compare observable states.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod model;
pub mod seeded_env;

pub use model::{
    KeyChoice, ModelMessage, ModelWorld, ObservableState, Operation, OperationError,
    OperationResult, PartyId, Rendered, SmallText,
};
pub use seeded_env::SeededEnv;
