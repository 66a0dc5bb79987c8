//! Reference model for model-based testing.
//!
//! A simplified implementation of the conversation semantics with no real
//! cryptography, small enough to be obviously correct. Tests apply the same
//! operation sequence to this model and to the real stack, then compare
//! observable state.

pub mod operation;
mod world;

pub use operation::{KeyChoice, Operation, OperationError, OperationResult, PartyId, SmallText};
pub use world::{ModelMessage, ModelWorld, ObservableState, Rendered};
