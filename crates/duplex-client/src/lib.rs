//! Duplex Client
//!
//! The operations a frontend wires buttons to: account onboarding
//! ([`register`], [`login`], [`logout`], [`directory`]) and the live
//! conversation handle ([`ThreadClient`]). Everything is generic over the
//! [`duplex_core::Store`] and [`duplex_core::Environment`] in use, so the
//! same flows run against the in-memory store in tests and a real backend
//! in production.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod auth;
pub mod error;
pub mod thread;

pub use auth::{derive_credential, directory, login, logout, register};
pub use error::ClientError;
pub use thread::ThreadClient;
