//! Core logic of the duplex messaging system.
//!
//! Everything here is transport-agnostic: the crate defines the store
//! contract, the in-memory reference store, message sealing/opening, the
//! per-conversation decryption gate, and the background refresh loop that
//! keeps a thread view current. Network and persistence layers plug in by
//! implementing [`Store`]; deterministic tests plug in by implementing
//! [`Environment`].
//!
//! # Architecture
//!
//! ```text
//!   duplex-client
//!        |
//!        v
//!   ThreadView ──> DecryptionGate ──> EnvelopeOpener (duplex-crypto)
//!        ^
//!        | apply (atomic replace + cache refresh)
//!   ConversationSync ──> Store (trait) ──> MemoryStore | ...
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod codec;
pub mod env;
pub mod gate;
pub mod memory_store;
pub mod session_store;
pub mod store;
pub mod sync;
pub mod system_env;

pub use codec::{CodecError, DecodeOutcome, EnvelopeOpener, MAX_MESSAGE_LEN, seal};
pub use env::{EnvRng, Environment};
pub use gate::{DecryptionGate, GateError, GateState, MessageDisplay};
pub use memory_store::{ChaoticStore, MemoryStore};
pub use session_store::{MemorySessionStore, SessionStore, SessionStoreError};
pub use store::{Store, StoreError};
pub use sync::{
    ConversationSync, DEFAULT_REFRESH_INTERVAL, SharedThreadView, SyncHandle, ThreadView,
};
pub use system_env::SystemEnv;
