//! Device-local session persistence.
//!
//! Sessions survive the process that created them (a browser tab, a CLI
//! invocation) as one opaque blob. The contract is deliberately tiny:
//! put/get/clear of the single current session. [`MemorySessionStore`]
//! keeps the blob as CBOR in memory.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use duplex_proto::Session;
use thiserror::Error;

/// Errors from session persistence.
#[derive(Debug, Error)]
pub enum SessionStoreError {
    /// The session could not be serialized.
    #[error("session encode failed: {reason}")]
    Encode {
        /// Description of the serialization failure.
        reason: String,
    },

    /// A stored blob could not be deserialized.
    #[error("session decode failed: {reason}")]
    Decode {
        /// Description of the deserialization failure.
        reason: String,
    },
}

/// Opaque persistence of the current session.
pub trait SessionStore: Send + Sync {
    /// Persist `session`, replacing any previous one.
    fn put(&self, session: &Session) -> Result<(), SessionStoreError>;

    /// The current session, if one is stored and readable.
    fn get(&self) -> Result<Option<Session>, SessionStoreError>;

    /// Forget the current session. Idempotent.
    fn clear(&self);
}

/// In-memory session storage holding a single CBOR blob.
///
/// Clones share state, mirroring how every tab of the same origin sees one
/// local storage area.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    blob: Arc<Mutex<Option<Vec<u8>>>>,
}

impl MemorySessionStore {
    /// Create an empty session store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<Vec<u8>>> {
        self.blob.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStore for MemorySessionStore {
    fn put(&self, session: &Session) -> Result<(), SessionStoreError> {
        let mut bytes = Vec::new();
        ciborium::ser::into_writer(session, &mut bytes)
            .map_err(|e| SessionStoreError::Encode { reason: e.to_string() })?;
        *self.lock() = Some(bytes);
        Ok(())
    }

    fn get(&self) -> Result<Option<Session>, SessionStoreError> {
        match self.lock().as_deref() {
            None => Ok(None),
            Some(bytes) => ciborium::de::from_reader(bytes)
                .map(Some)
                .map_err(|e| SessionStoreError::Decode { reason: e.to_string() }),
        }
    }

    fn clear(&self) {
        *self.lock() = None;
    }
}
