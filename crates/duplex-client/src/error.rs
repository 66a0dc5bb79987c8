//! Client-facing error type.

use duplex_core::{CodecError, GateError, SessionStoreError, StoreError};
use duplex_crypto::CryptoError;
use thiserror::Error;

/// Anything a client operation can fail with.
///
/// Lower layers keep their own error types; this is the single surface a
/// frontend matches on.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Input rejected before touching any other layer.
    #[error("validation failed: {reason}")]
    Validation {
        /// What was wrong with the input.
        reason: String,
    },

    /// Key generation or import failure.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Message sealing failure (empty, oversized, or crypto).
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Gate refused the operation.
    #[error(transparent)]
    Gate(#[from] GateError),

    /// Store refused or could not service the request.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Session persistence failure.
    #[error(transparent)]
    Session(#[from] SessionStoreError),
}

impl ClientError {
    /// Whether retrying the same operation later could succeed without any
    /// change of input.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Store(StoreError::Unavailable { .. }))
    }
}
