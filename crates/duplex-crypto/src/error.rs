//! Crypto error types.

use thiserror::Error;

/// Errors from keypair, OAEP, and access-key operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// RSA key generation failed.
    #[error("key generation failed: {reason}")]
    KeyGeneration {
        /// Description of the generation failure.
        reason: String,
    },

    /// Exporting a key to DER failed.
    #[error("key encoding failed: {reason}")]
    KeyEncoding {
        /// Description of the encoding failure.
        reason: String,
    },

    /// A stored DER blob could not be imported as an RSA key.
    #[error("key import failed: {reason}")]
    KeyImport {
        /// Description of the import failure.
        reason: String,
    },

    /// OAEP encryption failed.
    #[error("encryption failed: {reason}")]
    Encrypt {
        /// Description of the encryption failure.
        reason: String,
    },

    /// OAEP decryption failed.
    ///
    /// Carries no detail beyond the fact of failure; padding errors and
    /// wrong-key errors are indistinguishable to callers.
    #[error("decryption failed")]
    Decrypt,

    /// Plaintext exceeds the RSA-OAEP size budget.
    #[error("plaintext is {len} bytes, limit is {max}")]
    PlaintextTooLong {
        /// Rejected plaintext length in bytes.
        len: usize,
        /// Maximum accepted length in bytes.
        max: usize,
    },

    /// Candidate string does not normalize to a well-formed access key.
    #[error("malformed access key: {reason}")]
    MalformedAccessKey {
        /// What was wrong with the candidate.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decrypt_error_carries_no_detail() {
        let err = CryptoError::Decrypt;
        assert_eq!(err.to_string(), "decryption failed");
    }

    #[test]
    fn plaintext_too_long_display() {
        let err = CryptoError::PlaintextTooLong { len: 191, max: 190 };
        assert_eq!(err.to_string(), "plaintext is 191 bytes, limit is 190");
    }

    #[test]
    fn malformed_access_key_display() {
        let err = CryptoError::MalformedAccessKey { reason: "too short".to_string() };
        assert_eq!(err.to_string(), "malformed access key: too short");
    }
}
