//! Submit-to-read gating for one conversation.
//!
//! Plaintext is only reachable between a successful access-key submission
//! and the next relock:
//!
//! ```text
//!             submit(correct key)
//!    Locked ---------------------> Unlocked
//!      ^                              |
//!      +----------- relock ----------+
//! ```
//!
//! While unlocked the gate retains the imported private key (as an
//! [`EnvelopeOpener`]) and a per-envelope outcome cache, so list refreshes
//! never re-prompt for the key. Relocking drops both.

use std::collections::HashMap;

use duplex_crypto::CryptoError;
use duplex_proto::{AccountId, Envelope, EnvelopeId, Session};
use thiserror::Error;

use crate::codec::{DecodeOutcome, EnvelopeOpener};

/// Whether plaintext is currently reachable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GateState {
    /// No key material held; envelopes render as previews.
    #[default]
    Locked,
    /// Opener and outcome cache held; envelopes render decrypted.
    Unlocked,
}

/// What the conversation view renders for one envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageDisplay {
    /// Locked: an opaque excerpt of the ciphertext addressed to the viewer.
    Sealed {
        /// Base64 excerpt, at most [`duplex_proto::PREVIEW_LEN`] characters.
        preview: String,
    },
    /// Unlocked and this envelope decrypted.
    Decrypted {
        /// The recovered message text.
        text: String,
    },
    /// Unlocked, but the viewer's key cannot open this envelope.
    WrongKey,
    /// The payload carries nothing addressable to anyone.
    Corrupt,
}

/// Errors from gate operations.
#[derive(Debug, Error)]
pub enum GateError {
    /// The submitted access key does not match the session's.
    #[error("wrong access key")]
    WrongAccessKey,

    /// The session carries no private key, so nothing can be decrypted.
    #[error("session has no private key")]
    MissingPrivateKey,

    /// The session's private key failed to import.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Operation requires the gate to be unlocked.
    #[error("conversation is locked")]
    Locked,
}

/// Per-conversation decryption gate.
///
/// `opener` and `outcomes` are populated exactly while `state` is
/// [`GateState::Unlocked`]; `submit` and `relock` are the only edges.
#[derive(Debug, Default)]
pub struct DecryptionGate {
    state: GateState,
    opener: Option<EnvelopeOpener>,
    outcomes: HashMap<EnvelopeId, DecodeOutcome>,
}

impl DecryptionGate {
    /// A locked gate holding nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> GateState {
        self.state
    }

    /// Attempt to unlock with `candidate` and run the bulk open pass over
    /// `envelopes`.
    ///
    /// Any failure leaves the gate exactly as it was, including an already
    /// unlocked one. Submitting the correct key while unlocked is
    /// idempotent: the state stays unlocked and the cache is rebuilt.
    pub fn submit(
        &mut self,
        session: &Session,
        candidate: &str,
        envelopes: &[Envelope],
    ) -> Result<(), GateError> {
        if !session.access_key.verify(candidate) {
            return Err(GateError::WrongAccessKey);
        }
        let private = session.private_key.as_ref().ok_or(GateError::MissingPrivateKey)?;
        let opener = EnvelopeOpener::new(session.account_id, private)?;

        self.outcomes = bulk_open(&opener, envelopes);
        self.opener = Some(opener);
        self.state = GateState::Unlocked;
        tracing::debug!(
            account_id = %session.account_id,
            envelopes = envelopes.len(),
            "conversation unlocked"
        );
        Ok(())
    }

    /// Return to [`GateState::Locked`], discarding the opener and every
    /// cached outcome. Idempotent.
    pub fn relock(&mut self) {
        self.state = GateState::Locked;
        self.opener = None;
        self.outcomes.clear();
    }

    /// Re-run the bulk pass against a replaced envelope list.
    ///
    /// Infallible: uses the opener retained at submit time. While locked
    /// this is a no-op.
    pub fn refresh(&mut self, envelopes: &[Envelope]) {
        if let Some(opener) = &self.opener {
            self.outcomes = bulk_open(opener, envelopes);
        }
    }

    /// Guard for operations that require plaintext access, such as sending.
    pub fn ensure_unlocked(&self) -> Result<(), GateError> {
        match self.state {
            GateState::Unlocked => Ok(()),
            GateState::Locked => Err(GateError::Locked),
        }
    }

    /// What to render for `envelope` when viewed by `self_id`.
    ///
    /// Total: a locked gate (or an envelope missing from the cache) falls
    /// back to the sealed preview.
    pub fn display(&self, envelope: &Envelope, self_id: AccountId) -> MessageDisplay {
        if self.state == GateState::Unlocked {
            if let Some(outcome) = self.outcomes.get(&envelope.id) {
                return match outcome {
                    DecodeOutcome::Plaintext(text) => {
                        MessageDisplay::Decrypted { text: text.clone() }
                    },
                    DecodeOutcome::WrongKey => MessageDisplay::WrongKey,
                    DecodeOutcome::Corrupt => MessageDisplay::Corrupt,
                };
            }
        }
        sealed(envelope, self_id)
    }
}

/// Open every envelope exactly once.
fn bulk_open(
    opener: &EnvelopeOpener,
    envelopes: &[Envelope],
) -> HashMap<EnvelopeId, DecodeOutcome> {
    envelopes.iter().map(|envelope| (envelope.id, opener.open(envelope))).collect()
}

/// Preview of the half addressed to `self_id`, without touching key material.
fn sealed(envelope: &Envelope, self_id: AccountId) -> MessageDisplay {
    let is_sender = envelope.sender == self_id;
    match envelope.payload.ciphertext_for(is_sender) {
        Some(ciphertext) => MessageDisplay::Sealed { preview: ciphertext.preview() },
        None => MessageDisplay::Corrupt,
    }
}
