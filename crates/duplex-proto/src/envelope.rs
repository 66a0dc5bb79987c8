//! Envelopes: encrypted messages as the store holds them.
//!
//! A modern envelope carries two ciphertexts of the same plaintext, one
//! sealed under the sender's public key and one under the receiver's, so
//! both parties can re-read the thread later. Envelopes written before dual
//! sealing carry a single `legacy` ciphertext sealed only for the receiver.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

use crate::ids::{AccountId, EnvelopeId};

/// Characters of base64 shown for a sealed message in a locked view.
pub const PREVIEW_LEN: usize = 50;

/// Opaque encrypted bytes.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ciphertext(Vec<u8>);

impl Ciphertext {
    /// Wrap raw ciphertext bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// The ciphertext bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// What a locked view renders: the first [`PREVIEW_LEN`] characters of
    /// the base64 encoding.
    pub fn preview(&self) -> String {
        let mut encoded = STANDARD.encode(&self.0);
        encoded.truncate(PREVIEW_LEN);
        encoded
    }
}

impl std::fmt::Debug for Ciphertext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ciphertext({} bytes)", self.0.len())
    }
}

/// Structural classification of a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// Both modern halves present.
    Dual,
    /// No complete dual pair, but a legacy ciphertext is present.
    LegacySingle,
    /// Neither a dual pair nor a legacy ciphertext.
    Malformed,
}

/// The encrypted body of an envelope.
///
/// All fields are optional at the serialization layer; [`Self::shape`] is
/// the single classification point deciding how a payload is treated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopePayload {
    /// Plaintext sealed under the sender's public key.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub for_sender: Option<Ciphertext>,
    /// Plaintext sealed under the receiver's public key.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub for_receiver: Option<Ciphertext>,
    /// Pre-dual-sealing ciphertext, readable only by the receiver.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub legacy: Option<Ciphertext>,
}

impl EnvelopePayload {
    /// A modern dual-sealed payload.
    pub fn dual(for_sender: Ciphertext, for_receiver: Ciphertext) -> Self {
        Self { for_sender: Some(for_sender), for_receiver: Some(for_receiver), legacy: None }
    }

    /// A legacy single-ciphertext payload.
    pub fn legacy_single(ciphertext: Ciphertext) -> Self {
        Self { for_sender: None, for_receiver: None, legacy: Some(ciphertext) }
    }

    /// Classify this payload.
    ///
    /// A payload with one modern half and a legacy field still counts as
    /// `LegacySingle`: the dual pair is incomplete but the legacy ciphertext
    /// remains usable.
    pub fn shape(&self) -> PayloadShape {
        match (&self.for_sender, &self.for_receiver, &self.legacy) {
            (Some(_), Some(_), _) => PayloadShape::Dual,
            (_, _, Some(_)) => PayloadShape::LegacySingle,
            _ => PayloadShape::Malformed,
        }
    }

    /// The ciphertext a party should attempt, by their role in the envelope.
    ///
    /// Legacy payloads offer their single ciphertext to either role; only
    /// the receiver's key will succeed. `Malformed` payloads offer nothing.
    pub fn ciphertext_for(&self, is_sender: bool) -> Option<&Ciphertext> {
        match self.shape() {
            PayloadShape::Dual => {
                if is_sender {
                    self.for_sender.as_ref()
                } else {
                    self.for_receiver.as_ref()
                }
            },
            PayloadShape::LegacySingle => self.legacy.as_ref(),
            PayloadShape::Malformed => None,
        }
    }
}

/// A stored message between two accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Store-assigned id, monotonic per store.
    pub id: EnvelopeId,
    /// Account that sealed and appended the envelope.
    pub sender: AccountId,
    /// Account the envelope is addressed to.
    pub receiver: AccountId,
    /// Encrypted body.
    pub payload: EnvelopePayload,
    /// Append time, unix milliseconds, store-assigned.
    pub timestamp_ms: u64,
}

impl Envelope {
    /// Whether this envelope belongs to the thread between `a` and `b`.
    pub fn is_between(&self, a: AccountId, b: AccountId) -> bool {
        (self.sender == a && self.receiver == b) || (self.sender == b && self.receiver == a)
    }
}

/// Input to appending an envelope; id and timestamp are store-assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeDraft {
    /// Sending account.
    pub sender: AccountId,
    /// Receiving account.
    pub receiver: AccountId,
    /// Encrypted body.
    pub payload: EnvelopePayload,
}
