//! Sealing and opening envelope payloads.
//!
//! Sealing encrypts one plaintext twice, once under each party's public
//! key, so both can re-read the thread later. Opening is total: every
//! failure mode is data ([`DecodeOutcome`]), because a conversation view
//! must render *something* for every envelope, including foreign and
//! damaged ones.

use duplex_crypto::{CryptoError, Decryptor, MAX_PLAINTEXT_LEN, PrivateKeyDer, PublicKeyDer};
use duplex_proto::{AccountId, Ciphertext, Envelope, EnvelopePayload};
use thiserror::Error;

/// Largest message accepted for sealing, in UTF-8 bytes.
///
/// Equal to the RSA-OAEP block budget; enforced here so oversized input
/// never reaches the crypto layer.
pub const MAX_MESSAGE_LEN: usize = MAX_PLAINTEXT_LEN;

/// Errors from sealing a message.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Message is empty or whitespace-only.
    #[error("message is empty")]
    EmptyMessage,

    /// Message exceeds the one-block budget.
    #[error("message is {len} bytes, limit is {max}")]
    MessageTooLong {
        /// Rejected message length in UTF-8 bytes.
        len: usize,
        /// Maximum accepted length.
        max: usize,
    },

    /// Underlying crypto failure.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

/// Outcome of opening one envelope.
///
/// This is a value, not an error: opening never fails as a `Result`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// Decryption succeeded. Bytes that are not valid UTF-8 decode lossily
    /// (replacement characters) rather than failing.
    Plaintext(String),

    /// The payload is well-shaped but this key cannot open the half
    /// addressed to us.
    WrongKey,

    /// The payload shape offers nothing to decrypt.
    Corrupt,
}

/// Seal `text` for both parties of a thread.
///
/// Validation order: emptiness, then byte length, then crypto. The two
/// ciphertexts differ even though they seal the same plaintext (OAEP
/// randomness).
pub fn seal<R>(
    rng: &mut R,
    text: &str,
    sender_public: &PublicKeyDer,
    receiver_public: &PublicKeyDer,
) -> Result<EnvelopePayload, CodecError>
where
    R: rand::RngCore + rand::CryptoRng,
{
    if text.trim().is_empty() {
        return Err(CodecError::EmptyMessage);
    }
    if text.len() > MAX_MESSAGE_LEN {
        return Err(CodecError::MessageTooLong { len: text.len(), max: MAX_MESSAGE_LEN });
    }

    let for_sender = duplex_crypto::encrypt(rng, sender_public, text.as_bytes())?;
    let for_receiver = duplex_crypto::encrypt(rng, receiver_public, text.as_bytes())?;

    Ok(EnvelopePayload::dual(
        Ciphertext::from_bytes(for_sender),
        Ciphertext::from_bytes(for_receiver),
    ))
}

/// One account's imported private key, opening envelopes in bulk.
///
/// Key import happens once, in [`EnvelopeOpener::new`]; a corrupt key blob
/// therefore surfaces at unlock time instead of once per envelope.
#[derive(Debug)]
pub struct EnvelopeOpener {
    self_id: AccountId,
    decryptor: Decryptor,
}

impl EnvelopeOpener {
    /// Import the private key of the account viewing the thread.
    pub fn new(self_id: AccountId, private: &PrivateKeyDer) -> Result<Self, CryptoError> {
        Ok(Self { self_id, decryptor: Decryptor::new(private)? })
    }

    /// The account this opener decrypts for.
    pub fn self_id(&self) -> AccountId {
        self.self_id
    }

    /// Open one envelope.
    ///
    /// The half to attempt is chosen by our role in the envelope: the
    /// `for_sender` half when we sent it, `for_receiver` otherwise. Legacy
    /// payloads are attempted with whatever single ciphertext they carry;
    /// only the receiver's key will succeed on those.
    pub fn open(&self, envelope: &Envelope) -> DecodeOutcome {
        let is_sender = envelope.sender == self.self_id;
        match envelope.payload.ciphertext_for(is_sender) {
            None => DecodeOutcome::Corrupt,
            Some(ciphertext) => match self.decryptor.decrypt(ciphertext.as_bytes()) {
                Ok(bytes) => DecodeOutcome::Plaintext(String::from_utf8_lossy(&bytes).into_owned()),
                Err(_) => DecodeOutcome::WrongKey,
            },
        }
    }
}
