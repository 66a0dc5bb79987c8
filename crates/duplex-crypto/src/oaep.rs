//! RSA-OAEP encryption and decryption.
//!
//! One OAEP block per message. The size check runs before any key import so
//! oversized input never reaches the crypto layer.

use std::fmt;

use rsa::{
    Oaep, RsaPrivateKey, RsaPublicKey,
    pkcs8::{DecodePrivateKey, DecodePublicKey},
};
use sha2::Sha256;

use crate::{
    error::CryptoError,
    keypair::{PrivateKeyDer, PublicKeyDer},
};

/// Largest plaintext RSA-2048 OAEP-SHA-256 seals in one block:
/// modulus (256 bytes) minus twice the digest length (2 * 32) minus 2.
pub const MAX_PLAINTEXT_LEN: usize = 190;

/// Encrypt `plaintext` under a public key.
///
/// Output differs between calls for the same inputs (OAEP randomness).
pub fn encrypt<R>(
    rng: &mut R,
    public: &PublicKeyDer,
    plaintext: &[u8],
) -> Result<Vec<u8>, CryptoError>
where
    R: rand::RngCore + rand::CryptoRng,
{
    if plaintext.len() > MAX_PLAINTEXT_LEN {
        return Err(CryptoError::PlaintextTooLong {
            len: plaintext.len(),
            max: MAX_PLAINTEXT_LEN,
        });
    }

    let key = RsaPublicKey::from_public_key_der(public.as_bytes())
        .map_err(|e| CryptoError::KeyImport { reason: e.to_string() })?;

    key.encrypt(rng, Oaep::new::<Sha256>(), plaintext)
        .map_err(|e| CryptoError::Encrypt { reason: e.to_string() })
}

/// Decrypt one ciphertext with a freshly imported private key.
///
/// Prefer [`Decryptor`] when opening many ciphertexts with the same key.
pub fn decrypt(private: &PrivateKeyDer, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    Decryptor::new(private)?.decrypt(ciphertext)
}

/// A private key imported once for repeated decryption.
///
/// Import failure (a corrupt DER blob) is separated from per-ciphertext
/// failure: [`Decryptor::new`] reports the former, [`Decryptor::decrypt`]
/// the latter.
pub struct Decryptor {
    key: RsaPrivateKey,
}

impl Decryptor {
    /// Import a PKCS#8 private key.
    pub fn new(private: &PrivateKeyDer) -> Result<Self, CryptoError> {
        let key = RsaPrivateKey::from_pkcs8_der(private.as_bytes())
            .map_err(|e| CryptoError::KeyImport { reason: e.to_string() })?;
        Ok(Self { key })
    }

    /// Decrypt one OAEP block.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        self.key.decrypt(Oaep::new::<Sha256>(), ciphertext).map_err(|_| CryptoError::Decrypt)
    }
}

impl fmt::Debug for Decryptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Decryptor(<imported private key>)")
    }
}
