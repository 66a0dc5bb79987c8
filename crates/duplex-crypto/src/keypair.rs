//! RSA keypair provisioning.
//!
//! Every account owns one RSA-2048 keypair. Keys are held and persisted as
//! DER blobs (SPKI for the public half, PKCS#8 for the private half) so the
//! store never needs to understand key internals. The encrypt/decrypt paths
//! re-import the blobs on use.

use std::fmt;

use rsa::{
    RsaPrivateKey, RsaPublicKey,
    pkcs8::{EncodePrivateKey, EncodePublicKey},
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;

/// RSA modulus size in bits. Public exponent is 65537.
pub const MODULUS_BITS: usize = 2048;

/// SPKI DER encoding of an RSA public key.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyDer(Vec<u8>);

impl PublicKeyDer {
    /// Wrap raw SPKI DER bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// The DER bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Short display fingerprint: first 4 bytes of the SHA-256 digest of the
    /// DER encoding, hex, grouped as `xxxx-xxxx`.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(&self.0);
        let hex: String = digest.iter().take(4).map(|b| format!("{b:02x}")).collect();
        format!("{}-{}", &hex[..4], &hex[4..])
    }
}

impl fmt::Debug for PublicKeyDer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKeyDer({} bytes, {})", self.0.len(), self.fingerprint())
    }
}

/// PKCS#8 DER encoding of an RSA private key.
///
/// The bytes are wiped on drop and never appear in `Debug` output.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKeyDer(Vec<u8>);

impl PrivateKeyDer {
    /// Wrap raw PKCS#8 DER bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// The DER bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for PrivateKeyDer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKeyDer(<redacted {} bytes>)", self.0.len())
    }
}

/// An account's keypair, both halves DER-encoded.
#[derive(Debug, Clone)]
pub struct KeyPair {
    /// SPKI public half, shared through the account directory.
    pub public: PublicKeyDer,
    /// PKCS#8 private half, held only by the owning session.
    pub private: PrivateKeyDer,
}

impl KeyPair {
    /// Generate a fresh RSA-2048 keypair from caller-supplied entropy.
    ///
    /// Generation is deterministic for a seeded RNG, which the test
    /// harness relies on for reproducible runs.
    pub fn generate<R>(rng: &mut R) -> Result<Self, CryptoError>
    where
        R: rand::RngCore + rand::CryptoRng,
    {
        let private = RsaPrivateKey::new(rng, MODULUS_BITS)
            .map_err(|e| CryptoError::KeyGeneration { reason: e.to_string() })?;
        let public = RsaPublicKey::from(&private);

        let private_der = private
            .to_pkcs8_der()
            .map_err(|e| CryptoError::KeyEncoding { reason: e.to_string() })?;
        let public_der = public
            .to_public_key_der()
            .map_err(|e| CryptoError::KeyEncoding { reason: e.to_string() })?;

        Ok(Self {
            public: PublicKeyDer(public_der.as_bytes().to_vec()),
            private: PrivateKeyDer(private_der.as_bytes().to_vec()),
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};

    use super::*;

    #[test]
    fn generate_produces_importable_der() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let pair = KeyPair::generate(&mut rng).expect("keygen");

        RsaPrivateKey::from_pkcs8_der(pair.private.as_bytes()).expect("private import");
        RsaPublicKey::from_public_key_der(pair.public.as_bytes()).expect("public import");
    }

    #[test]
    fn same_seed_reproduces_keypair() {
        let mut rng1 = ChaCha20Rng::seed_from_u64(7);
        let mut rng2 = ChaCha20Rng::seed_from_u64(7);

        let pair1 = KeyPair::generate(&mut rng1).expect("keygen");
        let pair2 = KeyPair::generate(&mut rng2).expect("keygen");

        assert_eq!(pair1.public, pair2.public);
        assert_eq!(pair1.private.as_bytes(), pair2.private.as_bytes());
    }

    #[test]
    fn different_seeds_produce_distinct_keys() {
        let mut rng1 = ChaCha20Rng::seed_from_u64(1);
        let mut rng2 = ChaCha20Rng::seed_from_u64(2);

        let pair1 = KeyPair::generate(&mut rng1).expect("keygen");
        let pair2 = KeyPair::generate(&mut rng2).expect("keygen");

        assert_ne!(pair1.public, pair2.public);
    }

    #[test]
    fn private_key_debug_is_redacted() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let pair = KeyPair::generate(&mut rng).expect("keygen");

        let shown = format!("{:?}", pair.private);
        assert!(shown.contains("redacted"), "debug output leaks key bytes: {shown}");
        assert!(!shown.contains("[48,"), "debug output leaks DER bytes");
    }

    #[test]
    fn fingerprint_is_stable_and_grouped() {
        let key = PublicKeyDer::from_bytes(vec![1, 2, 3, 4]);
        let fp = key.fingerprint();
        assert_eq!(fp, key.fingerprint());
        assert_eq!(fp.len(), 9);
        assert_eq!(fp.as_bytes()[4], b'-');
    }
}
