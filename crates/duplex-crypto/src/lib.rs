//! Duplex Cryptographic Primitives
//!
//! Keypairs, RSA-OAEP encryption, and short access keys for the Duplex
//! messaging core.
//!
//! # Design
//!
//! All functions in this crate are pure - they have no side effects and
//! produce deterministic outputs given the same inputs. Random bytes required
//! for key generation and encryption must be provided by the caller,
//! enabling:
//!
//! - Deterministic testing with seeded RNG
//! - No coupling to application-level abstractions
//!
//! # Security Properties
//!
//! - Confidentiality: RSA-2048 OAEP with SHA-256; one block per message
//! - Key hygiene: private key DER is redacted in `Debug` and wiped on drop
//! - Access keys: uniform 36-character alphabet, constant-time verification

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod access_key;
pub mod error;
pub mod keypair;
pub mod oaep;

pub use access_key::{AccessKey, KEY_LEN};
pub use error::CryptoError;
pub use keypair::{KeyPair, MODULUS_BITS, PrivateKeyDer, PublicKeyDer};
pub use oaep::{Decryptor, MAX_PLAINTEXT_LEN, decrypt, encrypt};
