//! Duplex Data Model
//!
//! The records shared by every layer of the Duplex messaging core: account
//! rows and their public projection, sealed envelopes, and the device-local
//! session. The store persists these types; the codec, gate, and sync layers
//! operate on them.
//!
//! # Conventions
//!
//! - Ids and timestamps are store-assigned; client-built inputs
//!   ([`NewAccount`], [`EnvelopeDraft`]) carry neither.
//! - Secret-bearing fields (credentials, private keys, access keys) redact
//!   themselves in `Debug` output.
//! - Serialization is CBOR via serde wherever bytes are needed.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod account;
pub mod envelope;
pub mod ids;
pub mod session;

pub use account::{AccountProfile, AccountRecord, Credential, NewAccount};
// Key material types appear in public fields of these records.
pub use duplex_crypto::{AccessKey, PrivateKeyDer, PublicKeyDer};
pub use envelope::{Ciphertext, Envelope, EnvelopeDraft, EnvelopePayload, PREVIEW_LEN, PayloadShape};
pub use ids::{AccountId, EnvelopeId};
pub use session::Session;
