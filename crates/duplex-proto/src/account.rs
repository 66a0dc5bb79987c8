//! Account records and their public projection.

use duplex_crypto::{AccessKey, PrivateKeyDer, PublicKeyDer};
use serde::{Deserialize, Serialize};

use crate::ids::AccountId;

/// Client-side digest of an account password.
///
/// The store only ever sees this digest, never the password itself.
///
/// # Security
///
/// - **Debug Redaction**: The `Debug` impl shows only the digest length.
/// - **Constant-time equality**: `PartialEq` compares without early exit, so
///   authentication timing does not depend on where digests diverge.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credential(Vec<u8>);

impl Credential {
    /// Wrap raw digest bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// The digest bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl PartialEq for Credential {
    fn eq(&self, other: &Self) -> bool {
        if self.0.len() != other.0.len() {
            return false;
        }
        let mut diff = 0u8;
        for (a, b) in self.0.iter().zip(&other.0) {
            diff |= a ^ b;
        }
        diff == 0
    }
}

impl Eq for Credential {}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Credential(<redacted {} bytes>)", self.0.len())
    }
}

/// Input to account creation.
///
/// The store assigns the id and creation timestamp; everything else is
/// provisioned client-side before registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
    /// Unique display name, trimmed and non-empty.
    pub username: String,
    /// Password digest.
    pub credential: Credential,
    /// SPKI public key, shared through the directory.
    pub public_key: PublicKeyDer,
    /// PKCS#8 private key, echoed back only to the owning session.
    pub private_key: PrivateKeyDer,
    /// The holder's access key.
    pub access_key: AccessKey,
}

/// A full account row as held by the store.
///
/// Returned by registration and authentication so the client can build its
/// session; never exposed through directory lookups (see [`AccountProfile`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Store-assigned id.
    pub id: AccountId,
    /// Unique display name.
    pub username: String,
    /// Password digest.
    pub credential: Credential,
    /// SPKI public key.
    pub public_key: PublicKeyDer,
    /// PKCS#8 private key.
    pub private_key: PrivateKeyDer,
    /// The holder's access key.
    pub access_key: AccessKey,
    /// Creation time, unix milliseconds, store-assigned.
    pub created_at_ms: u64,
}

impl AccountRecord {
    /// The public projection of this account: what anyone may see.
    pub fn profile(&self) -> AccountProfile {
        AccountProfile {
            id: self.id,
            username: self.username.clone(),
            public_key: self.public_key.clone(),
        }
    }
}

/// Public projection of an account.
///
/// Carries everything a peer needs to seal messages for this account and
/// nothing else: no credential, no private key, no access key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProfile {
    /// Store-assigned id.
    pub id: AccountId,
    /// Unique display name.
    pub username: String,
    /// SPKI public key.
    pub public_key: PublicKeyDer,
}
