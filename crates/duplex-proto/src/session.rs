//! Device-local session state.

use duplex_crypto::{AccessKey, PrivateKeyDer, PublicKeyDer};
use serde::{Deserialize, Serialize};

use crate::{account::AccountRecord, ids::AccountId};

/// What a device holds after registration or login.
///
/// The private key is optional: a session restored from storage may predate
/// key provisioning or have been stripped, and the decryption gate checks
/// for its presence before unlocking.
///
/// # Security
///
/// Secret-bearing fields redact themselves in `Debug` output, so a session
/// is safe to log.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    /// The account this session belongs to.
    pub account_id: AccountId,
    /// Display name, for rendering.
    pub username: String,
    /// SPKI public key of the account.
    pub public_key: PublicKeyDer,
    /// PKCS#8 private key, when the device holds one.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub private_key: Option<PrivateKeyDer>,
    /// The holder's access key.
    pub access_key: AccessKey,
}

impl Session {
    /// Whether this session can ever unlock a conversation.
    pub fn has_private_key(&self) -> bool {
        self.private_key.is_some()
    }
}

impl From<AccountRecord> for Session {
    fn from(record: AccountRecord) -> Self {
        Self {
            account_id: record.id,
            username: record.username,
            public_key: record.public_key,
            private_key: Some(record.private_key),
            access_key: record.access_key,
        }
    }
}
