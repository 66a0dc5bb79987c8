//! Account onboarding: registration, login, logout, peer directory.
//!
//! The store never sees a password. Clients derive a fixed-width
//! [`Credential`] locally and authenticate with that; everything else the
//! account needs (keypair, access key) is generated here at registration
//! time from the environment's entropy.

use duplex_core::{Environment, SessionStore, Store};
use duplex_crypto::{AccessKey, KeyPair};
use duplex_proto::{AccountId, AccountProfile, Credential, NewAccount, Session};
use sha2::{Digest, Sha256};

use crate::error::ClientError;

/// Derive the stored credential from a password.
///
/// SHA-256 over the raw password bytes. Deliberately unsalted: the store
/// compares credentials in constant time and holds nothing else derived
/// from the password.
pub fn derive_credential(password: &str) -> Credential {
    Credential::from_bytes(Sha256::digest(password.as_bytes()).to_vec())
}

/// Create an account and open its session.
///
/// Validates the inputs, generates the keypair and access key from `env`'s
/// entropy, registers with the store, and persists the resulting session.
/// The returned session carries the private key and access key; the caller
/// is expected to show the access key to the user once.
pub async fn register<E, S, L>(
    env: &E,
    store: &S,
    sessions: &L,
    username: &str,
    password: &str,
) -> Result<Session, ClientError>
where
    E: Environment,
    S: Store,
    L: SessionStore,
{
    let username = username.trim();
    if username.is_empty() {
        return Err(ClientError::Validation { reason: "username must not be empty".to_string() });
    }
    if password.is_empty() {
        return Err(ClientError::Validation { reason: "password must not be empty".to_string() });
    }

    let mut rng = env.rng();
    let keys = KeyPair::generate(&mut rng)?;
    let access_key = AccessKey::issue(&mut rng);

    let record = store
        .create_account(NewAccount {
            username: username.to_string(),
            credential: derive_credential(password),
            public_key: keys.public,
            private_key: keys.private,
            access_key,
        })
        .await?;
    tracing::info!(id = %record.id, username = %record.username, "account registered");

    let session = Session::from(record);
    sessions.put(&session)?;
    Ok(session)
}

/// Authenticate and open a session for an existing account.
pub async fn login<S, L>(
    store: &S,
    sessions: &L,
    username: &str,
    password: &str,
) -> Result<Session, ClientError>
where
    S: Store,
    L: SessionStore,
{
    let record = store.authenticate(username.trim(), &derive_credential(password)).await?;
    tracing::info!(id = %record.id, username = %record.username, "logged in");

    let session = Session::from(record);
    sessions.put(&session)?;
    Ok(session)
}

/// Forget the current session. Idempotent.
pub fn logout<L: SessionStore>(sessions: &L) {
    sessions.clear();
    tracing::info!("logged out");
}

/// Everyone except `self_id`, for the peer picker.
pub async fn directory<S: Store>(
    store: &S,
    self_id: AccountId,
) -> Result<Vec<AccountProfile>, ClientError> {
    let mut profiles = store.list_accounts().await?;
    profiles.retain(|profile| profile.id != self_id);
    Ok(profiles)
}
