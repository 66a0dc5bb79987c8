//! Store contract: the external collaborator holding accounts and envelopes.
//!
//! The store is an account directory plus an append-only envelope log. It is
//! trusted to return exactly what was written; it never sees plaintext, and
//! the only secrets it holds are the opaque blobs registration hands it.
//! Real deployments put a database or network service behind this trait;
//! [`MemoryStore`](crate::memory_store::MemoryStore) is the in-process
//! implementation.

use async_trait::async_trait;
use duplex_proto::{
    AccountId, AccountProfile, AccountRecord, Credential, Envelope, EnvelopeDraft, EnvelopeId,
    NewAccount,
};
use thiserror::Error;

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The username is already registered.
    #[error("username already taken: {username}")]
    UsernameTaken {
        /// The conflicting username.
        username: String,
    },

    /// No account matches the lookup.
    #[error("account not found")]
    AccountNotFound,

    /// The username exists but the credential does not match.
    #[error("bad credential")]
    BadCredential,

    /// The store could not service the request; retrying later may succeed.
    #[error("store unavailable: {reason}")]
    Unavailable {
        /// Description of the outage.
        reason: String,
    },
}

/// Account directory and envelope log.
#[async_trait]
pub trait Store: Send + Sync {
    /// Create an account, assigning its id and creation timestamp.
    ///
    /// Returns the full record, keys included, so the registering client
    /// can build its session. Duplicate usernames are rejected with
    /// [`StoreError::UsernameTaken`].
    async fn create_account(&self, new_account: NewAccount) -> Result<AccountRecord, StoreError>;

    /// Look up an account by username and verify the credential.
    ///
    /// Unknown username is [`StoreError::AccountNotFound`]; a present
    /// username with a non-matching credential is
    /// [`StoreError::BadCredential`]. Success returns the full record,
    /// private key included.
    async fn authenticate(
        &self,
        username: &str,
        credential: &Credential,
    ) -> Result<AccountRecord, StoreError>;

    /// The public projection of one account.
    ///
    /// Never exposes the credential, private key, or access key.
    async fn account(&self, id: AccountId) -> Result<AccountProfile, StoreError>;

    /// The directory: public projections of every account, ordered by id.
    async fn list_accounts(&self) -> Result<Vec<AccountProfile>, StoreError>;

    /// Append an envelope, assigning its id and timestamp.
    ///
    /// Ids are monotonic, which breaks ordering ties between envelopes
    /// appended within the same millisecond.
    async fn append_envelope(&self, draft: EnvelopeDraft) -> Result<EnvelopeId, StoreError>;

    /// Every envelope between `a` and `b`, in either direction, ascending
    /// by `(timestamp_ms, id)`.
    async fn list_thread(&self, a: AccountId, b: AccountId) -> Result<Vec<Envelope>, StoreError>;
}
