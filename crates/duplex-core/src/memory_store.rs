//! In-memory store implementations.
//!
//! [`MemoryStore`] is the reference implementation of the [`Store`]
//! contract. Clones share state, so a store handed to several clients
//! behaves like one shared service. [`ChaoticStore`] wraps any store and
//! injects outages on demand for fault testing.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::{SystemTime, UNIX_EPOCH},
};

use async_trait::async_trait;
use duplex_proto::{
    AccountId, AccountProfile, AccountRecord, Credential, Envelope, EnvelopeDraft, EnvelopeId,
    NewAccount,
};

use crate::store::{Store, StoreError};

fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as u64
}

#[derive(Debug, Default)]
struct Inner {
    accounts: Vec<AccountRecord>,
    envelopes: Vec<Envelope>,
    next_account_id: u64,
    next_envelope_id: u64,
}

/// Shared in-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of registered accounts.
    pub fn account_count(&self) -> usize {
        self.lock().accounts.len()
    }

    /// Number of stored envelopes, across all threads.
    pub fn envelope_count(&self) -> usize {
        self.lock().envelopes.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_account(&self, new_account: NewAccount) -> Result<AccountRecord, StoreError> {
        let mut inner = self.lock();
        if inner.accounts.iter().any(|a| a.username == new_account.username) {
            return Err(StoreError::UsernameTaken { username: new_account.username });
        }

        inner.next_account_id += 1;
        let record = AccountRecord {
            id: AccountId(inner.next_account_id),
            username: new_account.username,
            credential: new_account.credential,
            public_key: new_account.public_key,
            private_key: new_account.private_key,
            access_key: new_account.access_key,
            created_at_ms: now_ms(),
        };
        inner.accounts.push(record.clone());
        tracing::info!(id = %record.id, username = %record.username, "account created");
        Ok(record)
    }

    async fn authenticate(
        &self,
        username: &str,
        credential: &Credential,
    ) -> Result<AccountRecord, StoreError> {
        let inner = self.lock();
        let record = inner
            .accounts
            .iter()
            .find(|a| a.username == username)
            .ok_or(StoreError::AccountNotFound)?;
        if &record.credential != credential {
            return Err(StoreError::BadCredential);
        }
        Ok(record.clone())
    }

    async fn account(&self, id: AccountId) -> Result<AccountProfile, StoreError> {
        let inner = self.lock();
        inner
            .accounts
            .iter()
            .find(|a| a.id == id)
            .map(AccountRecord::profile)
            .ok_or(StoreError::AccountNotFound)
    }

    async fn list_accounts(&self) -> Result<Vec<AccountProfile>, StoreError> {
        // Accounts are stored in id order already.
        Ok(self.lock().accounts.iter().map(AccountRecord::profile).collect())
    }

    async fn append_envelope(&self, draft: EnvelopeDraft) -> Result<EnvelopeId, StoreError> {
        let mut inner = self.lock();
        inner.next_envelope_id += 1;
        let envelope = Envelope {
            id: EnvelopeId(inner.next_envelope_id),
            sender: draft.sender,
            receiver: draft.receiver,
            payload: draft.payload,
            timestamp_ms: now_ms(),
        };
        let id = envelope.id;
        inner.envelopes.push(envelope);
        Ok(id)
    }

    async fn list_thread(&self, a: AccountId, b: AccountId) -> Result<Vec<Envelope>, StoreError> {
        let inner = self.lock();
        let mut thread: Vec<Envelope> =
            inner.envelopes.iter().filter(|e| e.is_between(a, b)).cloned().collect();
        thread.sort_by_key(|e| (e.timestamp_ms, e.id));
        Ok(thread)
    }
}

#[derive(Debug, Default)]
struct Chaos {
    fail_next: u32,
    injected: u64,
}

/// Store wrapper that fails the next N operations on demand.
///
/// Failures are deterministic: [`ChaoticStore::inject_failures`] arms a
/// counter and each operation consumes one charge until it is exhausted,
/// returning [`StoreError::Unavailable`].
#[derive(Debug, Clone)]
pub struct ChaoticStore<S> {
    inner: S,
    chaos: Arc<Mutex<Chaos>>,
}

impl<S> ChaoticStore<S> {
    /// Wrap a store with no failures armed.
    pub fn new(inner: S) -> Self {
        Self { inner, chaos: Arc::new(Mutex::new(Chaos::default())) }
    }

    /// Arm the next `count` operations to fail.
    pub fn inject_failures(&self, count: u32) {
        self.chaos_lock().fail_next += count;
    }

    /// How many operations have failed by injection so far.
    pub fn injected_count(&self) -> u64 {
        self.chaos_lock().injected
    }

    fn chaos_lock(&self) -> MutexGuard<'_, Chaos> {
        self.chaos.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn trip(&self) -> Result<(), StoreError> {
        let mut chaos = self.chaos_lock();
        if chaos.fail_next > 0 {
            chaos.fail_next -= 1;
            chaos.injected += 1;
            return Err(StoreError::Unavailable { reason: "injected outage".to_string() });
        }
        Ok(())
    }
}

#[async_trait]
impl<S: Store> Store for ChaoticStore<S> {
    async fn create_account(&self, new_account: NewAccount) -> Result<AccountRecord, StoreError> {
        self.trip()?;
        self.inner.create_account(new_account).await
    }

    async fn authenticate(
        &self,
        username: &str,
        credential: &Credential,
    ) -> Result<AccountRecord, StoreError> {
        self.trip()?;
        self.inner.authenticate(username, credential).await
    }

    async fn account(&self, id: AccountId) -> Result<AccountProfile, StoreError> {
        self.trip()?;
        self.inner.account(id).await
    }

    async fn list_accounts(&self) -> Result<Vec<AccountProfile>, StoreError> {
        self.trip()?;
        self.inner.list_accounts().await
    }

    async fn append_envelope(&self, draft: EnvelopeDraft) -> Result<EnvelopeId, StoreError> {
        self.trip()?;
        self.inner.append_envelope(draft).await
    }

    async fn list_thread(&self, a: AccountId, b: AccountId) -> Result<Vec<Envelope>, StoreError> {
        self.trip()?;
        self.inner.list_thread(a, b).await
    }
}

#[cfg(test)]
mod tests {
    use duplex_crypto::AccessKey;
    use duplex_proto::{Ciphertext, EnvelopePayload, PrivateKeyDer, PublicKeyDer};

    use super::*;

    fn new_account(username: &str) -> NewAccount {
        NewAccount {
            username: username.to_string(),
            credential: Credential::from_bytes(vec![7; 32]),
            public_key: PublicKeyDer::from_bytes(vec![1; 8]),
            private_key: PrivateKeyDer::from_bytes(vec![2; 8]),
            access_key: "AAAA-BBBB-CCCC-DDDD".parse::<AccessKey>().expect("access key"),
        }
    }

    fn draft(sender: AccountId, receiver: AccountId) -> EnvelopeDraft {
        EnvelopeDraft {
            sender,
            receiver,
            payload: EnvelopePayload::dual(
                Ciphertext::from_bytes(vec![1; 4]),
                Ciphertext::from_bytes(vec![2; 4]),
            ),
        }
    }

    #[tokio::test]
    async fn create_assigns_monotonic_ids() {
        let store = MemoryStore::new();

        let alice = store.create_account(new_account("alice")).await.unwrap();
        let bob = store.create_account(new_account("bob")).await.unwrap();

        assert_eq!(alice.id, AccountId(1));
        assert_eq!(bob.id, AccountId(2));
        assert!(alice.created_at_ms > 0);
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let store = MemoryStore::new();
        store.create_account(new_account("alice")).await.unwrap();

        let err = store.create_account(new_account("alice")).await.unwrap_err();
        assert!(matches!(err, StoreError::UsernameTaken { username } if username == "alice"));
    }

    #[tokio::test]
    async fn authenticate_distinguishes_unknown_user_from_bad_credential() {
        let store = MemoryStore::new();
        store.create_account(new_account("alice")).await.unwrap();

        let unknown = store
            .authenticate("nobody", &Credential::from_bytes(vec![7; 32]))
            .await
            .unwrap_err();
        assert!(matches!(unknown, StoreError::AccountNotFound));

        let bad = store
            .authenticate("alice", &Credential::from_bytes(vec![8; 32]))
            .await
            .unwrap_err();
        assert!(matches!(bad, StoreError::BadCredential));

        let ok = store.authenticate("alice", &Credential::from_bytes(vec![7; 32])).await.unwrap();
        assert_eq!(ok.username, "alice");
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = MemoryStore::new();
        let clone = store.clone();

        store.create_account(new_account("alice")).await.unwrap();

        assert_eq!(clone.account_count(), 1);
        let listed = clone.list_accounts().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].username, "alice");
    }

    #[tokio::test]
    async fn profiles_never_leak_secrets() {
        let store = MemoryStore::new();
        let record = store.create_account(new_account("alice")).await.unwrap();

        let profile = store.account(record.id).await.unwrap();
        let shown = format!("{profile:?}");
        assert!(!shown.contains("redacted"), "profile should carry no secret fields: {shown}");
    }

    #[tokio::test]
    async fn list_thread_filters_and_orders() {
        let store = MemoryStore::new();
        let (a, b, c) = (AccountId(1), AccountId(2), AccountId(3));

        let first = store.append_envelope(draft(a, b)).await.unwrap();
        store.append_envelope(draft(a, c)).await.unwrap();
        let second = store.append_envelope(draft(b, a)).await.unwrap();
        let third = store.append_envelope(draft(a, b)).await.unwrap();

        let thread = store.list_thread(a, b).await.unwrap();
        let ids: Vec<EnvelopeId> = thread.iter().map(|e| e.id).collect();

        assert_eq!(ids, vec![first, second, third], "both directions, append order");
        assert!(thread.windows(2).all(|w| (w[0].timestamp_ms, w[0].id)
            <= (w[1].timestamp_ms, w[1].id)));
    }

    #[tokio::test]
    async fn list_thread_is_symmetric() {
        let store = MemoryStore::new();
        let (a, b) = (AccountId(1), AccountId(2));
        store.append_envelope(draft(a, b)).await.unwrap();

        assert_eq!(store.list_thread(a, b).await.unwrap(), store.list_thread(b, a).await.unwrap());
    }

    #[tokio::test]
    async fn chaotic_store_fails_exactly_the_armed_count() {
        let store = ChaoticStore::new(MemoryStore::new());
        store.inject_failures(2);

        let e1 = store.list_accounts().await.unwrap_err();
        assert!(matches!(e1, StoreError::Unavailable { .. }));
        let e2 = store.list_accounts().await.unwrap_err();
        assert!(matches!(e2, StoreError::Unavailable { .. }));

        assert!(store.list_accounts().await.is_ok(), "charges exhausted");
        assert_eq!(store.injected_count(), 2);
    }

    #[tokio::test]
    async fn chaotic_store_passes_through_when_calm() {
        let store = ChaoticStore::new(MemoryStore::new());

        let record = store.create_account(new_account("alice")).await.unwrap();
        assert_eq!(store.account(record.id).await.unwrap().username, "alice");
    }
}
