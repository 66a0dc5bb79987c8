//! Background refresh of one conversation.
//!
//! A [`ThreadView`] is the single mutable snapshot of a two-party thread:
//! the ordered envelope list plus its [`DecryptionGate`]. [`ConversationSync`]
//! owns the polling loop that keeps a shared view current: fetch once
//! immediately, then again every interval until cancelled. All mutation goes
//! through [`ThreadView::apply`], so readers never observe a half-replaced
//! list or a cache that disagrees with it.

use std::sync::Arc;
use std::time::Duration;

use duplex_proto::{AccountId, AccountProfile, Envelope, EnvelopeId, Session};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::env::Environment;
use crate::gate::{DecryptionGate, GateError, MessageDisplay};
use crate::store::{Store, StoreError};

/// How often the refresh loop polls the store.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(2);

/// A [`ThreadView`] shared between the refresh loop and its callers.
pub type SharedThreadView = Arc<tokio::sync::Mutex<ThreadView>>;

/// One account's live view of one conversation.
#[derive(Debug)]
pub struct ThreadView {
    self_id: AccountId,
    peer: AccountProfile,
    envelopes: Vec<Envelope>,
    gate: DecryptionGate,
}

impl ThreadView {
    /// An empty, locked view of the thread with `peer`.
    pub fn new(self_id: AccountId, peer: AccountProfile) -> Self {
        Self { self_id, peer, envelopes: Vec::new(), gate: DecryptionGate::new() }
    }

    /// The viewing account.
    pub fn self_id(&self) -> AccountId {
        self.self_id
    }

    /// The other party.
    pub fn peer(&self) -> &AccountProfile {
        &self.peer
    }

    /// Envelopes in ascending `(timestamp_ms, id)` order.
    pub fn envelopes(&self) -> &[Envelope] {
        &self.envelopes
    }

    /// The gate, for state inspection.
    pub fn gate(&self) -> &DecryptionGate {
        &self.gate
    }

    /// Replace the whole envelope list and bring the gate's cache up to
    /// date in the same step.
    pub fn apply(&mut self, envelopes: Vec<Envelope>) {
        self.envelopes = envelopes;
        self.gate.refresh(&self.envelopes);
    }

    /// Unlock against the current envelope list.
    pub fn unlock(&mut self, session: &Session, candidate: &str) -> Result<(), GateError> {
        self.gate.submit(session, candidate, &self.envelopes)
    }

    /// Relock, discarding all plaintext.
    pub fn relock(&mut self) {
        self.gate.relock();
    }

    /// Sending requires an unlocked gate.
    pub fn ensure_can_send(&self) -> Result<(), GateError> {
        self.gate.ensure_unlocked()
    }

    /// What to render, one entry per envelope, in list order.
    pub fn messages(&self) -> Vec<(EnvelopeId, MessageDisplay)> {
        self.envelopes
            .iter()
            .map(|envelope| (envelope.id, self.gate.display(envelope, self.self_id)))
            .collect()
    }

    /// Wrap for sharing with the refresh loop.
    pub fn into_shared(self) -> SharedThreadView {
        Arc::new(tokio::sync::Mutex::new(self))
    }
}

/// Polling refresh driver for one conversation.
#[derive(Debug)]
pub struct ConversationSync<S, E> {
    store: Arc<S>,
    env: E,
    interval: Duration,
}

impl<S, E> ConversationSync<S, E>
where
    S: Store + 'static,
    E: Environment,
{
    /// Driver with the default interval.
    pub fn new(store: Arc<S>, env: E) -> Self {
        Self { store, env, interval: DEFAULT_REFRESH_INTERVAL }
    }

    /// Override the polling interval.
    #[must_use]
    pub fn with_interval(self, interval: Duration) -> Self {
        Self { interval, ..self }
    }

    /// One fetch of the full thread, ordered ascending by
    /// `(timestamp_ms, id)`.
    pub async fn fetch(
        &self,
        self_id: AccountId,
        peer_id: AccountId,
    ) -> Result<Vec<Envelope>, StoreError> {
        self.store.list_thread(self_id, peer_id).await
    }

    /// Start the refresh loop over `view`.
    ///
    /// The first fetch happens before the first sleep. A failed fetch is
    /// logged and leaves the view stale until the next tick. The loop runs
    /// until the returned handle is stopped or dropped.
    pub fn spawn(self, view: SharedThreadView) -> SyncHandle {
        let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let (self_id, peer_id) = {
                let view = view.lock().await;
                (view.self_id(), view.peer().id)
            };
            loop {
                match self.fetch(self_id, peer_id).await {
                    Ok(envelopes) => view.lock().await.apply(envelopes),
                    Err(error) => {
                        tracing::warn!(%error, "thread refresh failed, view left stale");
                    },
                }
                tokio::select! {
                    _ = &mut cancel_rx => break,
                    () = self.env.sleep(self.interval) => {},
                }
            }
            tracing::debug!(%self_id, %peer_id, "conversation sync stopped");
        });
        SyncHandle { cancel: Some(cancel_tx), task }
    }
}

/// Handle to a running refresh loop.
///
/// Cancellation fires exactly once: the sender is consumed by whichever of
/// [`SyncHandle::stop`] or drop runs first.
#[derive(Debug)]
pub struct SyncHandle {
    cancel: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl SyncHandle {
    /// Cancel the loop and wait for it to exit.
    ///
    /// After this returns the view is never mutated by the loop again.
    pub async fn stop(mut self) {
        self.signal();
        let _ = (&mut self.task).await;
    }

    /// Whether the loop has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    fn signal(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            // The loop may already have exited; a dead receiver is fine.
            let _ = cancel.send(());
        }
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        self.signal();
        self.task.abort();
    }
}
