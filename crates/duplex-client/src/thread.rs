//! One open conversation, kept current in the background.
//!
//! [`ThreadClient`] ties a session to a peer: it owns the shared
//! [`ThreadView`], the sync loop keeping it fresh, and the operations a
//! frontend calls (unlock, relock, send, render). Dropping the client
//! cancels the loop; [`ThreadClient::close`] does so gracefully.

use std::sync::Arc;
use std::time::Duration;

use duplex_core::{
    ConversationSync, Environment, GateState, MessageDisplay, SharedThreadView, Store, SyncHandle,
    ThreadView, seal,
};
use duplex_proto::{AccountId, AccountProfile, EnvelopeDraft, EnvelopeId, Session};

use crate::error::ClientError;

/// A session's handle on one two-party conversation.
#[derive(Debug)]
pub struct ThreadClient<S, E> {
    store: Arc<S>,
    env: E,
    session: Session,
    view: SharedThreadView,
    sync: Option<SyncHandle>,
}

impl<S, E> ThreadClient<S, E>
where
    S: Store + 'static,
    E: Environment,
{
    /// Open the conversation with `peer_id`.
    ///
    /// Resolves the peer, performs the initial fetch so the first render is
    /// populated, then starts the refresh loop at `interval`.
    pub async fn open(
        env: E,
        store: Arc<S>,
        session: Session,
        peer_id: AccountId,
        interval: Duration,
    ) -> Result<Self, ClientError> {
        let peer = store.account(peer_id).await?;
        tracing::info!(self_id = %session.account_id, peer = %peer.username, "thread opened");

        let view = ThreadView::new(session.account_id, peer).into_shared();
        let sync = ConversationSync::new(Arc::clone(&store), env.clone()).with_interval(interval);

        let envelopes = sync.fetch(session.account_id, peer_id).await?;
        view.lock().await.apply(envelopes);

        let sync = sync.spawn(Arc::clone(&view));
        Ok(Self { store, env, session, view, sync: Some(sync) })
    }

    /// The session this thread is viewed through.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The other party.
    pub async fn peer(&self) -> AccountProfile {
        self.view.lock().await.peer().clone()
    }

    /// Current gate state.
    pub async fn gate_state(&self) -> GateState {
        self.view.lock().await.gate().state()
    }

    /// Submit an access key to unlock the thread.
    pub async fn unlock(&self, candidate: &str) -> Result<(), ClientError> {
        self.view.lock().await.unlock(&self.session, candidate).map_err(ClientError::from)
    }

    /// Relock the thread, discarding all plaintext.
    pub async fn relock(&self) {
        self.view.lock().await.relock();
    }

    /// Seal and append a message, then refresh immediately.
    ///
    /// The view lock is held across the append so the unlocked-gate guard
    /// stays true for the whole operation, and the sender sees their own
    /// message as soon as this returns.
    pub async fn send(&self, text: &str) -> Result<EnvelopeId, ClientError> {
        let mut view = self.view.lock().await;
        view.ensure_can_send()?;

        let payload =
            seal(&mut self.env.rng(), text, &self.session.public_key, &view.peer().public_key)?;
        let draft = EnvelopeDraft {
            sender: self.session.account_id,
            receiver: view.peer().id,
            payload,
        };
        let id = self.store.append_envelope(draft).await?;
        tracing::debug!(%id, "message sent");

        let envelopes =
            self.store.list_thread(self.session.account_id, view.peer().id).await?;
        view.apply(envelopes);
        Ok(id)
    }

    /// Fetch and apply the thread now, without waiting for the next tick.
    pub async fn refresh_now(&self) -> Result<(), ClientError> {
        let mut view = self.view.lock().await;
        let envelopes =
            self.store.list_thread(self.session.account_id, view.peer().id).await?;
        view.apply(envelopes);
        Ok(())
    }

    /// Render snapshot, one entry per envelope in thread order.
    pub async fn messages(&self) -> Vec<(EnvelopeId, MessageDisplay)> {
        self.view.lock().await.messages()
    }

    /// Stop the refresh loop and wait for it to exit.
    ///
    /// Safe to call once; dropping an unclosed client cancels the loop
    /// abruptly instead.
    pub async fn close(&mut self) {
        if let Some(sync) = self.sync.take() {
            sync.stop().await;
        }
    }
}
