//! Duplex demo binary.
//!
//! Runs a scripted two-party conversation against an in-process store:
//! registration, the locked/unlocked gate, sealed previews, wrong-key
//! rejection, and both parties reading the same thread. Everything is
//! logged; read the output top to bottom.
//!
//! # Usage
//!
//! ```bash
//! duplex
//! duplex --refresh-interval-ms 500 --log-level debug
//! ```

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use duplex_client::{ThreadClient, directory, login, register};
use duplex_core::{MemorySessionStore, MemoryStore, MessageDisplay, SystemEnv};
use duplex_proto::EnvelopeId;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Duplex messaging demo
#[derive(Parser, Debug)]
#[command(name = "duplex")]
#[command(about = "Scripted two-party walkthrough of the Duplex messaging core")]
#[command(version)]
struct Args {
    /// Background refresh interval in milliseconds
    #[arg(long, default_value = "2000")]
    refresh_interval_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn render(who: &str, messages: &[(EnvelopeId, MessageDisplay)]) {
    tracing::info!(who, count = messages.len(), "thread snapshot");
    for (id, display) in messages {
        match display {
            MessageDisplay::Sealed { preview } => {
                tracing::info!(%id, preview, "sealed");
            },
            MessageDisplay::Decrypted { text } => {
                tracing::info!(%id, text, "decrypted");
            },
            MessageDisplay::WrongKey => {
                tracing::warn!(%id, "not addressed to this key");
            },
            MessageDisplay::Corrupt => {
                tracing::warn!(%id, "corrupt payload");
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let interval = Duration::from_millis(args.refresh_interval_ms);
    let env = SystemEnv::new();
    let store = Arc::new(MemoryStore::new());
    let sessions = MemorySessionStore::new();

    tracing::info!("registering alice and bob");
    let alice = register(&env, store.as_ref(), &sessions, "alice", "correct horse").await?;
    tracing::info!(access_key = %alice.access_key, "alice's access key, shown once");
    let bob = register(&env, store.as_ref(), &sessions, "bob", "battery staple").await?;
    tracing::info!(access_key = %bob.access_key, "bob's access key, shown once");

    tracing::info!("alice lists the directory to pick a peer");
    for profile in directory(store.as_ref(), alice.account_id).await? {
        tracing::info!(
            id = %profile.id,
            username = %profile.username,
            fingerprint = %profile.public_key.fingerprint(),
            "directory entry"
        );
    }

    tracing::info!("alice opens the thread with bob");
    let mut alice_thread =
        ThreadClient::open(env, Arc::clone(&store), alice.clone(), bob.account_id, interval)
            .await?;

    match alice_thread.send("hello bob").await {
        Err(error) => tracing::info!(%error, "send refused while locked, as it should be"),
        Ok(id) => tracing::warn!(%id, "send succeeded on a locked thread"),
    }

    tracing::info!("alice unlocks with her access key and sends");
    alice_thread.unlock(&alice.access_key.to_string()).await?;
    alice_thread.send("hello bob").await?;
    alice_thread.send("the thread stays encrypted at rest").await?;
    render("alice", &alice_thread.messages().await);

    tracing::info!("bob logs in and opens the thread");
    let bob = login(store.as_ref(), &sessions, "bob", "battery staple").await?;
    let mut bob_thread =
        ThreadClient::open(env, Arc::clone(&store), bob.clone(), alice.account_id, interval)
            .await?;

    tracing::info!("locked view: sealed previews only");
    render("bob", &bob_thread.messages().await);

    match bob_thread.unlock("AAAA-BBBB-CCCC-DDDD").await {
        Err(error) => tracing::info!(%error, "wrong access key rejected"),
        Ok(()) => tracing::warn!("wrong access key accepted"),
    }

    tracing::info!("bob unlocks with his own key and replies");
    bob_thread.unlock(&bob.access_key.to_string()).await?;
    render("bob", &bob_thread.messages().await);
    bob_thread.send("hello alice, reading you clearly").await?;

    tracing::info!("alice refreshes and reads the reply");
    alice_thread.refresh_now().await?;
    render("alice", &alice_thread.messages().await);

    tracing::info!("alice relocks; plaintext is gone from her view");
    alice_thread.relock().await;
    render("alice", &alice_thread.messages().await);

    alice_thread.close().await;
    bob_thread.close().await;
    tracing::info!("demo complete");

    Ok(())
}
