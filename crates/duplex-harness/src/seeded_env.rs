//! Seeded environment for reproducible tests.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use duplex_core::Environment;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Environment whose entropy is a seeded ChaCha20 stream.
///
/// Two instances with the same seed produce identical keypairs, access
/// keys, and ciphertexts, so any failing test names its seed and replays
/// exactly. Time is left to the runtime: under `start_paused` tests the
/// sleeps auto-advance deterministically anyway.
#[derive(Debug, Clone)]
pub struct SeededEnv {
    rng: Arc<Mutex<ChaCha20Rng>>,
}

impl SeededEnv {
    /// Environment drawing entropy from `seed`.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        tracing::debug!(seed, "seeded environment");
        Self { rng: Arc::new(Mutex::new(ChaCha20Rng::seed_from_u64(seed))) }
    }
}

impl Environment for SeededEnv {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner).fill_bytes(buffer);
    }
}
