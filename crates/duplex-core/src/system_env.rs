//! Production Environment implementation using system time and RNG.

use std::time::{Duration, Instant};

use crate::env::Environment;

/// Production environment backed by real system resources.
///
/// - `std::time::Instant::now()` for time
/// - `tokio::time::sleep()` for async sleeping
/// - `getrandom` for cryptographic randomness (OS entropy pool)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        getrandom::fill(buffer).unwrap_or_else(|e| {
            // Entropy exhaustion should not happen on supported platforms.
            // Zero-fill instead of panicking; key generation with zeroed
            // entropy fails loudly downstream.
            tracing::error!("getrandom failed: {e}");
            buffer.fill(0);
        });
    }
}
