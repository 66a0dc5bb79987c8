//! Environment abstraction for deterministic testing.
//!
//! The `Environment` trait decouples the messaging core from system
//! resources (time, randomness). Production code runs on
//! [`SystemEnv`](crate::system_env::SystemEnv); the test harness substitutes
//! a seeded implementation so entire runs replay bit-for-bit, key
//! generation included.
//!
//! # Invariants
//!
//! - Monotonicity: `env.now()` must never go backwards
//! - Determinism: Given the same seed, `random_bytes()` produces the same
//!   sequence
//! - Isolation: Implementations must not share global state

use std::time::{Duration, Instant};

/// Abstract environment providing time, sleeping, and randomness.
///
/// # Safety
///
/// Implementations MUST guarantee:
///
/// 1. Time monotonicity: `now()` never goes backwards
/// 2. RNG quality: `random_bytes()` uses cryptographically secure entropy in
///    production
/// 3. Minimal panics: Methods are infallible except in exceptional
///    circumstances (e.g., OS entropy exhaustion)
pub trait Environment: Clone + Send + Sync + 'static {
    /// Returns the current time.
    fn now(&self) -> Instant;

    /// Sleeps for the specified duration.
    ///
    /// The only async method in the trait; only the refresh loop driver
    /// awaits it, never protocol logic.
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;

    /// Fills the provided buffer with random bytes.
    ///
    /// Production implementations MUST draw from the OS entropy pool
    /// (`getrandom`), not `rand::thread_rng()`. Harness implementations
    /// use a seeded stream and log the seed for reproducibility.
    fn random_bytes(&self, buffer: &mut [u8]);

    /// A `rand_core`-compatible view over this environment's entropy.
    ///
    /// Keypair generation, access-key issuance, and OAEP sealing all take
    /// `impl RngCore + CryptoRng`; this adapter feeds them without coupling
    /// the crypto crate to the environment.
    fn rng(&self) -> EnvRng<'_, Self> {
        EnvRng { env: self }
    }
}

/// RNG adapter returned by [`Environment::rng`].
#[derive(Debug)]
pub struct EnvRng<'a, E: Environment> {
    env: &'a E,
}

impl<E: Environment> rand::RngCore for EnvRng<'_, E> {
    fn next_u32(&mut self) -> u32 {
        let mut bytes = [0u8; 4];
        self.env.random_bytes(&mut bytes);
        u32::from_be_bytes(bytes)
    }

    fn next_u64(&mut self) -> u64 {
        let mut bytes = [0u8; 8];
        self.env.random_bytes(&mut bytes);
        u64::from_be_bytes(bytes)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.env.random_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.env.random_bytes(dest);
        Ok(())
    }
}

// The Environment contract requires cryptographically secure entropy, which
// is exactly the CryptoRng marker's meaning.
impl<E: Environment> rand::CryptoRng for EnvRng<'_, E> {}
