//! Fuzz target for access key handling.
//!
//! # Strategy
//!
//! - Arbitrary UTF-8 thrown at normalize, parse, and verify
//!
//! # Invariants
//!
//! - Normalization never panics and is idempotent
//! - A string that parses verifies against the key it parsed to
//! - The grouped display of a parsed key re-parses to an equivalent key
//! - Verification against an unrelated key never panics

#![no_main]

use duplex_crypto::AccessKey;
use libfuzzer_sys::fuzz_target;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

fuzz_target!(|input: &str| {
    let normalized = AccessKey::normalize(input);
    assert_eq!(AccessKey::normalize(&normalized), normalized, "normalize must be idempotent");

    if let Ok(key) = input.parse::<AccessKey>() {
        assert!(key.verify(input), "a parsed key must verify its own source string");

        let shown = key.to_string();
        let reparsed = shown.parse::<AccessKey>().expect("display form must re-parse");
        assert!(reparsed.verify(input));
    }

    let mut rng = ChaCha20Rng::seed_from_u64(7);
    let unrelated = AccessKey::issue(&mut rng);
    let _ = unrelated.verify(input);
});
