//! Fuzz target for envelope opening.
//!
//! # Strategy
//!
//! - Arbitrary payload shapes: every combination of present and absent
//!   halves, arbitrary ciphertext bytes, viewed from either role
//!
//! # Invariants
//!
//! - Opening never panics, whatever the payload holds
//! - `Corrupt` is decided by shape alone: exactly the payloads offering
//!   no ciphertext for the viewer's role

#![no_main]

use std::sync::OnceLock;

use arbitrary::Arbitrary;
use duplex_core::{DecodeOutcome, EnvelopeOpener};
use duplex_crypto::KeyPair;
use duplex_proto::{AccountId, Ciphertext, Envelope, EnvelopeId, EnvelopePayload};
use libfuzzer_sys::fuzz_target;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

const SELF_ID: AccountId = AccountId(1);
const PEER_ID: AccountId = AccountId(2);

#[derive(Debug, Arbitrary)]
struct FuzzPayload {
    for_sender: Option<Vec<u8>>,
    for_receiver: Option<Vec<u8>>,
    legacy: Option<Vec<u8>>,
    from_self: bool,
}

fn opener() -> &'static EnvelopeOpener {
    static OPENER: OnceLock<EnvelopeOpener> = OnceLock::new();
    OPENER.get_or_init(|| {
        let mut rng = ChaCha20Rng::seed_from_u64(5000);
        let pair = KeyPair::generate(&mut rng).expect("keygen");
        EnvelopeOpener::new(SELF_ID, &pair.private).expect("opener")
    })
}

fuzz_target!(|input: FuzzPayload| {
    let payload = EnvelopePayload {
        for_sender: input.for_sender.map(Ciphertext::from_bytes),
        for_receiver: input.for_receiver.map(Ciphertext::from_bytes),
        legacy: input.legacy.map(Ciphertext::from_bytes),
    };

    let (sender, receiver) = if input.from_self { (SELF_ID, PEER_ID) } else { (PEER_ID, SELF_ID) };
    let envelope = Envelope { id: EnvelopeId(1), sender, receiver, payload, timestamp_ms: 0 };

    let addressable = envelope.payload.ciphertext_for(input.from_self).is_some();
    let outcome = opener().open(&envelope);

    assert_eq!(
        matches!(outcome, DecodeOutcome::Corrupt),
        !addressable,
        "corrupt must be shape-driven: {:?}",
        envelope.payload
    );
});
