//! Fuzz target for the conversation reference model.
//!
//! The model is the oracle the real implementation is tested against, so
//! it gets fuzzed on its own: a broken oracle silently weakens everything
//! compared to it.
//!
//! # Strategy
//!
//! - Arbitrary operation sequences applied to a fresh model
//!
//! # Invariants
//!
//! - Applying operations never panics
//! - A party's cursor never passes the log
//! - Rendering length always equals the cursor
//! - Locked views render only sealed entries, unlocked only text
//! - The log never holds a blank or over-budget message

#![no_main]

use duplex_core::MAX_MESSAGE_LEN;
use duplex_harness::{ModelWorld, Operation, Rendered};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|ops: Vec<Operation>| {
    let mut world = ModelWorld::new();

    for op in &ops {
        let _ = world.apply(op);

        for party in 0..2u8 {
            let seen = world.seen(party);
            assert!(seen <= world.thread().len(), "cursor past the log");

            let rendered = world.rendered(party);
            assert_eq!(rendered.len(), seen, "rendering must cover exactly what was pulled");
            for entry in rendered {
                match entry {
                    Rendered::Text(_) => assert!(world.is_unlocked(party)),
                    Rendered::Sealed => assert!(!world.is_unlocked(party)),
                }
            }
        }
    }

    for message in world.thread() {
        assert!(!message.text.trim().is_empty(), "blank message in the log");
        assert!(message.text.len() <= MAX_MESSAGE_LEN, "over-budget message in the log");
    }
});
