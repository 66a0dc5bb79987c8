//! Model-based property tests.
//!
//! Random operation sequences are applied to the reference model and to the
//! real gate/view stack, and the two must agree on every result and on the
//! full observable state after every step.
//!
//! # Architecture
//!
//! ```text
//! proptest generates: Vec<Operation>
//!                          │
//!           ┌──────────────┼──────────────┐
//!           ▼              ▼              ▼
//!      ModelWorld     RealWorld       Compare
//!      (reference)   (gate + view)    Results
//! ```

use std::sync::OnceLock;

use duplex_core::{
    CodecError, GateError, GateState, MAX_MESSAGE_LEN, MessageDisplay, ThreadView, seal,
};
use duplex_crypto::{AccessKey, KeyPair};
use duplex_harness::{
    KeyChoice, ModelWorld, ObservableState, Operation, OperationError, OperationResult, PartyId,
    Rendered, SmallText,
};
use duplex_proto::{AccountId, AccountProfile, Envelope, EnvelopeId, Session};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

const ACCESS_KEYS: [&str; 2] = ["AAAA-BBBB-CCCC-DDDD", "EEEE-FFFF-GGGG-HHHH"];

fn pairs() -> &'static (KeyPair, KeyPair) {
    static PAIRS: OnceLock<(KeyPair, KeyPair)> = OnceLock::new();
    PAIRS.get_or_init(|| {
        let mut rng = ChaCha20Rng::seed_from_u64(4000);
        let alice = KeyPair::generate(&mut rng).expect("keygen");
        let bob = KeyPair::generate(&mut rng).expect("keygen");
        (alice, bob)
    })
}

fn profile(index: usize) -> AccountProfile {
    let (alice, bob) = pairs();
    let (pair, name) = if index == 0 { (alice, "alice") } else { (bob, "bob") };
    AccountProfile {
        id: AccountId(index as u64 + 1),
        username: name.to_string(),
        public_key: pair.public.clone(),
    }
}

fn session(index: usize) -> Session {
    let (alice, bob) = pairs();
    let pair = if index == 0 { alice } else { bob };
    let profile = profile(index);
    Session {
        account_id: profile.id,
        username: profile.username,
        public_key: profile.public_key,
        private_key: Some(pair.private.clone()),
        access_key: ACCESS_KEYS[index].parse::<AccessKey>().expect("valid key"),
    }
}

/// The party's own key with the final character swapped out.
fn mangled(key: &str) -> String {
    let mut out = key.to_string();
    out.pop();
    out.push('X');
    out
}

struct Party {
    session: Session,
    view: ThreadView,
}

/// Real system wrapper that mirrors the model's interface.
///
/// No store and no runtime: the shared log stands in for the thread, and a
/// refresh is an [`ThreadView::apply`] of that log, which is exactly what
/// the polling loop does per tick.
struct RealWorld {
    parties: [Party; 2],
    log: Vec<Envelope>,
    rng: ChaCha20Rng,
    next_id: u64,
}

impl RealWorld {
    fn new(seed: u64) -> Self {
        let parties = [0, 1].map(|index| Party {
            session: session(index),
            view: ThreadView::new(AccountId(index as u64 + 1), profile(1 - index)),
        });
        Self { parties, log: Vec::new(), rng: ChaCha20Rng::seed_from_u64(seed), next_id: 0 }
    }

    fn apply(&mut self, op: &Operation) -> OperationResult {
        let party = op.party() as usize;
        match op {
            Operation::Submit { key, .. } => self.apply_submit(party, *key),
            Operation::Relock { .. } => {
                self.parties[party].view.relock();
                OperationResult::Ok
            },
            Operation::Send { content, .. } => self.apply_send(party, content),
            Operation::Refresh { .. } => {
                let log = self.log.clone();
                self.parties[party].view.apply(log);
                OperationResult::Ok
            },
        }
    }

    fn apply_submit(&mut self, party: usize, key: KeyChoice) -> OperationResult {
        let candidate = match key {
            KeyChoice::Own => ACCESS_KEYS[party].to_string(),
            KeyChoice::Peer => ACCESS_KEYS[1 - party].to_string(),
            KeyChoice::Mangled => mangled(ACCESS_KEYS[party]),
        };

        let side = &mut self.parties[party];
        match side.view.unlock(&side.session, &candidate) {
            Ok(()) => OperationResult::Ok,
            Err(GateError::WrongAccessKey) => OperationResult::Error(OperationError::WrongKey),
            Err(other) => panic!("unexpected unlock failure: {other}"),
        }
    }

    fn apply_send(&mut self, party: usize, content: &SmallText) -> OperationResult {
        if self.parties[party].view.ensure_can_send().is_err() {
            return OperationResult::Error(OperationError::Locked);
        }

        let text = content.to_text();
        let (sender_public, receiver_public) = {
            let side = &self.parties[party];
            (side.session.public_key.clone(), side.view.peer().public_key.clone())
        };
        let payload = match seal(&mut self.rng, &text, &sender_public, &receiver_public) {
            Ok(payload) => payload,
            Err(CodecError::EmptyMessage | CodecError::MessageTooLong { .. }) => {
                return OperationResult::Error(OperationError::InvalidMessage);
            },
            Err(other) => panic!("unexpected seal failure: {other}"),
        };

        self.next_id += 1;
        self.log.push(Envelope {
            id: EnvelopeId(self.next_id),
            sender: self.parties[party].session.account_id,
            receiver: self.parties[party].view.peer().id,
            payload,
            timestamp_ms: self.next_id,
        });

        // Sending refreshes the sender's own view, like the real client.
        let log = self.log.clone();
        self.parties[party].view.apply(log);
        OperationResult::Ok
    }

    fn is_unlocked(&self, party: usize) -> bool {
        self.parties[party].view.gate().state() == GateState::Unlocked
    }

    fn rendered(&self, party: usize) -> Vec<Rendered> {
        self.parties[party]
            .view
            .messages()
            .into_iter()
            .map(|(id, display)| match display {
                MessageDisplay::Decrypted { text } => Rendered::Text(text),
                MessageDisplay::Sealed { .. } => Rendered::Sealed,
                MessageDisplay::WrongKey | MessageDisplay::Corrupt => {
                    panic!("well-formed envelope {id:?} rendered undecryptable")
                },
            })
            .collect()
    }

    fn observable_state(&self) -> ObservableState {
        ObservableState {
            unlocked: [self.is_unlocked(0), self.is_unlocked(1)],
            rendered: [self.rendered(0), self.rendered(1)],
        }
    }
}

fn small_text_strategy() -> impl Strategy<Value = SmallText> {
    (any::<u8>(), any::<u8>()).prop_map(|(seed, size_class)| SmallText { seed, size_class })
}

/// Weighted towards the party's own key so sequences actually unlock.
fn key_choice_strategy() -> impl Strategy<Value = KeyChoice> {
    prop_oneof![
        3 => Just(KeyChoice::Own),
        1 => Just(KeyChoice::Peer),
        1 => Just(KeyChoice::Mangled),
    ]
}

fn operation_strategy() -> impl Strategy<Value = Operation> {
    let party = any::<PartyId>();
    prop_oneof![
        3 => (party.clone(), key_choice_strategy())
            .prop_map(|(party, key)| Operation::Submit { party, key }),
        1 => party.clone().prop_map(|party| Operation::Relock { party }),
        5 => (party.clone(), small_text_strategy())
            .prop_map(|(party, content)| Operation::Send { party, content }),
        2 => party.prop_map(|party| Operation::Refresh { party }),
    ]
}

proptest! {
    // Every case pays for RSA work on each send and unlock; a small case
    // count with longer sequences explores more than the default spread.
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// The core oracle test: results and observable state must match after
    /// every single operation.
    #[test]
    fn prop_model_matches_real(
        seed in any::<u64>(),
        ops in prop::collection::vec(operation_strategy(), 0..24)
    ) {
        let mut model = ModelWorld::new();
        let mut real = RealWorld::new(seed);

        for (i, op) in ops.iter().enumerate() {
            let model_result = model.apply(op);
            let real_result = real.apply(op);

            prop_assert_eq!(
                &model_result, &real_result,
                "result divergence at operation {}: {:?}", i, op
            );
            prop_assert_eq!(
                model.observable_state(), real.observable_state(),
                "state divergence after operation {}: {:?}", i, op
            );
        }
    }

    /// Model self-consistency after any operation sequence.
    #[test]
    fn prop_model_invariants(ops in prop::collection::vec(operation_strategy(), 0..64)) {
        let mut model = ModelWorld::new();
        for op in &ops {
            let _ = model.apply(op);
        }

        for party in 0..2u8 {
            let seen = model.seen(party);
            prop_assert!(seen <= model.thread().len(), "cursor past the log");
            let rendered = model.rendered(party);
            prop_assert_eq!(rendered.len(), seen, "rendering covers exactly what was pulled");
            for entry in &rendered {
                match entry {
                    Rendered::Text(_) => prop_assert!(model.is_unlocked(party)),
                    Rendered::Sealed => prop_assert!(!model.is_unlocked(party)),
                }
            }
        }

        for message in model.thread() {
            prop_assert!(!message.text.trim().is_empty());
            prop_assert!(message.text.len() <= MAX_MESSAGE_LEN);
        }
    }

    /// No sequence of foreign or mangled keys ever unlocks either side.
    #[test]
    fn prop_wrong_keys_never_unlock(
        seed in any::<u64>(),
        attempts in prop::collection::vec((any::<PartyId>(), any::<bool>()), 1..16)
    ) {
        let mut model = ModelWorld::new();
        let mut real = RealWorld::new(seed);

        for (party, use_peer) in attempts {
            let key = if use_peer { KeyChoice::Peer } else { KeyChoice::Mangled };
            let op = Operation::Submit { party, key };
            prop_assert_eq!(model.apply(&op), OperationResult::Error(OperationError::WrongKey));
            prop_assert_eq!(real.apply(&op), OperationResult::Error(OperationError::WrongKey));
        }

        prop_assert_eq!(real.observable_state().unlocked, [false, false]);
    }

    /// Sending is refused while locked, and accepted once unlocked exactly
    /// when the content passes validation.
    #[test]
    fn prop_send_needs_an_unlocked_view(
        seed in any::<u64>(),
        party in any::<PartyId>(),
        content in small_text_strategy()
    ) {
        let mut real = RealWorld::new(seed);

        let locked = real.apply(&Operation::Send { party, content: content.clone() });
        prop_assert_eq!(locked, OperationResult::Error(OperationError::Locked));

        real.apply(&Operation::Submit { party, key: KeyChoice::Own });
        let unlocked = real.apply(&Operation::Send { party, content: content.clone() });

        let text = content.to_text();
        let valid = !text.trim().is_empty() && text.len() <= MAX_MESSAGE_LEN;
        prop_assert_eq!(unlocked.is_ok(), valid);
    }
}

#[cfg(test)]
mod smoke_tests {
    use super::*;

    /// Deterministic walk through the interesting transitions, checked
    /// against the model at every step.
    #[test]
    fn model_and_real_agree_on_a_scripted_conversation() {
        let script = [
            Operation::Send { party: 0, content: SmallText { seed: 1, size_class: 2 } },
            Operation::Submit { party: 0, key: KeyChoice::Mangled },
            Operation::Submit { party: 0, key: KeyChoice::Own },
            Operation::Send { party: 0, content: SmallText { seed: 1, size_class: 2 } },
            Operation::Send { party: 0, content: SmallText { seed: 2, size_class: 0 } },
            Operation::Refresh { party: 1 },
            Operation::Submit { party: 1, key: KeyChoice::Peer },
            Operation::Submit { party: 1, key: KeyChoice::Own },
            Operation::Send { party: 1, content: SmallText { seed: 3, size_class: 3 } },
            Operation::Relock { party: 0 },
            Operation::Refresh { party: 0 },
        ];

        let mut model = ModelWorld::new();
        let mut real = RealWorld::new(99);

        for op in &script {
            assert_eq!(model.apply(op), real.apply(op), "result for {op:?}");
            assert_eq!(model.observable_state(), real.observable_state(), "state after {op:?}");
        }

        assert_eq!(model.thread().len(), 2);
        assert!(!model.is_unlocked(0));
        assert!(model.is_unlocked(1));
    }
}
