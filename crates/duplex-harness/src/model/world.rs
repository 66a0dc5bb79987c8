//! Reference model of a two-party conversation.
//!
//! The model captures what the gate and thread must do, with none of the
//! real cryptography: a global message log, a per-party high-water mark of
//! what they have pulled, and a per-party unlocked flag. It is the oracle
//! the real implementation is compared against.

use duplex_core::MAX_MESSAGE_LEN;

use super::operation::{KeyChoice, Operation, OperationError, OperationResult, PartyId};

/// One message in the model's log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelMessage {
    /// Which party sent it.
    pub sender: PartyId,
    /// The plaintext.
    pub text: String,
}

/// What one party's view renders for one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    /// Locked view: an opaque placeholder.
    Sealed,
    /// Unlocked view: the plaintext.
    Text(String),
}

/// Observable state for oracle comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservableState {
    /// Per-party unlocked flag.
    pub unlocked: [bool; 2],
    /// Per-party rendering of their view.
    pub rendered: [Vec<Rendered>; 2],
}

/// The reference implementation.
///
/// Deliberately simple enough to be obviously correct: sends append to one
/// log, refreshes move a cursor, unlocking flips a flag, and rendering is a
/// pure function of those three.
#[derive(Debug, Clone, Default)]
pub struct ModelWorld {
    thread: Vec<ModelMessage>,
    unlocked: [bool; 2],
    seen: [usize; 2],
}

impl ModelWorld {
    /// Fresh world: empty thread, both parties locked.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an operation and return the result the real implementation
    /// must match.
    pub fn apply(&mut self, op: &Operation) -> OperationResult {
        let party = op.party() as usize;
        match op {
            Operation::Submit { key, .. } => match key {
                // Unlocking decrypts what the party has already pulled; it
                // does not itself pull.
                KeyChoice::Own => {
                    self.unlocked[party] = true;
                    OperationResult::Ok
                },
                KeyChoice::Peer | KeyChoice::Mangled => {
                    OperationResult::Error(OperationError::WrongKey)
                },
            },
            Operation::Relock { .. } => {
                self.unlocked[party] = false;
                OperationResult::Ok
            },
            Operation::Send { content, .. } => {
                if !self.unlocked[party] {
                    return OperationResult::Error(OperationError::Locked);
                }
                let text = content.to_text();
                if text.trim().is_empty() || text.len() > MAX_MESSAGE_LEN {
                    return OperationResult::Error(OperationError::InvalidMessage);
                }
                self.thread.push(ModelMessage { sender: party as PartyId, text });
                // Sending refreshes the sender's own view.
                self.seen[party] = self.thread.len();
                OperationResult::Ok
            },
            Operation::Refresh { .. } => {
                self.seen[party] = self.thread.len();
                OperationResult::Ok
            },
        }
    }

    /// Whole-thread log, in send order.
    pub fn thread(&self) -> &[ModelMessage] {
        &self.thread
    }

    /// Whether `party` is unlocked.
    pub fn is_unlocked(&self, party: PartyId) -> bool {
        self.unlocked[(party % 2) as usize]
    }

    /// How much of the thread `party` has pulled.
    pub fn seen(&self, party: PartyId) -> usize {
        self.seen[(party % 2) as usize]
    }

    /// What `party`'s view renders right now.
    pub fn rendered(&self, party: PartyId) -> Vec<Rendered> {
        let party = (party % 2) as usize;
        self.thread[..self.seen[party]]
            .iter()
            .map(|message| {
                if self.unlocked[party] {
                    Rendered::Text(message.text.clone())
                } else {
                    Rendered::Sealed
                }
            })
            .collect()
    }

    /// Extract observable state for comparison.
    pub fn observable_state(&self) -> ObservableState {
        ObservableState {
            unlocked: self.unlocked,
            rendered: [self.rendered(0), self.rendered(1)],
        }
    }
}
