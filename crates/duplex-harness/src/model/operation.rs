//! Operations for model-based testing.
//!
//! Operations are all the actions a party can take against a conversation.
//! They are generated randomly (by proptest in tests, by the fuzzer in
//! `fuzz/`) and applied to both the model and the real implementation.

use arbitrary::Arbitrary;

/// Party identifier: 0 or 1, the two sides of the conversation.
pub type PartyId = u8;

/// Which access key a submit attempt presents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub enum KeyChoice {
    /// The party's own key: the only choice that unlocks.
    Own,
    /// The other party's key.
    Peer,
    /// The party's own key with one character changed.
    Mangled,
}

/// Operations that can be applied to the conversation.
///
/// Kept small and composable so random exploration finds interesting
/// interleavings of unlocking, sending, and refreshing.
#[derive(Debug, Clone, Arbitrary)]
pub enum Operation {
    /// Party submits an access key to unlock their view.
    Submit {
        /// Party performing the operation.
        party: PartyId,
        /// Key presented.
        key: KeyChoice,
    },

    /// Party relocks their view.
    Relock {
        /// Party performing the operation.
        party: PartyId,
    },

    /// Party sends a message.
    ///
    /// Fails while the party's view is locked, or when the expanded text is
    /// rejected by validation.
    Send {
        /// Sending party.
        party: PartyId,
        /// Message content.
        content: SmallText,
    },

    /// Party pulls the thread, seeing everything sent so far.
    Refresh {
        /// Party performing the operation.
        party: PartyId,
    },
}

impl Operation {
    /// The party this operation acts as, folded into range.
    pub fn party(&self) -> PartyId {
        match self {
            Self::Submit { party, .. }
            | Self::Relock { party }
            | Self::Send { party, .. }
            | Self::Refresh { party } => party % 2,
        }
    }
}

/// Compact message content.
///
/// Expanded deterministically so test cases stay small while still hitting
/// the validation boundaries (empty, whitespace-only, at the byte budget,
/// one past it).
#[derive(Debug, Clone, PartialEq, Eq, Arbitrary)]
pub struct SmallText {
    /// Content seed.
    pub seed: u8,
    /// Length class: empty / blank / short / medium / at-limit / over-limit.
    pub size_class: u8,
}

impl SmallText {
    /// Expand to the message text.
    pub fn to_text(&self) -> String {
        let len = match self.size_class % 6 {
            0 => return String::new(),
            1 => return "   ".to_string(),
            2 => 8,
            3 => 64,
            4 => 190,
            _ => 191,
        };

        // Deterministic lowercase content, one byte per char.
        (0..len).map(|i| char::from(b'a' + (self.seed.wrapping_add(i as u8) % 26))).collect()
    }
}

/// Result of applying an operation, compared across model and real.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationResult {
    /// Operation succeeded.
    Ok,

    /// Operation failed with an expected error.
    Error(OperationError),
}

/// Expected failure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationError {
    /// Submitted key does not unlock this party's view.
    WrongKey,

    /// Sending requires an unlocked view.
    Locked,

    /// Message rejected by validation (empty, blank, or over the budget).
    InvalidMessage,
}

impl OperationResult {
    /// Whether the operation succeeded.
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Whether the operation failed.
    pub fn is_err(&self) -> bool {
        !self.is_ok()
    }
}
