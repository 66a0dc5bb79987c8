//! Short human-copyable access keys.
//!
//! An access key is 16 characters drawn uniformly from `A-Z0-9`, handed to
//! the account holder once at registration and presented again to unlock a
//! conversation. Input is forgiving: case, whitespace, and hyphen grouping
//! are all stripped before comparison, so `abcd-1234 wxyz 7890` and
//! `ABCD1234WXYZ7890` name the same key.

use std::{fmt, str::FromStr};

use rand::Rng;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;

const ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Characters in a normalized access key.
pub const KEY_LEN: usize = 16;

const GROUP_LEN: usize = 4;

/// A 16-character access key, stored in normalized form.
///
/// `Display` renders the grouped form (`XXXX-XXXX-XXXX-XXXX`) for the one
/// moment the holder needs to copy it; `Debug` is redacted.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(into = "String", try_from = "String")]
pub struct AccessKey(String);

impl AccessKey {
    /// Issue a fresh key: 16 uniform draws from the 36-character alphabet.
    ///
    /// `gen_range` samples without modulo bias.
    pub fn issue<R>(rng: &mut R) -> Self
    where
        R: rand::RngCore + rand::CryptoRng,
    {
        let chars = (0..KEY_LEN)
            .map(|_| {
                let idx = rng.gen_range(0..ALPHABET.len());
                char::from(ALPHABET[idx])
            })
            .collect();
        Self(chars)
    }

    /// Strip all whitespace and hyphens, uppercase ASCII.
    ///
    /// Idempotent: normalizing a normalized string is a no-op.
    pub fn normalize(input: &str) -> String {
        input
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .map(|c| c.to_ascii_uppercase())
            .collect()
    }

    /// Whether `candidate` names this key.
    ///
    /// Normalized equality, compared in constant time. There is no partial
    /// or prefix acceptance.
    pub fn verify(&self, candidate: &str) -> bool {
        constant_time_eq(Self::normalize(candidate).as_bytes(), self.0.as_bytes())
    }
}

/// Byte equality without early exit on mismatch.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b) {
        diff |= x ^ y;
    }
    diff == 0
}

impl fmt::Display for AccessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, chunk) in self.0.as_bytes().chunks(GROUP_LEN).enumerate() {
            if i > 0 {
                f.write_str("-")?;
            }
            f.write_str(std::str::from_utf8(chunk).map_err(|_| fmt::Error)?)?;
        }
        Ok(())
    }
}

impl fmt::Debug for AccessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessKey(<redacted>)")
    }
}

impl FromStr for AccessKey {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = Self::normalize(s);
        if normalized.len() != KEY_LEN {
            return Err(CryptoError::MalformedAccessKey {
                reason: format!("expected {KEY_LEN} characters, got {}", normalized.len()),
            });
        }
        if let Some(bad) =
            normalized.chars().find(|c| !c.is_ascii_uppercase() && !c.is_ascii_digit())
        {
            return Err(CryptoError::MalformedAccessKey {
                reason: format!("invalid character {bad:?}"),
            });
        }
        Ok(Self(normalized))
    }
}

impl From<AccessKey> for String {
    fn from(key: AccessKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for AccessKey {
    type Error = CryptoError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
