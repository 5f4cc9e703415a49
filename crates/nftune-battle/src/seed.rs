//! Random seed strings and seed derivation.
//!
//! A battle's seed is the hex string returned by the randomness source
//! (`0x` followed by hex digits). Every digit after the prefix is one reveal
//! attempt. Seeds are stored lower-cased.
//!
//! Derived values use BLAKE3 so that independent consumers of the same seed
//! (queue order, reveal index selection) get independent streams:
//!
//! ```text
//! derived = truncate_u64(BLAKE3(seed_string || key || index_le))
//! ```

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::BattleError;

/// Fixed prefix in front of the hex digits.
pub const SEED_PREFIX: &str = "0x";

/// Number of hex digits in a full 32-byte seed.
pub const FULL_SEED_DIGITS: usize = 64;

const SEED_PATTERN: &str = r"^0[xX][0-9a-fA-F]+$";

static SEED_REGEX: OnceLock<Regex> = OnceLock::new();

fn seed_regex() -> &'static Regex {
    SEED_REGEX.get_or_init(|| Regex::new(SEED_PATTERN).expect("invalid regex pattern"))
}

/// A validated, lower-cased `0x` hex seed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RandomSeed(String);

impl RandomSeed {
    /// Parses and validates a seed string.
    ///
    /// # Example
    /// ```
    /// use nftune_battle::RandomSeed;
    ///
    /// let seed = RandomSeed::parse("0xA3f9").unwrap();
    /// assert_eq!(seed.as_str(), "0xa3f9");
    /// assert_eq!(seed.usable_len(), 4);
    /// assert!(RandomSeed::parse("a3f9").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self, BattleError> {
        let trimmed = input.trim();
        if !seed_regex().is_match(trimmed) {
            let reason = if trimmed.len() <= SEED_PREFIX.len() {
                "expected at least one hex digit after 0x"
            } else if !trimmed
                .get(..SEED_PREFIX.len())
                .is_some_and(|p| p.eq_ignore_ascii_case(SEED_PREFIX))
            {
                "missing 0x prefix"
            } else {
                "contains non-hex characters"
            };
            return Err(BattleError::InvalidSeed {
                seed: input.to_string(),
                reason: reason.to_string(),
            });
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    /// Builds a seed from raw bytes (e.g. a bytes32 oracle answer).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BattleError> {
        let mut s = String::with_capacity(SEED_PREFIX.len() + bytes.len() * 2);
        s.push_str(SEED_PREFIX);
        for b in bytes {
            s.push_str(&format!("{:02x}", b));
        }
        Self::parse(&s)
    }

    /// The full seed string including the prefix.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The hex digits after the prefix.
    pub fn digits(&self) -> &str {
        &self.0[SEED_PREFIX.len()..]
    }

    /// Number of reveal attempts this seed supports.
    pub fn usable_len(&self) -> usize {
        self.digits().len()
    }

    /// Numeric value (0..=15) of the digit at `index`, if any.
    pub fn digit_at(&self, index: usize) -> Option<u8> {
        self.digits()
            .as_bytes()
            .get(index)
            .and_then(|b| (*b as char).to_digit(16))
            .map(|d| d as u8)
    }

    /// True when every digit is zero (the oracle's "no seed yet" answer).
    pub fn is_zero(&self) -> bool {
        self.digits().bytes().all(|b| b == b'0')
    }

    /// Value of the first (up to) eight hex digits.
    ///
    /// Shorter seeds use all their digits.
    pub fn leading_u32(&self) -> u32 {
        let digits = self.digits();
        let head = &digits[..digits.len().min(8)];
        u32::from_str_radix(head, 16).unwrap_or(0)
    }

    /// Derives an independent 64-bit value for `key` and `index`.
    pub fn derive_u64(&self, key: &str, index: u64) -> u64 {
        let mut input = Vec::with_capacity(self.0.len() + key.len() + 8);
        input.extend_from_slice(self.0.as_bytes());
        input.extend_from_slice(key.as_bytes());
        input.extend_from_slice(&index.to_le_bytes());

        let hash = blake3::hash(&input);

        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&hash.as_bytes()[0..8]);
        u64::from_le_bytes(bytes)
    }
}

impl std::fmt::Display for RandomSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for RandomSeed {
    type Err = BattleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RandomSeed {
    type Error = BattleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RandomSeed> for String {
    fn from(seed: RandomSeed) -> Self {
        seed.0
    }
}
