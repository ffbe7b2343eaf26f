//! Unordered pair of user ids
//!
//! A relationship is unique per unordered `{a, b}` pair. `PairKey` is the
//! canonical form of that pair and is used for lookups and per-pair locking.

use std::fmt;

use super::Snowflake;

/// Canonical key for an unordered user pair (`low <= high`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PairKey {
    low: Snowflake,
    high: Snowflake,
}

impl PairKey {
    /// Build the key for two users regardless of argument order
    pub fn new(a: Snowflake, b: Snowflake) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    #[inline]
    pub fn low(&self) -> Snowflake {
        self.low
    }

    #[inline]
    pub fn high(&self) -> Snowflake {
        self.high
    }

    /// Check if the user is one of the two members
    pub fn contains(&self, user_id: Snowflake) -> bool {
        self.low == user_id || self.high == user_id
    }

    /// Both members are the same user
    pub fn is_degenerate(&self) -> bool {
        self.low == self.high
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.low, self.high)
    }
}
