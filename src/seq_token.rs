//! Command sequence tokens.
//!
//! The server numbers every mutating command it appends to its command log.
//! Sending that number back as `commandSequenceNumber` makes the server wait
//! until the command has been applied before running the new statement.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-issued position in the command log. Zero means "no prerequisite".
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SequenceToken(i64);

impl SequenceToken {
    /// No prerequisite command
    pub const ZERO: SequenceToken = SequenceToken(0);

    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Raw i64 representation
    pub fn as_i64(&self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 <= 0
    }

    /// Move this token forward to `other` if it is later. Never moves backwards.
    pub fn advance(&mut self, other: SequenceToken) {
        if other > *self {
            self.0 = other.0;
        }
    }

    /// Latest token of a chain, or [`SequenceToken::ZERO`] for an empty chain.
    pub fn latest<I>(chain: I) -> Self
    where
        I: IntoIterator<Item = SequenceToken>,
    {
        chain.into_iter().fold(Self::ZERO, |mut acc, token| {
            acc.advance(token);
            acc
        })
    }
}

impl fmt::Display for SequenceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for SequenceToken {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl From<SequenceToken> for i64 {
    fn from(token: SequenceToken) -> Self {
        token.0
    }
}
