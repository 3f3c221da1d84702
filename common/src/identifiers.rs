//! Identifier types for ledger entities.
//!
//! Both identifiers wrap the BIGSERIAL surrogate keys generated by the
//! database; they are never minted in-process.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(i64);

impl AccountId {
    /// Wrap a raw database key.
    pub fn from_raw(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw key for binding into queries.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for AccountId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Unique identifier for a committed transfer in the transactions ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransactionId(i64);

impl TransactionId {
    /// Wrap a raw database key.
    pub fn from_raw(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw key for binding into queries.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for TransactionId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}
