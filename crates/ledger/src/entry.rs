//! Ledger entry model.

use chrono::{DateTime, Utc};
use common::{Money, OperationToken, UserId};
use serde::{Deserialize, Serialize};

/// Status of a ledger entry.
///
/// A Pending entry is a write-once reservation slot: it holds a token but
/// contributes nothing to the balance. Exactly one commit promotes it to
/// Committed, after which it is immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum EntryStatus {
    /// Token reserved, delta not yet applied.
    #[default]
    Pending,

    /// Delta applied; the entry counts toward the balance.
    Committed,
}

impl EntryStatus {
    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Pending => "pending",
            EntryStatus::Committed => "committed",
        }
    }
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EntryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(EntryStatus::Pending),
            "committed" => Ok(EntryStatus::Committed),
            other => Err(format!("unknown entry status: {other}")),
        }
    }
}

/// One monetary effect on a user's balance, keyed by `(user_id, token)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Owner of the balance this entry affects.
    pub user_id: UserId,

    /// Idempotency token identifying the logical operation.
    pub token: OperationToken,

    /// Signed amount; zero while the entry is pending.
    pub delta: Money,

    /// Pending or committed.
    pub status: EntryStatus,

    /// When the token was reserved.
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Creates a fresh pending entry with delta zero.
    pub fn pending(user_id: UserId, token: OperationToken) -> Self {
        Self {
            user_id,
            token,
            delta: Money::zero(),
            status: EntryStatus::Pending,
            created_at: Utc::now(),
        }
    }
}
