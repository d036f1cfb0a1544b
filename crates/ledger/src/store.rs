//! Ledger storage trait.

use async_trait::async_trait;
use common::{Money, OperationToken, UserId};

use crate::entry::LedgerEntry;
use crate::error::Result;

/// Storage backend for ledger entries.
///
/// The `(user_id, token)` pair is the only shared mutable state, so both
/// mutating operations are conditional writes: `insert_pending` is guarded
/// by the pair's uniqueness, and `commit_entry` only touches a row that is
/// still pending. Concurrent retries of the same logical operation collapse
/// to one effect instead of racing.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Inserts a pending entry with delta zero.
    ///
    /// Returns false when an entry for `(user_id, token)` already exists;
    /// the existing entry is left untouched.
    async fn insert_pending(&self, user_id: UserId, token: OperationToken) -> Result<bool>;

    /// Promotes the pending entry for `(user_id, token)` to committed,
    /// setting its delta.
    ///
    /// Returns false when no pending entry matched (never reserved, or
    /// already committed); in that case nothing is written.
    async fn commit_entry(
        &self,
        user_id: UserId,
        token: OperationToken,
        delta: Money,
    ) -> Result<bool>;

    /// Sum of deltas over committed entries for the user; zero when the
    /// user has no entries. Pending entries never contribute.
    async fn balance(&self, user_id: UserId) -> Result<Money>;

    /// All entries for a user, pending and committed.
    async fn entries_for_user(&self, user_id: UserId) -> Result<Vec<LedgerEntry>>;
}
