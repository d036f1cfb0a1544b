//! In-memory ledger store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{Money, OperationToken, UserId};
use tokio::sync::RwLock;

use crate::entry::{EntryStatus, LedgerEntry};
use crate::error::Result;
use crate::store::LedgerStore;

/// In-memory ledger store for testing and single-process deployments.
///
/// Both conditional writes run under one write lock, which provides the
/// same atomicity the PostgreSQL implementation gets from its guarded
/// statements.
#[derive(Clone, Default)]
pub struct InMemoryLedgerStore {
    entries: Arc<RwLock<HashMap<(UserId, OperationToken), LedgerEntry>>>,
}

impl InMemoryLedgerStore {
    /// Creates a new empty in-memory ledger store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of entries stored.
    pub async fn entry_count(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Clears all entries.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn insert_pending(&self, user_id: UserId, token: OperationToken) -> Result<bool> {
        let mut entries = self.entries.write().await;
        if entries.contains_key(&(user_id, token)) {
            return Ok(false);
        }
        entries.insert((user_id, token), LedgerEntry::pending(user_id, token));
        Ok(true)
    }

    async fn commit_entry(
        &self,
        user_id: UserId,
        token: OperationToken,
        delta: Money,
    ) -> Result<bool> {
        let mut entries = self.entries.write().await;
        match entries.get_mut(&(user_id, token)) {
            Some(entry) if entry.status == EntryStatus::Pending => {
                entry.delta = delta;
                entry.status = EntryStatus::Committed;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn balance(&self, user_id: UserId) -> Result<Money> {
        let entries = self.entries.read().await;
        let sum = entries
            .values()
            .filter(|e| e.user_id == user_id && e.status == EntryStatus::Committed)
            .fold(Money::zero(), |acc, e| acc + e.delta);
        Ok(sum)
    }

    async fn entries_for_user(&self, user_id: UserId) -> Result<Vec<LedgerEntry>> {
        let entries = self.entries.read().await;
        let mut user_entries: Vec<_> = entries
            .values()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        user_entries.sort_by_key(|e| e.created_at);
        Ok(user_entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_pending_is_unique_per_token() {
        let store = InMemoryLedgerStore::new();
        let user = UserId::new();
        let token = OperationToken::new();

        assert!(store.insert_pending(user, token).await.unwrap());
        assert!(!store.insert_pending(user, token).await.unwrap());
        assert_eq!(store.entry_count().await, 1);
    }

    #[tokio::test]
    async fn test_same_token_distinct_users() {
        let store = InMemoryLedgerStore::new();
        let token = OperationToken::new();

        assert!(store.insert_pending(UserId::new(), token).await.unwrap());
        assert!(store.insert_pending(UserId::new(), token).await.unwrap());
        assert_eq!(store.entry_count().await, 2);
    }

    #[tokio::test]
    async fn test_commit_requires_pending_row() {
        let store = InMemoryLedgerStore::new();
        let user = UserId::new();
        let token = OperationToken::new();

        // Never reserved
        assert!(
            !store
                .commit_entry(user, token, Money::from_cents(50))
                .await
                .unwrap()
        );

        store.insert_pending(user, token).await.unwrap();
        assert!(
            store
                .commit_entry(user, token, Money::from_cents(50))
                .await
                .unwrap()
        );

        // Already committed
        assert!(
            !store
                .commit_entry(user, token, Money::from_cents(50))
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_balance_ignores_pending() {
        let store = InMemoryLedgerStore::new();
        let user = UserId::new();
        let t1 = OperationToken::new();
        let t2 = OperationToken::new();

        store.insert_pending(user, t1).await.unwrap();
        store.insert_pending(user, t2).await.unwrap();
        assert_eq!(store.balance(user).await.unwrap(), Money::zero());

        store
            .commit_entry(user, t1, Money::from_cents(50))
            .await
            .unwrap();
        assert_eq!(store.balance(user).await.unwrap(), Money::from_cents(50));
    }

    #[tokio::test]
    async fn test_balance_unknown_user_is_zero() {
        let store = InMemoryLedgerStore::new();
        assert_eq!(store.balance(UserId::new()).await.unwrap(), Money::zero());
    }

    #[tokio::test]
    async fn test_entries_for_user_shows_both_statuses() {
        let store = InMemoryLedgerStore::new();
        let user = UserId::new();
        let committed = OperationToken::new();
        let pending = OperationToken::new();

        store.insert_pending(user, committed).await.unwrap();
        store
            .commit_entry(user, committed, Money::from_cents(75))
            .await
            .unwrap();
        store.insert_pending(user, pending).await.unwrap();
        store.insert_pending(UserId::new(), OperationToken::new()).await.unwrap();

        let entries = store.entries_for_user(user).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().any(|e| e.status == EntryStatus::Committed
            && e.delta == Money::from_cents(75)));
        assert!(entries.iter().any(|e| e.status == EntryStatus::Pending && e.delta.is_zero()));
    }
}
