//! Ledger service with the two-phase reserve/commit protocol.

use common::{Money, OperationToken, UserId};

use crate::error::{LedgerError, Result};
use crate::store::LedgerStore;

/// Outcome of reserving a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReserveOutcome {
    /// A fresh pending entry was created.
    Reserved,

    /// An entry for this token already existed; nothing was written.
    AlreadyExists,
}

/// Outcome of committing a deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The pending entry was promoted to committed.
    Applied,

    /// No pending entry matched the token; nothing was written.
    NoMatchingReservation,
}

/// Outcome of committing a withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawOutcome {
    /// The pending entry was promoted to committed with a negative delta.
    Applied,

    /// The user's balance does not cover the amount; nothing was written.
    InsufficientFunds,

    /// No pending entry matched the token; nothing was written.
    NoMatchingReservation,
}

/// Balance ledger over a storage backend.
///
/// Callers must reserve a token before committing: the reservation doubles
/// as validation that this specific operation has not already run, so any
/// number of repeated commits with one token converge to exactly one effect.
pub struct Ledger<S: LedgerStore> {
    store: S,
}

impl<S: LedgerStore> Ledger<S> {
    /// Creates a new ledger over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Reserves an idempotency token as a pending entry with delta zero.
    ///
    /// Reserving the same token twice is accepted as a no-op in effect.
    #[tracing::instrument(skip(self))]
    pub async fn reserve_token(
        &self,
        user_id: UserId,
        token: OperationToken,
    ) -> Result<ReserveOutcome> {
        if self.store.insert_pending(user_id, token).await? {
            metrics::counter!("ledger_tokens_reserved").increment(1);
            Ok(ReserveOutcome::Reserved)
        } else {
            tracing::debug!(%user_id, %token, "token already reserved");
            Ok(ReserveOutcome::AlreadyExists)
        }
    }

    /// Commits the pending entry for `(user_id, token)` with the given delta.
    ///
    /// Replaying an apply after it already succeeded finds no pending row
    /// and reports `NoMatchingReservation` without a second effect.
    #[tracing::instrument(skip(self))]
    pub async fn apply(
        &self,
        user_id: UserId,
        token: OperationToken,
        delta: Money,
    ) -> Result<ApplyOutcome> {
        if self.store.commit_entry(user_id, token, delta).await? {
            metrics::counter!("ledger_entries_committed").increment(1);
            tracing::info!(%user_id, %token, delta = delta.cents(), "ledger entry committed");
            Ok(ApplyOutcome::Applied)
        } else {
            tracing::warn!(%user_id, %token, "no matching reservation for apply");
            Ok(ApplyOutcome::NoMatchingReservation)
        }
    }

    /// Withdraws `amount` from the user's balance under the same commit
    /// semantics as [`apply`](Self::apply).
    ///
    /// The balance check precedes the commit; a withdrawal without a prior
    /// reservation reports `NoMatchingReservation`.
    #[tracing::instrument(skip(self))]
    pub async fn withdraw(
        &self,
        user_id: UserId,
        token: OperationToken,
        amount: Money,
    ) -> Result<WithdrawOutcome> {
        if !amount.is_positive() {
            return Err(LedgerError::InvalidAmount {
                cents: amount.cents(),
            });
        }

        let balance = self.store.balance(user_id).await?;
        if amount > balance {
            metrics::counter!("ledger_withdrawals_rejected").increment(1);
            tracing::warn!(
                %user_id,
                amount = amount.cents(),
                balance = balance.cents(),
                "withdrawal rejected: insufficient funds"
            );
            return Ok(WithdrawOutcome::InsufficientFunds);
        }

        if self
            .store
            .commit_entry(user_id, token, amount.negated())
            .await?
        {
            metrics::counter!("ledger_entries_committed").increment(1);
            tracing::info!(%user_id, %token, amount = amount.cents(), "withdrawal committed");
            Ok(WithdrawOutcome::Applied)
        } else {
            tracing::warn!(%user_id, %token, "no matching reservation for withdrawal");
            Ok(WithdrawOutcome::NoMatchingReservation)
        }
    }

    /// Returns the user's balance: the sum of committed deltas only.
    #[tracing::instrument(skip(self))]
    pub async fn balance(&self, user_id: UserId) -> Result<Money> {
        self.store.balance(user_id).await
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }
}
