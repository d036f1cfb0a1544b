//! In-process peer adapters.
//!
//! The default deployment hosts all three components in one process; the
//! orchestrator's client seams call them directly, and the asynchronous
//! callback half still travels through the channel dispatcher.

use std::sync::Arc;

use async_trait::async_trait;
use booking::{ClientError, LedgerClient, Notifier, ReservationClient};
use common::{BookingId, EventId, Money, OperationToken, UserId};
use ledger::{PaymentOutcome, WithdrawOutcome};

use crate::callbacks::PaymentSender;
use crate::{AppLedger, AppPool};

/// Reservation client backed by the pool hosted in this process.
pub struct LocalReservationClient {
    pool: Arc<AppPool>,
}

impl LocalReservationClient {
    /// Creates a client over the given pool.
    pub fn new(pool: Arc<AppPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReservationClient for LocalReservationClient {
    async fn occupy(
        &self,
        event_id: EventId,
        booking_id: BookingId,
        user_id: UserId,
    ) -> Result<(), ClientError> {
        // The sync return only acknowledges the attempt; the outcome
        // reaches the orchestrator through the callback channel.
        self.pool
            .occupy(event_id, booking_id, user_id)
            .await
            .map(|_| ())
            .map_err(|e| ClientError(e.to_string()))
    }

    async fn cancel(
        &self,
        event_id: EventId,
        booking_id: BookingId,
        _user_id: UserId,
    ) -> Result<(), ClientError> {
        self.pool
            .cancel(event_id, booking_id)
            .await
            .map_err(|e| ClientError(e.to_string()))
    }
}

/// Ledger client backed by the ledger hosted in this process.
///
/// Mirrors the ledger's HTTP surface: the withdrawal outcome is delivered
/// through the payment callback, while the sync return only acknowledges
/// the request.
pub struct LocalLedgerClient {
    ledger: Arc<AppLedger>,
    payments: Arc<dyn PaymentSender>,
}

impl LocalLedgerClient {
    /// Creates a client over the given ledger and callback sender.
    pub fn new(ledger: Arc<AppLedger>, payments: Arc<dyn PaymentSender>) -> Self {
        Self { ledger, payments }
    }
}

#[async_trait]
impl LedgerClient for LocalLedgerClient {
    async fn reserve_token(
        &self,
        user_id: UserId,
        token: OperationToken,
    ) -> Result<(), ClientError> {
        self.ledger
            .reserve_token(user_id, token)
            .await
            .map(|_| ())
            .map_err(|e| ClientError(e.to_string()))
    }

    async fn withdraw(
        &self,
        user_id: UserId,
        token: OperationToken,
        amount: Money,
        booking_id: BookingId,
    ) -> Result<(), ClientError> {
        let outcome = self
            .ledger
            .withdraw(user_id, token, amount)
            .await
            .map_err(|e| ClientError(e.to_string()))?;

        let callback = match outcome {
            WithdrawOutcome::Applied => PaymentOutcome::succeeded(booking_id, user_id, amount),
            WithdrawOutcome::InsufficientFunds | WithdrawOutcome::NoMatchingReservation => {
                PaymentOutcome::failed(booking_id, user_id, amount)
            }
        };
        if let Err(e) = self.payments.send(callback).await {
            tracing::error!(error = %e, "failed to deliver payment outcome callback");
        }
        Ok(())
    }
}

/// Notifier that logs instead of calling the external collaborator.
pub struct LoggingNotifier;

#[async_trait]
impl Notifier for LoggingNotifier {
    async fn notify(&self, user_id: UserId, message: &str) -> Result<(), ClientError> {
        tracing::info!(%user_id, message, "user notification");
        Ok(())
    }
}
