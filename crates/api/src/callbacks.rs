//! In-process outcome callback delivery.
//!
//! When all three components live in one process, outcome callbacks flow
//! through unbounded channels into a dispatcher task that feeds the
//! orchestrator. The channel is the asynchronous out-of-band path the saga
//! relies on: a component's synchronous acknowledgment and its callback
//! arrive independently, in no guaranteed order.

use std::sync::Arc;

use async_trait::async_trait;
use ledger::PaymentOutcome;
use reservation::{CallbackError, OutcomeSender, ReservationOutcome};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::AppOrchestrator;

/// Error delivering a payment outcome callback.
#[derive(Debug, Error)]
#[error("payment callback delivery failed: {0}")]
pub struct PaymentCallbackError(pub String);

/// Delivery seam for payment outcome callbacks.
#[async_trait]
pub trait PaymentSender: Send + Sync {
    /// Delivers the outcome to the orchestrator's callback target.
    async fn send(&self, outcome: PaymentOutcome) -> Result<(), PaymentCallbackError>;
}

#[async_trait]
impl<T: PaymentSender + ?Sized> PaymentSender for Arc<T> {
    async fn send(&self, outcome: PaymentOutcome) -> Result<(), PaymentCallbackError> {
        (**self).send(outcome).await
    }
}

/// Reservation outcome sender backed by an in-process channel.
pub struct ChannelOutcomeSender {
    tx: mpsc::UnboundedSender<ReservationOutcome>,
}

impl ChannelOutcomeSender {
    /// Creates a sender over the given channel.
    pub fn new(tx: mpsc::UnboundedSender<ReservationOutcome>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl OutcomeSender for ChannelOutcomeSender {
    async fn send(&self, outcome: ReservationOutcome) -> Result<(), CallbackError> {
        self.tx
            .send(outcome)
            .map_err(|e| CallbackError(e.to_string()))
    }
}

/// Payment outcome sender backed by an in-process channel.
pub struct ChannelPaymentSender {
    tx: mpsc::UnboundedSender<PaymentOutcome>,
}

impl ChannelPaymentSender {
    /// Creates a sender over the given channel.
    pub fn new(tx: mpsc::UnboundedSender<PaymentOutcome>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl PaymentSender for ChannelPaymentSender {
    async fn send(&self, outcome: PaymentOutcome) -> Result<(), PaymentCallbackError> {
        self.tx
            .send(outcome)
            .map_err(|e| PaymentCallbackError(e.to_string()))
    }
}

/// Spawns the task that drains both callback channels into the
/// orchestrator. Handler errors are logged; a failed callback is not
/// retried.
pub fn spawn_dispatcher(
    orchestrator: Arc<AppOrchestrator>,
    mut reservation_rx: mpsc::UnboundedReceiver<ReservationOutcome>,
    mut payment_rx: mpsc::UnboundedReceiver<PaymentOutcome>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                outcome = reservation_rx.recv() => match outcome {
                    Some(outcome) => {
                        if let Err(e) = orchestrator.reservation_outcome(outcome).await {
                            tracing::error!(error = %e, "failed to handle reservation outcome");
                        }
                    }
                    None => break,
                },
                outcome = payment_rx.recv() => match outcome {
                    Some(outcome) => {
                        if let Err(e) = orchestrator.payment_outcome(outcome).await {
                            tracing::error!(error = %e, "failed to handle payment outcome");
                        }
                    }
                    None => break,
                },
            }
        }
        tracing::debug!("callback dispatcher stopped");
    })
}
