//! Reservation outcome callback payload and delivery seam.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{BookingId, Money, UserId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Asynchronous notification of an occupy attempt's outcome.
///
/// The synchronous occupy acknowledgment only signals transport success;
/// this payload is what the saga orchestrator acts on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationOutcome {
    /// The booking the slot was requested for.
    pub booking_id: BookingId,

    /// The user who owns the booking.
    pub user_id: UserId,

    /// The event's resolved slot price; zero when the event could not be
    /// resolved.
    pub price: Money,

    /// Whether a slot is now held for the booking.
    pub success: bool,
}

impl ReservationOutcome {
    /// Creates a successful outcome carrying the resolved price.
    pub fn succeeded(booking_id: BookingId, user_id: UserId, price: Money) -> Self {
        Self {
            booking_id,
            user_id,
            price,
            success: true,
        }
    }

    /// Creates a failed outcome.
    pub fn failed(booking_id: BookingId, user_id: UserId, price: Money) -> Self {
        Self {
            booking_id,
            user_id,
            price,
            success: false,
        }
    }
}

/// Error delivering an outcome callback.
///
/// Delivery failures are logged by the pool and never retried.
#[derive(Debug, Error)]
#[error("callback delivery failed: {0}")]
pub struct CallbackError(pub String);

/// Delivery seam for reservation outcome callbacks.
#[async_trait]
pub trait OutcomeSender: Send + Sync {
    /// Delivers the outcome to the reservation pool's callback target.
    async fn send(&self, outcome: ReservationOutcome) -> Result<(), CallbackError>;
}

#[async_trait]
impl<T: OutcomeSender + ?Sized> OutcomeSender for Arc<T> {
    async fn send(&self, outcome: ReservationOutcome) -> Result<(), CallbackError> {
        (**self).send(outcome).await
    }
}

#[derive(Debug, Default)]
struct RecorderState {
    outcomes: Vec<ReservationOutcome>,
    fail_on_send: bool,
}

/// Outcome sender that records deliveries, for testing.
#[derive(Debug, Clone, Default)]
pub struct RecordingOutcomeSender {
    state: Arc<RwLock<RecorderState>>,
}

impl RecordingOutcomeSender {
    /// Creates a new recording sender.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the sender to fail deliveries.
    pub fn set_fail_on_send(&self, fail: bool) {
        self.state.write().unwrap().fail_on_send = fail;
    }

    /// Returns all recorded outcomes.
    pub fn outcomes(&self) -> Vec<ReservationOutcome> {
        self.state.read().unwrap().outcomes.clone()
    }

    /// Returns the most recent outcome, if any.
    pub fn last(&self) -> Option<ReservationOutcome> {
        self.state.read().unwrap().outcomes.last().cloned()
    }
}

#[async_trait]
impl OutcomeSender for RecordingOutcomeSender {
    async fn send(&self, outcome: ReservationOutcome) -> Result<(), CallbackError> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_send {
            return Err(CallbackError("recording sender set to fail".to_string()));
        }
        state.outcomes.push(outcome);
        Ok(())
    }
}
