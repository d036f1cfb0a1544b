//! HTTP peer gateways for split deployment.
//!
//! When the components run as separate services, each seam becomes a JSON
//! POST to the peer's base URL, with the resolved user identity propagated
//! in `X-User-Id` and idempotency tokens in `X-Request-Id`. A non-success
//! response or a transport error both surface as a client error; the
//! orchestrator treats either exactly like a failure response.

use async_trait::async_trait;
use booking::{ClientError, LedgerClient, Notifier, ReservationClient};
use common::{BookingId, EventId, Money, OperationToken, UserId};
use ledger::PaymentOutcome;
use reservation::{CallbackError, OutcomeSender, ReservationOutcome};

use crate::callbacks::{PaymentCallbackError, PaymentSender};

/// Reservation pool client over HTTP.
pub struct HttpReservationClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpReservationClient {
    /// Creates a client for the pool at the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ReservationClient for HttpReservationClient {
    async fn occupy(
        &self,
        event_id: EventId,
        booking_id: BookingId,
        user_id: UserId,
    ) -> Result<(), ClientError> {
        self.client
            .post(format!("{}/events/occupy", self.base_url))
            .header("X-User-Id", user_id.to_string())
            .json(&serde_json::json!({
                "booking_id": booking_id,
                "event_id": event_id,
            }))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ClientError(e.to_string()))?;
        Ok(())
    }

    async fn cancel(
        &self,
        event_id: EventId,
        booking_id: BookingId,
        user_id: UserId,
    ) -> Result<(), ClientError> {
        self.client
            .post(format!("{}/events/cancel", self.base_url))
            .header("X-User-Id", user_id.to_string())
            .json(&serde_json::json!({
                "booking_id": booking_id,
                "event_id": event_id,
            }))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ClientError(e.to_string()))?;
        Ok(())
    }
}

/// Ledger client over HTTP.
pub struct HttpLedgerClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpLedgerClient {
    /// Creates a client for the ledger at the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl LedgerClient for HttpLedgerClient {
    async fn reserve_token(
        &self,
        user_id: UserId,
        token: OperationToken,
    ) -> Result<(), ClientError> {
        self.client
            .post(format!("{}/account/reserve", self.base_url))
            .header("X-User-Id", user_id.to_string())
            .header("X-Request-Id", token.to_string())
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ClientError(e.to_string()))?;
        Ok(())
    }

    async fn withdraw(
        &self,
        user_id: UserId,
        token: OperationToken,
        amount: Money,
        booking_id: BookingId,
    ) -> Result<(), ClientError> {
        self.client
            .post(format!("{}/account/withdraw", self.base_url))
            .header("X-User-Id", user_id.to_string())
            .header("X-Request-Id", token.to_string())
            .json(&serde_json::json!({
                "booking_id": booking_id,
                "amount": amount,
            }))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ClientError(e.to_string()))?;
        Ok(())
    }
}

/// Notification collaborator over HTTP.
pub struct HttpNotifier {
    client: reqwest::Client,
    base_url: String,
}

impl HttpNotifier {
    /// Creates a notifier for the collaborator at the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn notify(&self, user_id: UserId, message: &str) -> Result<(), ClientError> {
        self.client
            .post(format!("{}/notify", self.base_url))
            .header("X-User-Id", user_id.to_string())
            .json(&serde_json::json!({
                "user_id": user_id,
                "message": message,
            }))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ClientError(e.to_string()))?;
        Ok(())
    }
}

/// Reservation outcome sender posting to the orchestrator's callback
/// endpoint.
pub struct HttpOutcomeSender {
    client: reqwest::Client,
    base_url: String,
}

impl HttpOutcomeSender {
    /// Creates a sender for the orchestrator at the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl OutcomeSender for HttpOutcomeSender {
    async fn send(&self, outcome: ReservationOutcome) -> Result<(), CallbackError> {
        self.client
            .post(format!("{}/bookings/callback/reservation", self.base_url))
            .header("X-User-Id", outcome.user_id.to_string())
            .json(&outcome)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| CallbackError(e.to_string()))?;
        Ok(())
    }
}

/// Payment outcome sender posting to the orchestrator's callback endpoint.
pub struct HttpPaymentSender {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPaymentSender {
    /// Creates a sender for the orchestrator at the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl PaymentSender for HttpPaymentSender {
    async fn send(&self, outcome: PaymentOutcome) -> Result<(), PaymentCallbackError> {
        self.client
            .post(format!("{}/bookings/callback/payment", self.base_url))
            .header("X-User-Id", outcome.user_id.to_string())
            .json(&outcome)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| PaymentCallbackError(e.to_string()))?;
        Ok(())
    }
}
