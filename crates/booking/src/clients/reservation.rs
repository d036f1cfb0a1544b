//! Reservation pool client trait and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{BookingId, EventId, UserId};

use super::ClientError;

/// Client for the reservation pool's occupy and cancel operations.
#[async_trait]
pub trait ReservationClient: Send + Sync {
    /// Asks the pool to occupy one slot of the event for the booking.
    ///
    /// The acknowledgment only confirms the request was delivered; the
    /// outcome arrives through the reservation callback.
    async fn occupy(
        &self,
        event_id: EventId,
        booking_id: BookingId,
        user_id: UserId,
    ) -> Result<(), ClientError>;

    /// Asks the pool to release the slot held by the booking.
    ///
    /// The user id is carried for identity propagation only; the pool
    /// releases by `(event_id, booking_id)`.
    async fn cancel(
        &self,
        event_id: EventId,
        booking_id: BookingId,
        user_id: UserId,
    ) -> Result<(), ClientError>;
}

#[async_trait]
impl<T: ReservationClient + ?Sized> ReservationClient for std::sync::Arc<T> {
    async fn occupy(
        &self,
        event_id: EventId,
        booking_id: BookingId,
        user_id: UserId,
    ) -> Result<(), ClientError> {
        (**self).occupy(event_id, booking_id, user_id).await
    }

    async fn cancel(
        &self,
        event_id: EventId,
        booking_id: BookingId,
        user_id: UserId,
    ) -> Result<(), ClientError> {
        (**self).cancel(event_id, booking_id, user_id).await
    }
}

#[derive(Debug, Default)]
struct InMemoryReservationState {
    occupy_calls: Vec<(EventId, BookingId, UserId)>,
    cancel_calls: Vec<(EventId, BookingId)>,
    fail_on_occupy: bool,
    fail_on_cancel: bool,
}

/// In-memory reservation client for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReservationClient {
    state: Arc<RwLock<InMemoryReservationState>>,
}

impl InMemoryReservationClient {
    /// Creates a new in-memory reservation client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the client to fail occupy calls.
    pub fn set_fail_on_occupy(&self, fail: bool) {
        self.state.write().unwrap().fail_on_occupy = fail;
    }

    /// Configures the client to fail cancel calls.
    pub fn set_fail_on_cancel(&self, fail: bool) {
        self.state.write().unwrap().fail_on_cancel = fail;
    }

    /// Returns the number of occupy calls made.
    pub fn occupy_count(&self) -> usize {
        self.state.read().unwrap().occupy_calls.len()
    }

    /// Returns the number of cancel calls made.
    pub fn cancel_count(&self) -> usize {
        self.state.read().unwrap().cancel_calls.len()
    }

    /// Returns true if a cancel was recorded for the booking.
    pub fn cancelled(&self, booking_id: BookingId) -> bool {
        self.state
            .read()
            .unwrap()
            .cancel_calls
            .iter()
            .any(|(_, b)| *b == booking_id)
    }
}

#[async_trait]
impl ReservationClient for InMemoryReservationClient {
    async fn occupy(
        &self,
        event_id: EventId,
        booking_id: BookingId,
        user_id: UserId,
    ) -> Result<(), ClientError> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_occupy {
            return Err(ClientError("reservation pool unreachable".to_string()));
        }
        state.occupy_calls.push((event_id, booking_id, user_id));
        Ok(())
    }

    async fn cancel(
        &self,
        event_id: EventId,
        booking_id: BookingId,
        _user_id: UserId,
    ) -> Result<(), ClientError> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_cancel {
            return Err(ClientError("reservation pool unreachable".to_string()));
        }
        state.cancel_calls.push((event_id, booking_id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_calls() {
        let client = InMemoryReservationClient::new();
        let booking_id = BookingId::new();

        client
            .occupy(EventId::new(), booking_id, UserId::new())
            .await
            .unwrap();
        client
            .cancel(EventId::new(), booking_id, UserId::new())
            .await
            .unwrap();

        assert_eq!(client.occupy_count(), 1);
        assert_eq!(client.cancel_count(), 1);
        assert!(client.cancelled(booking_id));
    }

    #[tokio::test]
    async fn test_fail_toggles() {
        let client = InMemoryReservationClient::new();
        client.set_fail_on_occupy(true);

        let result = client
            .occupy(EventId::new(), BookingId::new(), UserId::new())
            .await;
        assert!(result.is_err());
        assert_eq!(client.occupy_count(), 0);
    }
}
