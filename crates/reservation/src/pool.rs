//! Reservation pool service.

use common::{BookingId, EventId, Money, UserId};

use crate::callback::{OutcomeSender, ReservationOutcome};
use crate::error::{ReservationError, Result};
use crate::event::EventRecord;
use crate::store::{OccupyOutcome, ReservationStore};

/// Slot reservation service over a storage backend and a callback sender.
///
/// `occupy` always attempts to notify the callback target, even when the
/// attempt itself could not be evaluated, so the saga driving it never
/// hangs waiting for an outcome. Callback delivery failures are logged and
/// not retried. `cancel` is the distinct compensating operation; it shares
/// nothing with occupy beyond the record identity.
pub struct ReservationPool<S: ReservationStore, C: OutcomeSender> {
    store: S,
    outcomes: C,
}

impl<S: ReservationStore, C: OutcomeSender> ReservationPool<S, C> {
    /// Creates a new reservation pool.
    pub fn new(store: S, outcomes: C) -> Self {
        Self { store, outcomes }
    }

    /// Adds an event to the catalog.
    #[tracing::instrument(skip(self))]
    pub async fn create_event(
        &self,
        name: &str,
        price: Money,
        total_slots: u32,
    ) -> Result<EventRecord> {
        if name.is_empty() {
            return Err(ReservationError::InvalidEvent(
                "event name must not be empty".to_string(),
            ));
        }
        if total_slots == 0 {
            return Err(ReservationError::InvalidEvent(
                "event must have at least one slot".to_string(),
            ));
        }

        let event = EventRecord::new(name, price, total_slots);
        self.store.create_event(event.clone()).await?;
        tracing::info!(event_id = %event.id, name, total_slots, "event created");
        Ok(event)
    }

    /// Looks up an event by ID.
    #[tracing::instrument(skip(self))]
    pub async fn get_event(&self, event_id: EventId) -> Result<Option<EventRecord>> {
        self.store.get_event(event_id).await
    }

    /// Lists all catalog events.
    #[tracing::instrument(skip(self))]
    pub async fn list_events(&self) -> Result<Vec<EventRecord>> {
        self.store.list_events().await
    }

    /// Attempts to occupy one slot of the event for the booking.
    ///
    /// Returns whether a slot is held after the attempt. The authoritative
    /// outcome travels through the callback sender regardless of how the
    /// attempt went; the return value (and any error) only serves the
    /// caller's transport-failure detection.
    #[tracing::instrument(skip(self))]
    pub async fn occupy(
        &self,
        event_id: EventId,
        booking_id: BookingId,
        user_id: UserId,
    ) -> Result<bool> {
        let event = match self.store.get_event(event_id).await {
            Ok(Some(event)) => event,
            Ok(None) => {
                tracing::warn!(%event_id, %booking_id, "occupy for unknown event");
                self.notify(ReservationOutcome::failed(booking_id, user_id, Money::zero()))
                    .await;
                return Err(ReservationError::EventNotFound(event_id));
            }
            Err(e) => {
                tracing::error!(%event_id, %booking_id, error = %e, "failed to resolve event");
                self.notify(ReservationOutcome::failed(booking_id, user_id, Money::zero()))
                    .await;
                return Err(e);
            }
        };

        let outcome = match self
            .store
            .occupy_slot(event_id, booking_id, event.total_slots)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(%event_id, %booking_id, error = %e, "failed to occupy slot");
                self.notify(ReservationOutcome::failed(booking_id, user_id, event.price))
                    .await;
                return Err(e);
            }
        };

        let held = match outcome {
            OccupyOutcome::Occupied => {
                metrics::counter!("slots_occupied").increment(1);
                tracing::info!(%event_id, %booking_id, "slot occupied");
                true
            }
            OccupyOutcome::AlreadyHeld => {
                tracing::debug!(%event_id, %booking_id, "slot already held by booking");
                true
            }
            OccupyOutcome::NoSlotAvailable => {
                metrics::counter!("slots_rejected").increment(1);
                tracing::info!(%event_id, %booking_id, "no slot available");
                false
            }
        };

        let outcome = if held {
            ReservationOutcome::succeeded(booking_id, user_id, event.price)
        } else {
            ReservationOutcome::failed(booking_id, user_id, event.price)
        };
        self.notify(outcome).await;

        Ok(held)
    }

    /// Releases the slot held by the booking, unconditionally freeing the
    /// capacity. Idempotent.
    #[tracing::instrument(skip(self))]
    pub async fn cancel(&self, event_id: EventId, booking_id: BookingId) -> Result<()> {
        self.store.release_slot(event_id, booking_id).await?;
        metrics::counter!("slots_released").increment(1);
        tracing::info!(%event_id, %booking_id, "slot released");
        Ok(())
    }

    /// Number of live occupancy records for the event.
    pub async fn occupied_count(&self, event_id: EventId) -> Result<u32> {
        self.store.occupied_count(event_id).await
    }

    async fn notify(&self, outcome: ReservationOutcome) {
        if let Err(e) = self.outcomes.send(outcome).await {
            tracing::error!(error = %e, "failed to deliver reservation outcome callback");
        }
    }
}
