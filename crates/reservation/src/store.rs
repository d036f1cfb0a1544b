//! Reservation storage trait.

use async_trait::async_trait;
use common::{BookingId, EventId};

use crate::error::Result;
use crate::event::EventRecord;

/// Outcome of a capacity-guarded occupy attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccupyOutcome {
    /// An occupancy record was created.
    Occupied,

    /// The event is at capacity; nothing was written.
    NoSlotAvailable,

    /// This booking already holds a slot for the event; nothing was written.
    AlreadyHeld,
}

/// Storage backend for the event catalog and slot occupancy records.
///
/// `occupy_slot` must be an atomic conditional write: the capacity check
/// and the insert happen as one storage-level operation, so concurrent
/// occupy attempts with one slot remaining yield exactly one success.
/// The `(event_id, booking_id)` pair is unique — at most one record per
/// booking per event.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Inserts an event into the catalog.
    async fn create_event(&self, event: EventRecord) -> Result<()>;

    /// Looks up an event by ID.
    async fn get_event(&self, event_id: EventId) -> Result<Option<EventRecord>>;

    /// Lists all catalog events.
    async fn list_events(&self) -> Result<Vec<EventRecord>>;

    /// Creates an occupancy record if the event still has capacity.
    ///
    /// `capacity` is the event's fixed total; the store guarantees the
    /// live record count never exceeds it.
    async fn occupy_slot(
        &self,
        event_id: EventId,
        booking_id: BookingId,
        capacity: u32,
    ) -> Result<OccupyOutcome>;

    /// Deletes the occupancy record for the booking, freeing the slot.
    ///
    /// Idempotent: deleting a non-existent record is not an error.
    async fn release_slot(&self, event_id: EventId, booking_id: BookingId) -> Result<()>;

    /// Number of live occupancy records for the event.
    async fn occupied_count(&self, event_id: EventId) -> Result<u32>;
}
