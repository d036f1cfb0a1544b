//! In-memory reservation store.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use common::{BookingId, EventId};
use tokio::sync::RwLock;

use crate::error::Result;
use crate::event::EventRecord;
use crate::store::{OccupyOutcome, ReservationStore};

#[derive(Default)]
struct Inner {
    events: HashMap<EventId, EventRecord>,
    // Occupancy records; presence of a pair means the booking holds a slot.
    slots: HashSet<(EventId, BookingId)>,
}

/// In-memory reservation store for testing and single-process deployments.
///
/// The capacity check and the insert run under one write lock, which is
/// the in-memory equivalent of the guarded SQL insert.
#[derive(Clone, Default)]
pub struct InMemoryReservationStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryReservationStore {
    /// Creates a new empty in-memory reservation store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears all events and occupancy records.
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        inner.events.clear();
        inner.slots.clear();
    }
}

#[async_trait]
impl ReservationStore for InMemoryReservationStore {
    async fn create_event(&self, event: EventRecord) -> Result<()> {
        self.inner.write().await.events.insert(event.id, event);
        Ok(())
    }

    async fn get_event(&self, event_id: EventId) -> Result<Option<EventRecord>> {
        Ok(self.inner.read().await.events.get(&event_id).cloned())
    }

    async fn list_events(&self) -> Result<Vec<EventRecord>> {
        let inner = self.inner.read().await;
        let mut events: Vec<_> = inner.events.values().cloned().collect();
        events.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(events)
    }

    async fn occupy_slot(
        &self,
        event_id: EventId,
        booking_id: BookingId,
        capacity: u32,
    ) -> Result<OccupyOutcome> {
        let mut inner = self.inner.write().await;

        if inner.slots.contains(&(event_id, booking_id)) {
            return Ok(OccupyOutcome::AlreadyHeld);
        }

        let occupied = inner.slots.iter().filter(|(e, _)| *e == event_id).count() as u32;
        if occupied >= capacity {
            return Ok(OccupyOutcome::NoSlotAvailable);
        }

        inner.slots.insert((event_id, booking_id));
        Ok(OccupyOutcome::Occupied)
    }

    async fn release_slot(&self, event_id: EventId, booking_id: BookingId) -> Result<()> {
        self.inner.write().await.slots.remove(&(event_id, booking_id));
        Ok(())
    }

    async fn occupied_count(&self, event_id: EventId) -> Result<u32> {
        let inner = self.inner.read().await;
        Ok(inner.slots.iter().filter(|(e, _)| *e == event_id).count() as u32)
    }
}
