//! In-memory booking store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{BookingId, Money};
use tokio::sync::RwLock;

use crate::error::{BookingError, Result};
use crate::record::Booking;
use crate::status::BookingStatus;
use crate::store::BookingStore;

/// In-memory booking store for testing and single-process deployments.
#[derive(Clone, Default)]
pub struct InMemoryBookingStore {
    bookings: Arc<RwLock<HashMap<BookingId, Booking>>>,
}

impl InMemoryBookingStore {
    /// Creates a new empty in-memory booking store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of bookings stored.
    pub async fn booking_count(&self) -> usize {
        self.bookings.read().await.len()
    }

    /// Clears all bookings.
    pub async fn clear(&self) {
        self.bookings.write().await.clear();
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn insert(&self, booking: &Booking) -> Result<()> {
        self.bookings
            .write()
            .await
            .insert(booking.id, booking.clone());
        Ok(())
    }

    async fn get(&self, booking_id: BookingId) -> Result<Option<Booking>> {
        Ok(self.bookings.read().await.get(&booking_id).cloned())
    }

    async fn list(&self) -> Result<Vec<Booking>> {
        let bookings = self.bookings.read().await;
        let mut all: Vec<_> = bookings.values().cloned().collect();
        all.sort_by_key(|b| b.created_at);
        Ok(all)
    }

    async fn set_status(&self, booking_id: BookingId, status: BookingStatus) -> Result<()> {
        let mut bookings = self.bookings.write().await;
        let booking = bookings
            .get_mut(&booking_id)
            .ok_or(BookingError::NotFound(booking_id))?;
        booking.status = status;
        Ok(())
    }

    async fn set_price(&self, booking_id: BookingId, price: Money) -> Result<()> {
        let mut bookings = self.bookings.write().await;
        let booking = bookings
            .get_mut(&booking_id)
            .ok_or(BookingError::NotFound(booking_id))?;
        booking.price = Some(price);
        Ok(())
    }
}
