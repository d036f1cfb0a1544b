//! Booking storage trait.

use async_trait::async_trait;
use common::{BookingId, Money};

use crate::error::Result;
use crate::record::Booking;
use crate::status::BookingStatus;

/// Storage backend for booking rows.
///
/// Status and price updates are separate writes, matching the driver
/// contract: every transition is persisted before the next external call
/// is issued, so the stored status is always a valid resume cursor.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Inserts a new booking row.
    async fn insert(&self, booking: &Booking) -> Result<()>;

    /// Loads a booking by ID.
    async fn get(&self, booking_id: BookingId) -> Result<Option<Booking>>;

    /// Lists all bookings.
    async fn list(&self) -> Result<Vec<Booking>>;

    /// Updates the booking's status.
    async fn set_status(&self, booking_id: BookingId, status: BookingStatus) -> Result<()>;

    /// Updates the booking's price.
    async fn set_price(&self, booking_id: BookingId, price: Money) -> Result<()>;
}
