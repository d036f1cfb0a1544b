//! Booking record model.

use chrono::{DateTime, Utc};
use common::{BookingId, EventId, Money, UserId};
use serde::{Deserialize, Serialize};

use crate::status::BookingStatus;

/// A booking row.
///
/// Bookings are never deleted; cancellation is a status value. The price
/// is filled in once the reservation is confirmed and must be treated as
/// unset before that.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    /// Unique booking identifier, assigned at creation.
    pub id: BookingId,

    /// Owning user.
    pub user_id: UserId,

    /// Target event.
    pub event_id: EventId,

    /// Slot price, known once the status reaches `Reserved`.
    pub price: Option<Money>,

    /// Current saga cursor.
    pub status: BookingStatus,

    /// When the booking was created.
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Creates a new booking in the `Created` status with a fresh ID.
    pub fn new(user_id: UserId, event_id: EventId) -> Self {
        Self {
            id: BookingId::new(),
            user_id,
            event_id,
            price: None,
            status: BookingStatus::Created,
            created_at: Utc::now(),
        }
    }
}
