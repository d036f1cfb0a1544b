//! Payment outcome callback payload.

use common::{BookingId, Money, UserId};
use serde::{Deserialize, Serialize};

/// Asynchronous notification of a withdrawal's outcome.
///
/// Delivered out of band after the synchronous acknowledgment; the saga
/// orchestrator treats this payload, not the call's return, as the
/// authoritative result of a payment attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentOutcome {
    /// The booking whose payment this settles.
    pub booking_id: BookingId,

    /// Owner of the debited balance.
    pub user_id: UserId,

    /// The amount that was requested.
    pub amount: Money,

    /// Whether the withdrawal committed.
    pub success: bool,
}

impl PaymentOutcome {
    /// Creates a successful outcome.
    pub fn succeeded(booking_id: BookingId, user_id: UserId, amount: Money) -> Self {
        Self {
            booking_id,
            user_id,
            amount,
            success: true,
        }
    }

    /// Creates a failed outcome.
    pub fn failed(booking_id: BookingId, user_id: UserId, amount: Money) -> Self {
        Self {
            booking_id,
            user_id,
            amount,
            success: false,
        }
    }
}
