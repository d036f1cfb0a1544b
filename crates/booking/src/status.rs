//! Booking status state machine.

use serde::{Deserialize, Serialize};

/// The status of a booking in its lifecycle.
///
/// Status transitions:
/// ```text
/// Created ─► AwaitingReservation ─► Reserved ─► AwaitingPayment ─► Paid ─► Completed
///     │              │                  │              │            │
///     └──────────────┴──────────────────┴──────────────┴────────────┴─► Cancelled
/// ```
///
/// Progress along the happy path is monotonic; `Cancelled` is reachable
/// from every non-terminal status and has no outgoing transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BookingStatus {
    /// Booking row just inserted.
    #[default]
    Created,

    /// Decided to request a slot; waiting for the reservation outcome.
    AwaitingReservation,

    /// Slot confirmed occupied; price is known from here on.
    Reserved,

    /// Decided to withdraw funds; waiting for the payment outcome.
    AwaitingPayment,

    /// Withdrawal confirmed.
    Paid,

    /// Saga finished successfully (terminal status).
    Completed,

    /// Terminal failure; any held resources have been released.
    Cancelled,
}

impl BookingStatus {
    /// Returns true if this is a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    /// Returns true if the booking can still be cancelled.
    pub fn can_cancel(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if the booking's price field is authoritative.
    ///
    /// Before `Reserved` the price must be treated as unset.
    pub fn price_is_set(&self) -> bool {
        matches!(
            self,
            BookingStatus::Reserved
                | BookingStatus::AwaitingPayment
                | BookingStatus::Paid
                | BookingStatus::Completed
        )
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Created => "Created",
            BookingStatus::AwaitingReservation => "AwaitingReservation",
            BookingStatus::Reserved => "Reserved",
            BookingStatus::AwaitingPayment => "AwaitingPayment",
            BookingStatus::Paid => "Paid",
            BookingStatus::Completed => "Completed",
            BookingStatus::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Created" => Ok(BookingStatus::Created),
            "AwaitingReservation" => Ok(BookingStatus::AwaitingReservation),
            "Reserved" => Ok(BookingStatus::Reserved),
            "AwaitingPayment" => Ok(BookingStatus::AwaitingPayment),
            "Paid" => Ok(BookingStatus::Paid),
            "Completed" => Ok(BookingStatus::Completed),
            "Cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(format!("unknown booking status: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [BookingStatus; 7] = [
        BookingStatus::Created,
        BookingStatus::AwaitingReservation,
        BookingStatus::Reserved,
        BookingStatus::AwaitingPayment,
        BookingStatus::Paid,
        BookingStatus::Completed,
        BookingStatus::Cancelled,
    ];

    #[test]
    fn test_default_is_created() {
        assert_eq!(BookingStatus::default(), BookingStatus::Created);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(BookingStatus::Completed.is_terminal());
        assert!(BookingStatus::Cancelled.is_terminal());
        for status in [
            BookingStatus::Created,
            BookingStatus::AwaitingReservation,
            BookingStatus::Reserved,
            BookingStatus::AwaitingPayment,
            BookingStatus::Paid,
        ] {
            assert!(!status.is_terminal());
            assert!(status.can_cancel());
        }
    }

    #[test]
    fn test_price_is_set_from_reserved_onward() {
        assert!(!BookingStatus::Created.price_is_set());
        assert!(!BookingStatus::AwaitingReservation.price_is_set());
        assert!(BookingStatus::Reserved.price_is_set());
        assert!(BookingStatus::AwaitingPayment.price_is_set());
        assert!(BookingStatus::Paid.price_is_set());
        assert!(BookingStatus::Completed.price_is_set());
        assert!(!BookingStatus::Cancelled.price_is_set());
    }

    #[test]
    fn test_string_roundtrip() {
        for status in ALL {
            let parsed: BookingStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("NeedToOccupy".parse::<BookingStatus>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            BookingStatus::AwaitingReservation.to_string(),
            "AwaitingReservation"
        );
        assert_eq!(BookingStatus::Cancelled.to_string(), "Cancelled");
    }
}
