//! Event catalog record.

use common::{EventId, Money};
use serde::{Deserialize, Serialize};

/// A bookable event in the catalog.
///
/// Price and capacity are fixed at creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    /// Unique event identifier.
    pub id: EventId,

    /// Human-readable event name.
    pub name: String,

    /// Price of one slot.
    pub price: Money,

    /// Total capacity of the event.
    pub total_slots: u32,
}

impl EventRecord {
    /// Creates a new event record with a fresh ID.
    pub fn new(name: impl Into<String>, price: Money, total_slots: u32) -> Self {
        Self {
            id: EventId::new(),
            name: name.into(),
            price,
            total_slots,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_assigns_id() {
        let a = EventRecord::new("Concert", Money::from_cents(2000), 100);
        let b = EventRecord::new("Concert", Money::from_cents(2000), 100);
        assert_ne!(a.id, b.id);
        assert_eq!(a.total_slots, 100);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let event = EventRecord::new("Workshop", Money::from_cents(500), 12);
        let json = serde_json::to_string(&event).unwrap();
        let back: EventRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, event.id);
        assert_eq!(back.name, "Workshop");
        assert_eq!(back.price, Money::from_cents(500));
    }
}
