//! Reservation error types.

use common::EventId;
use thiserror::Error;

/// Errors that can occur during reservation operations.
#[derive(Debug, Error)]
pub enum ReservationError {
    /// Event not found in the catalog.
    #[error("Event not found: {0}")]
    EventNotFound(EventId),

    /// The event definition is invalid.
    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    /// Database error from the backing store.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience type alias for reservation results.
pub type Result<T> = std::result::Result<T, ReservationError>;
