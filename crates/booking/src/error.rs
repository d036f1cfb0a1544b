//! Booking error types.

use common::BookingId;
use thiserror::Error;

/// Errors that can occur during booking operations.
#[derive(Debug, Error)]
pub enum BookingError {
    /// Booking not found.
    #[error("Booking not found: {0}")]
    NotFound(BookingId),

    /// Database error from the backing store.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience type alias for booking results.
pub type Result<T> = std::result::Result<T, BookingError>;
