//! Ledger error types.

use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Database error from the backing store.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The requested amount is not a positive value.
    #[error("Invalid amount: {cents} cents")]
    InvalidAmount { cents: i64 },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience type alias for ledger results.
pub type Result<T> = std::result::Result<T, LedgerError>;
