//! Peer client traits and in-memory implementations for saga effects.
//!
//! The orchestrator only ever sees synchronous acknowledgments through
//! these seams; authoritative outcomes arrive later as callbacks. A client
//! error therefore means "the peer could not be reached", which the driver
//! treats exactly like a failure response.

pub mod ledger;
pub mod notifier;
pub mod reservation;

use thiserror::Error;

pub use self::ledger::{InMemoryLedgerClient, LedgerClient};
pub use self::notifier::{InMemoryNotifier, Notifier};
pub use self::reservation::{InMemoryReservationClient, ReservationClient};

/// A peer call failed at the transport level.
#[derive(Debug, Error)]
#[error("peer call failed: {0}")]
pub struct ClientError(pub String);
