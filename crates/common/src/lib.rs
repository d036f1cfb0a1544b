//! Shared types for the booking system.
//!
//! Identifier newtypes and the `Money` value type used by every component.

pub mod money;
pub mod types;

pub use money::Money;
pub use types::{BookingId, EventId, OperationToken, UserId};
