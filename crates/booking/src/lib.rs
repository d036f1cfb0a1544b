//! Booking saga orchestrator.
//!
//! A booking moves through a fixed sequence of states — reserve a slot,
//! withdraw the price, complete — with a one-way jump to `Cancelled` from
//! any non-terminal state. The transition logic is a pure function from
//! `(status, trigger)` to a list of steps; the orchestrator drives it,
//! persisting each transition before issuing the step's external calls so
//! the status column is always a valid resume cursor. Compensation only
//! unwinds already-acquired resources, in reverse order of acquisition.

pub mod clients;
pub mod error;
pub mod machine;
pub mod memory;
pub mod orchestrator;
pub mod postgres;
pub mod record;
pub mod status;
pub mod store;

pub use clients::{
    ClientError, InMemoryLedgerClient, InMemoryNotifier, InMemoryReservationClient, LedgerClient,
    Notifier, ReservationClient,
};
pub use error::BookingError;
pub use machine::{Effect, Step, Trigger, advance};
pub use memory::InMemoryBookingStore;
pub use orchestrator::Orchestrator;
pub use postgres::PostgresBookingStore;
pub use record::Booking;
pub use status::BookingStatus;
pub use store::BookingStore;
