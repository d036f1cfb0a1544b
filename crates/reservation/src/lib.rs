//! Reservation pool: event catalog and slot capacity accounting.
//!
//! Each event has a fixed number of slots. A slot occupancy record is the
//! fact that one booking holds one unit of the event's capacity; the count
//! of records never exceeds the capacity. Occupy reports its outcome twice:
//! a synchronous acknowledgment for transport-failure detection, and an
//! asynchronous callback that is authoritative for saga progression.

pub mod callback;
pub mod error;
pub mod event;
pub mod memory;
pub mod pool;
pub mod postgres;
pub mod store;

pub use callback::{CallbackError, OutcomeSender, RecordingOutcomeSender, ReservationOutcome};
pub use error::ReservationError;
pub use event::EventRecord;
pub use memory::InMemoryReservationStore;
pub use pool::ReservationPool;
pub use postgres::PostgresReservationStore;
pub use store::{OccupyOutcome, ReservationStore};
