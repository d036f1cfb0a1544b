//! Idempotent balance ledger.
//!
//! A user's balance is the sum of committed entries. Every operation runs in
//! two phases: a token is reserved as a pending entry (delta 0), then exactly
//! one commit promotes it to committed with its real delta. Replaying a
//! commit with the same token finds no pending row and no-ops, which makes
//! deposits and withdrawals exactly-once under client retry.

pub mod callback;
pub mod entry;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod service;
pub mod store;

pub use callback::PaymentOutcome;
pub use entry::{EntryStatus, LedgerEntry};
pub use error::LedgerError;
pub use memory::InMemoryLedgerStore;
pub use postgres::PostgresLedgerStore;
pub use service::{ApplyOutcome, Ledger, ReserveOutcome, WithdrawOutcome};
pub use store::LedgerStore;
