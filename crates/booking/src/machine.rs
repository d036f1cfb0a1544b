//! Pure transition function for the booking saga.
//!
//! The status column is the saga's persisted cursor. Each external trigger
//! (the creation call or an outcome callback) maps to a list of steps; a
//! step is one status transition plus the external calls to issue after
//! that transition is written. Self-advancing chains — `Created` through
//! `AwaitingReservation`, `Reserved` through `AwaitingPayment`, `Paid`
//! through `Completed` — are just multiple steps returned for one trigger.

use common::Money;

use crate::status::BookingStatus;

/// External trigger driving the saga forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// The booking was just created.
    Start,

    /// Reservation outcome callback: a slot is held, price resolved.
    SlotConfirmed { price: Money },

    /// Reservation outcome callback or occupy transport failure: no slot.
    SlotRejected,

    /// Payment outcome callback: the withdrawal committed.
    PaymentConfirmed,

    /// Payment outcome callback or withdraw transport failure.
    PaymentRejected,
}

/// External call to issue after a step's transition is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Ask the reservation pool to occupy a slot.
    OccupySlot,

    /// Ask the ledger to withdraw the booking's price.
    Withdraw,

    /// Release the held slot (compensation).
    ReleaseSlot,

    /// Tell the user the booking completed.
    NotifyCompleted,

    /// Tell the user the booking was cancelled.
    NotifyCancelled,
}

/// One persisted transition and the effects to run after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Status to persist.
    pub status: BookingStatus,

    /// Price to persist along with the status, if this step sets it.
    pub price: Option<Money>,

    /// External calls to issue once the transition is written.
    pub effects: Vec<Effect>,
}

impl Step {
    fn to(status: BookingStatus) -> Self {
        Self {
            status,
            price: None,
            effects: Vec::new(),
        }
    }

    fn with_price(mut self, price: Money) -> Self {
        self.price = Some(price);
        self
    }

    fn with_effects(mut self, effects: Vec<Effect>) -> Self {
        self.effects = effects;
        self
    }
}

/// Computes the steps for a trigger arriving at the given status.
///
/// An empty result means the trigger does not apply — the status is
/// terminal, or the callback is late or duplicated. Progress is monotonic:
/// no step ever moves backward along the happy path, and `Cancelled`
/// absorbs everything.
pub fn advance(current: BookingStatus, trigger: Trigger) -> Vec<Step> {
    match (current, trigger) {
        (BookingStatus::Created, Trigger::Start) => {
            vec![
                Step::to(BookingStatus::AwaitingReservation)
                    .with_effects(vec![Effect::OccupySlot]),
            ]
        }
        (BookingStatus::AwaitingReservation, Trigger::SlotConfirmed { price }) => {
            vec![
                Step::to(BookingStatus::Reserved).with_price(price),
                Step::to(BookingStatus::AwaitingPayment).with_effects(vec![Effect::Withdraw]),
            ]
        }
        (BookingStatus::AwaitingReservation, Trigger::SlotRejected) => {
            // No slot was acquired; there is nothing to unwind.
            vec![Step::to(BookingStatus::Cancelled).with_effects(vec![Effect::NotifyCancelled])]
        }
        (BookingStatus::AwaitingPayment, Trigger::PaymentConfirmed) => {
            vec![
                Step::to(BookingStatus::Paid),
                Step::to(BookingStatus::Completed).with_effects(vec![Effect::NotifyCompleted]),
            ]
        }
        (BookingStatus::AwaitingPayment, Trigger::PaymentRejected) => {
            // The slot is held; release it before notifying.
            vec![
                Step::to(BookingStatus::Cancelled)
                    .with_effects(vec![Effect::ReleaseSlot, Effect::NotifyCancelled]),
            ]
        }
        // Terminal statuses absorb everything; any other pairing is a
        // late or duplicated callback and is ignored.
        _ => Vec::new(),
    }
}
