//! Saga orchestrator driving the booking state machine.

use std::collections::VecDeque;

use common::{BookingId, EventId, OperationToken, UserId};
use ledger::PaymentOutcome;
use reservation::ReservationOutcome;

use crate::clients::{LedgerClient, Notifier, ReservationClient};
use crate::error::{BookingError, Result};
use crate::machine::{self, Effect, Trigger};
use crate::record::Booking;
use crate::store::BookingStore;

/// Orchestrates booking sagas over a store and the three peer seams.
///
/// Each external trigger — the creation call or an outcome callback — runs
/// one `dispatch`: the transition function computes the steps, every
/// transition is persisted before its effects are issued, and an effect
/// that fails at the transport level feeds the matching failure trigger
/// back into the same dispatch. The original booking caller never sees any
/// of this; failures surface only as the status converging to `Cancelled`
/// and a notification.
pub struct Orchestrator<B, R, L, N>
where
    B: BookingStore,
    R: ReservationClient,
    L: LedgerClient,
    N: Notifier,
{
    store: B,
    reservation: R,
    ledger: L,
    notifier: N,
}

impl<B, R, L, N> Orchestrator<B, R, L, N>
where
    B: BookingStore,
    R: ReservationClient,
    L: LedgerClient,
    N: Notifier,
{
    /// Creates a new orchestrator.
    pub fn new(store: B, reservation: R, ledger: L, notifier: N) -> Self {
        Self {
            store,
            reservation,
            ledger,
            notifier,
        }
    }

    /// Creates a booking and starts driving it forward.
    ///
    /// Returns the accepted booking. Whatever happens after acceptance is
    /// only visible through the booking's status and the notification side
    /// channel.
    #[tracing::instrument(skip(self))]
    pub async fn create_booking(&self, user_id: UserId, event_id: EventId) -> Result<Booking> {
        let booking = Booking::new(user_id, event_id);
        self.store.insert(&booking).await?;
        metrics::counter!("bookings_created").increment(1);
        tracing::info!(booking_id = %booking.id, %user_id, %event_id, "booking created");

        // The caller only learns the booking was accepted; anything that
        // goes wrong past this point surfaces through the status and the
        // notification side channel.
        if let Err(e) = self.dispatch(booking.id, Trigger::Start).await {
            tracing::error!(booking_id = %booking.id, error = %e, "failed to advance new booking");
        }
        Ok(booking)
    }

    /// Handles a reservation outcome callback.
    #[tracing::instrument(skip(self))]
    pub async fn reservation_outcome(&self, outcome: ReservationOutcome) -> Result<()> {
        let trigger = if outcome.success {
            Trigger::SlotConfirmed {
                price: outcome.price,
            }
        } else {
            Trigger::SlotRejected
        };
        self.dispatch(outcome.booking_id, trigger).await
    }

    /// Handles a payment outcome callback.
    #[tracing::instrument(skip(self))]
    pub async fn payment_outcome(&self, outcome: PaymentOutcome) -> Result<()> {
        let trigger = if outcome.success {
            Trigger::PaymentConfirmed
        } else {
            Trigger::PaymentRejected
        };
        self.dispatch(outcome.booking_id, trigger).await
    }

    /// Loads a booking by ID.
    pub async fn get_booking(&self, booking_id: BookingId) -> Result<Option<Booking>> {
        self.store.get(booking_id).await
    }

    /// Lists all bookings.
    pub async fn list_bookings(&self) -> Result<Vec<Booking>> {
        self.store.list().await
    }

    /// Runs the driver for one trigger.
    ///
    /// Failure triggers produced by effect execution are processed within
    /// the same call, so by the time `dispatch` returns the booking has
    /// settled into the furthest status this trigger can reach.
    async fn dispatch(&self, booking_id: BookingId, trigger: Trigger) -> Result<()> {
        let mut pending = VecDeque::from([trigger]);

        while let Some(trigger) = pending.pop_front() {
            let mut booking = self
                .store
                .get(booking_id)
                .await?
                .ok_or(BookingError::NotFound(booking_id))?;

            let steps = machine::advance(booking.status, trigger);
            if steps.is_empty() {
                tracing::debug!(
                    %booking_id,
                    status = %booking.status,
                    ?trigger,
                    "trigger does not apply; ignoring"
                );
                continue;
            }

            for step in steps {
                // The transition is the saga's cursor: write it before
                // issuing the step's external calls.
                if let Some(price) = step.price {
                    self.store.set_price(booking_id, price).await?;
                    booking.price = Some(price);
                }
                self.store.set_status(booking_id, step.status).await?;
                booking.status = step.status;
                tracing::info!(%booking_id, status = %step.status, "booking transitioned");

                for effect in step.effects {
                    if let Some(follow_up) = self.perform(&booking, effect).await {
                        pending.push_back(follow_up);
                    }
                }
            }
        }

        Ok(())
    }

    /// Executes one effect, returning the failure trigger to feed back
    /// into the driver when the effect's peer could not be reached.
    async fn perform(&self, booking: &Booking, effect: Effect) -> Option<Trigger> {
        match effect {
            Effect::OccupySlot => {
                match self
                    .reservation
                    .occupy(booking.event_id, booking.id, booking.user_id)
                    .await
                {
                    Ok(()) => None,
                    Err(e) => {
                        tracing::warn!(
                            booking_id = %booking.id,
                            error = %e,
                            "occupy request failed; cancelling booking"
                        );
                        Some(Trigger::SlotRejected)
                    }
                }
            }
            Effect::Withdraw => {
                let Some(price) = booking.price else {
                    // The machine only emits Withdraw after the price was
                    // persisted; a missing price here is data corruption.
                    tracing::error!(booking_id = %booking.id, "withdraw requested without a price");
                    return Some(Trigger::PaymentRejected);
                };

                let token = OperationToken::for_booking(booking.id);
                if let Err(e) = self.ledger.reserve_token(booking.user_id, token).await {
                    tracing::warn!(
                        booking_id = %booking.id,
                        error = %e,
                        "token reservation failed; cancelling booking"
                    );
                    return Some(Trigger::PaymentRejected);
                }

                match self
                    .ledger
                    .withdraw(booking.user_id, token, price, booking.id)
                    .await
                {
                    Ok(()) => None,
                    Err(e) => {
                        tracing::warn!(
                            booking_id = %booking.id,
                            error = %e,
                            "withdraw request failed; cancelling booking"
                        );
                        Some(Trigger::PaymentRejected)
                    }
                }
            }
            Effect::ReleaseSlot => {
                if let Err(e) = self
                    .reservation
                    .cancel(booking.event_id, booking.id, booking.user_id)
                    .await
                {
                    tracing::error!(
                        booking_id = %booking.id,
                        error = %e,
                        "failed to release slot during compensation"
                    );
                }
                None
            }
            Effect::NotifyCompleted => {
                metrics::counter!("bookings_completed").increment(1);
                self.record_duration(booking);
                let message = format!("Booking {} confirmed", booking.id);
                if let Err(e) = self.notifier.notify(booking.user_id, &message).await {
                    tracing::warn!(booking_id = %booking.id, error = %e, "notification failed");
                }
                None
            }
            Effect::NotifyCancelled => {
                metrics::counter!("bookings_cancelled").increment(1);
                self.record_duration(booking);
                let message = format!("Booking {} cancelled", booking.id);
                if let Err(e) = self.notifier.notify(booking.user_id, &message).await {
                    tracing::warn!(booking_id = %booking.id, error = %e, "notification failed");
                }
                None
            }
        }
    }

    fn record_duration(&self, booking: &Booking) {
        let elapsed = chrono::Utc::now() - booking.created_at;
        if let Ok(duration) = elapsed.to_std() {
            metrics::histogram!("booking_saga_duration_seconds").record(duration.as_secs_f64());
        }
    }
}
