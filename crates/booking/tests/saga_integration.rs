//! End-to-end saga tests over real ledger and reservation components.
//!
//! The orchestrator talks to an actual `ReservationPool` and `Ledger`
//! through thin adapters; outcome callbacks flow through channels that the
//! test drains, standing in for the asynchronous delivery between
//! components. No ordering is assumed between a call's acknowledgment and
//! its callback beyond what the channels impose.

use std::sync::Arc;

use async_trait::async_trait;
use booking::{
    BookingStatus, ClientError, InMemoryBookingStore, InMemoryNotifier, LedgerClient,
    Orchestrator, ReservationClient,
};
use common::{BookingId, EventId, Money, OperationToken, UserId};
use ledger::{InMemoryLedgerStore, Ledger, PaymentOutcome, WithdrawOutcome};
use reservation::{
    CallbackError, InMemoryReservationStore, OutcomeSender, ReservationOutcome, ReservationPool,
};
use tokio::sync::mpsc;

/// Delivers reservation outcomes into a channel for the test to drain.
struct ChannelOutcomeSender {
    tx: mpsc::UnboundedSender<ReservationOutcome>,
}

#[async_trait]
impl OutcomeSender for ChannelOutcomeSender {
    async fn send(&self, outcome: ReservationOutcome) -> Result<(), CallbackError> {
        self.tx
            .send(outcome)
            .map_err(|e| CallbackError(e.to_string()))
    }
}

type Pool = ReservationPool<InMemoryReservationStore, ChannelOutcomeSender>;

/// Reservation client backed by the real pool.
struct PoolClient {
    pool: Arc<Pool>,
}

#[async_trait]
impl ReservationClient for PoolClient {
    async fn occupy(
        &self,
        event_id: EventId,
        booking_id: BookingId,
        user_id: UserId,
    ) -> Result<(), ClientError> {
        self.pool
            .occupy(event_id, booking_id, user_id)
            .await
            .map(|_| ())
            .map_err(|e| ClientError(e.to_string()))
    }

    async fn cancel(
        &self,
        event_id: EventId,
        booking_id: BookingId,
        _user_id: UserId,
    ) -> Result<(), ClientError> {
        self.pool
            .cancel(event_id, booking_id)
            .await
            .map_err(|e| ClientError(e.to_string()))
    }
}

/// Ledger client backed by the real ledger; the withdrawal outcome is
/// delivered through the payment callback channel, as the ledger's api
/// surface does.
struct LedgerDirectClient {
    ledger: Arc<Ledger<InMemoryLedgerStore>>,
    tx: mpsc::UnboundedSender<PaymentOutcome>,
}

#[async_trait]
impl LedgerClient for LedgerDirectClient {
    async fn reserve_token(
        &self,
        user_id: UserId,
        token: OperationToken,
    ) -> Result<(), ClientError> {
        self.ledger
            .reserve_token(user_id, token)
            .await
            .map(|_| ())
            .map_err(|e| ClientError(e.to_string()))
    }

    async fn withdraw(
        &self,
        user_id: UserId,
        token: OperationToken,
        amount: Money,
        booking_id: BookingId,
    ) -> Result<(), ClientError> {
        let outcome = self
            .ledger
            .withdraw(user_id, token, amount)
            .await
            .map_err(|e| ClientError(e.to_string()))?;

        let callback = match outcome {
            WithdrawOutcome::Applied => PaymentOutcome::succeeded(booking_id, user_id, amount),
            WithdrawOutcome::InsufficientFunds | WithdrawOutcome::NoMatchingReservation => {
                PaymentOutcome::failed(booking_id, user_id, amount)
            }
        };
        self.tx
            .send(callback)
            .map_err(|e| ClientError(e.to_string()))?;
        Ok(())
    }
}

struct Harness {
    orchestrator: Orchestrator<InMemoryBookingStore, PoolClient, LedgerDirectClient, InMemoryNotifier>,
    pool: Arc<Pool>,
    ledger: Arc<Ledger<InMemoryLedgerStore>>,
    notifier: InMemoryNotifier,
    reservation_rx: mpsc::UnboundedReceiver<ReservationOutcome>,
    payment_rx: mpsc::UnboundedReceiver<PaymentOutcome>,
}

impl Harness {
    fn new() -> Self {
        let (reservation_tx, reservation_rx) = mpsc::unbounded_channel();
        let (payment_tx, payment_rx) = mpsc::unbounded_channel();

        let pool = Arc::new(ReservationPool::new(
            InMemoryReservationStore::new(),
            ChannelOutcomeSender { tx: reservation_tx },
        ));
        let ledger = Arc::new(Ledger::new(InMemoryLedgerStore::new()));
        let notifier = InMemoryNotifier::new();

        let orchestrator = Orchestrator::new(
            InMemoryBookingStore::new(),
            PoolClient { pool: pool.clone() },
            LedgerDirectClient {
                ledger: ledger.clone(),
                tx: payment_tx,
            },
            notifier.clone(),
        );

        Self {
            orchestrator,
            pool,
            ledger,
            notifier,
            reservation_rx,
            payment_rx,
        }
    }

    /// Delivers queued callbacks to the orchestrator until none remain.
    async fn drain_callbacks(&mut self) {
        loop {
            let mut delivered = false;
            while let Ok(outcome) = self.reservation_rx.try_recv() {
                let _ = self.orchestrator.reservation_outcome(outcome).await;
                delivered = true;
            }
            while let Ok(outcome) = self.payment_rx.try_recv() {
                let _ = self.orchestrator.payment_outcome(outcome).await;
                delivered = true;
            }
            if !delivered {
                break;
            }
        }
    }

    async fn deposit(&self, user_id: UserId, amount: Money) {
        let token = OperationToken::new();
        self.ledger.reserve_token(user_id, token).await.unwrap();
        self.ledger.apply(user_id, token, amount).await.unwrap();
    }
}

#[tokio::test]
async fn test_booking_completes_when_funds_cover_price() {
    let mut h = Harness::new();
    let user_id = UserId::new();
    h.deposit(user_id, Money::from_cents(20)).await;
    let event = h
        .pool
        .create_event("Concert", Money::from_cents(20), 1)
        .await
        .unwrap();

    let booking = h
        .orchestrator
        .create_booking(user_id, event.id)
        .await
        .unwrap();
    h.drain_callbacks().await;

    let current = h.orchestrator.get_booking(booking.id).await.unwrap().unwrap();
    assert_eq!(current.status, BookingStatus::Completed);
    assert_eq!(current.price, Some(Money::from_cents(20)));
    assert_eq!(h.ledger.balance(user_id).await.unwrap(), Money::zero());
    assert_eq!(h.pool.occupied_count(event.id).await.unwrap(), 1);
    assert_eq!(h.notifier.messages_for(user_id).len(), 1);
}

#[tokio::test]
async fn test_insufficient_funds_cancels_and_releases_slot() {
    let mut h = Harness::new();
    let user_id = UserId::new();
    let event = h
        .pool
        .create_event("Concert", Money::from_cents(20), 1)
        .await
        .unwrap();

    let booking = h
        .orchestrator
        .create_booking(user_id, event.id)
        .await
        .unwrap();
    h.drain_callbacks().await;

    let current = h.orchestrator.get_booking(booking.id).await.unwrap().unwrap();
    assert_eq!(current.status, BookingStatus::Cancelled);
    assert_eq!(h.ledger.balance(user_id).await.unwrap(), Money::zero());
    // The held slot was released during compensation.
    assert_eq!(h.pool.occupied_count(event.id).await.unwrap(), 0);
    assert!(h.notifier.messages_for(user_id)[0].contains("cancelled"));
}

#[tokio::test]
async fn test_full_event_cancels_second_booking() {
    let mut h = Harness::new();
    let first_user = UserId::new();
    let second_user = UserId::new();
    h.deposit(first_user, Money::from_cents(20)).await;
    h.deposit(second_user, Money::from_cents(20)).await;
    let event = h
        .pool
        .create_event("Concert", Money::from_cents(20), 1)
        .await
        .unwrap();

    let first = h
        .orchestrator
        .create_booking(first_user, event.id)
        .await
        .unwrap();
    h.drain_callbacks().await;
    let second = h
        .orchestrator
        .create_booking(second_user, event.id)
        .await
        .unwrap();
    h.drain_callbacks().await;

    assert_eq!(
        h.orchestrator
            .get_booking(first.id)
            .await
            .unwrap()
            .unwrap()
            .status,
        BookingStatus::Completed
    );
    assert_eq!(
        h.orchestrator
            .get_booking(second.id)
            .await
            .unwrap()
            .unwrap()
            .status,
        BookingStatus::Cancelled
    );
    // The second user's money was never touched.
    assert_eq!(
        h.ledger.balance(second_user).await.unwrap(),
        Money::from_cents(20)
    );
    assert_eq!(h.pool.occupied_count(event.id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_unknown_event_cancels_booking() {
    let mut h = Harness::new();
    let user_id = UserId::new();

    let booking = h
        .orchestrator
        .create_booking(user_id, EventId::new())
        .await
        .unwrap();
    h.drain_callbacks().await;

    let current = h.orchestrator.get_booking(booking.id).await.unwrap().unwrap();
    assert_eq!(current.status, BookingStatus::Cancelled);
    assert!(current.price.is_none());
}

#[tokio::test]
async fn test_replayed_payment_callback_has_no_second_effect() {
    let mut h = Harness::new();
    let user_id = UserId::new();
    h.deposit(user_id, Money::from_cents(40)).await;
    let event = h
        .pool
        .create_event("Concert", Money::from_cents(20), 1)
        .await
        .unwrap();

    let booking = h
        .orchestrator
        .create_booking(user_id, event.id)
        .await
        .unwrap();
    h.drain_callbacks().await;
    assert_eq!(h.ledger.balance(user_id).await.unwrap(), Money::from_cents(20));

    // Replay the success callback after the saga already completed.
    h.orchestrator
        .payment_outcome(PaymentOutcome::succeeded(
            booking.id,
            user_id,
            Money::from_cents(20),
        ))
        .await
        .unwrap();

    let current = h.orchestrator.get_booking(booking.id).await.unwrap().unwrap();
    assert_eq!(current.status, BookingStatus::Completed);
    assert_eq!(h.ledger.balance(user_id).await.unwrap(), Money::from_cents(20));
}

#[tokio::test]
async fn test_cancelled_booking_slot_is_reusable() {
    let mut h = Harness::new();
    let poor_user = UserId::new();
    let funded_user = UserId::new();
    h.deposit(funded_user, Money::from_cents(20)).await;
    let event = h
        .pool
        .create_event("Concert", Money::from_cents(20), 1)
        .await
        .unwrap();

    let failed = h
        .orchestrator
        .create_booking(poor_user, event.id)
        .await
        .unwrap();
    h.drain_callbacks().await;
    assert_eq!(
        h.orchestrator
            .get_booking(failed.id)
            .await
            .unwrap()
            .unwrap()
            .status,
        BookingStatus::Cancelled
    );

    // The released slot can be taken by the next booking.
    let succeeded = h
        .orchestrator
        .create_booking(funded_user, event.id)
        .await
        .unwrap();
    h.drain_callbacks().await;
    assert_eq!(
        h.orchestrator
            .get_booking(succeeded.id)
            .await
            .unwrap()
            .unwrap()
            .status,
        BookingStatus::Completed
    );
}
