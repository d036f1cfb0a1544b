//! Integration tests for the PostgreSQL reservation store.
//!
//! These tests need a running PostgreSQL instance and are ignored by
//! default. Set `DATABASE_URL` and run with `cargo test -- --ignored`.

use common::{BookingId, Money};
use reservation::{EventRecord, OccupyOutcome, PostgresReservationStore, ReservationStore};
use sqlx::postgres::PgPoolOptions;

async fn connect() -> PostgresReservationStore {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for postgres tests");
    let pool = PgPoolOptions::new()
        .max_connections(4)
        .connect(&url)
        .await
        .expect("failed to connect to postgres");
    let store = PostgresReservationStore::new(pool);
    store.init_schema().await.expect("failed to init schema");
    store
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_catalog_roundtrip() {
    let store = connect().await;
    let event = EventRecord::new("Concert", Money::from_cents(2000), 3);

    store.create_event(event.clone()).await.unwrap();

    let found = store.get_event(event.id).await.unwrap().unwrap();
    assert_eq!(found.name, "Concert");
    assert_eq!(found.price, Money::from_cents(2000));
    assert_eq!(found.total_slots, 3);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_occupy_is_capacity_guarded() {
    let store = connect().await;
    let event = EventRecord::new("Workshop", Money::from_cents(500), 1);
    store.create_event(event.clone()).await.unwrap();

    assert_eq!(
        store
            .occupy_slot(event.id, BookingId::new(), 1)
            .await
            .unwrap(),
        OccupyOutcome::Occupied
    );
    assert_eq!(
        store
            .occupy_slot(event.id, BookingId::new(), 1)
            .await
            .unwrap(),
        OccupyOutcome::NoSlotAvailable
    );
    assert_eq!(store.occupied_count(event.id).await.unwrap(), 1);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_release_is_idempotent() {
    let store = connect().await;
    let event = EventRecord::new("Meetup", Money::from_cents(100), 2);
    store.create_event(event.clone()).await.unwrap();
    let booking_id = BookingId::new();

    store.occupy_slot(event.id, booking_id, 2).await.unwrap();
    store.release_slot(event.id, booking_id).await.unwrap();
    store.release_slot(event.id, booking_id).await.unwrap();

    assert_eq!(store.occupied_count(event.id).await.unwrap(), 0);
}
