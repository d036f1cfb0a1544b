//! PostgreSQL-backed reservation store.

use async_trait::async_trait;
use common::{BookingId, EventId, Money};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::error::Result;
use crate::event::EventRecord;
use crate::store::{OccupyOutcome, ReservationStore};

/// PostgreSQL-backed reservation store.
///
/// The occupy insert carries its own capacity guard: the row is only
/// written while the live record count is below the event's capacity, and
/// the unique `(event_id, booking_id)` key absorbs duplicate holds. Both
/// conditions are evaluated inside a single statement, so concurrent
/// attempts at the last slot serialize in the database.
#[derive(Clone)]
pub struct PostgresReservationStore {
    pool: PgPool,
}

impl PostgresReservationStore {
    /// Creates a new PostgreSQL reservation store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the catalog and occupancy tables if they do not exist.
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS events (
                id          UUID   PRIMARY KEY,
                event_name  TEXT   NOT NULL,
                price       BIGINT NOT NULL,
                total_slots INT    NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS slots (
                event_id   UUID NOT NULL,
                booking_id UUID NOT NULL,
                PRIMARY KEY (event_id, booking_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn row_to_event(row: PgRow) -> Result<EventRecord> {
        Ok(EventRecord {
            id: EventId::from_uuid(row.try_get::<Uuid, _>("id")?),
            name: row.try_get("event_name")?,
            price: Money::from_cents(row.try_get("price")?),
            total_slots: row.try_get::<i32, _>("total_slots")? as u32,
        })
    }
}

#[async_trait]
impl ReservationStore for PostgresReservationStore {
    async fn create_event(&self, event: EventRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO events (id, event_name, price, total_slots)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(event.id.as_uuid())
        .bind(&event.name)
        .bind(event.price.cents())
        .bind(event.total_slots as i32)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_event(&self, event_id: EventId) -> Result<Option<EventRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, event_name, price, total_slots
            FROM events
            WHERE id = $1
            "#,
        )
        .bind(event_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_event).transpose()
    }

    async fn list_events(&self) -> Result<Vec<EventRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, event_name, price, total_slots
            FROM events
            ORDER BY event_name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_event).collect()
    }

    async fn occupy_slot(
        &self,
        event_id: EventId,
        booking_id: BookingId,
        capacity: u32,
    ) -> Result<OccupyOutcome> {
        let mut tx = self.pool.begin().await?;

        // Serialize concurrent attempts on the same event by taking the
        // catalog row's lock; the capacity check and the insert then run
        // as one conditional write.
        sqlx::query("SELECT 1 FROM events WHERE id = $1 FOR UPDATE")
            .bind(event_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await?;

        let held: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(SELECT 1 FROM slots WHERE event_id = $1 AND booking_id = $2)
            "#,
        )
        .bind(event_id.as_uuid())
        .bind(booking_id.as_uuid())
        .fetch_one(&mut *tx)
        .await?;
        if held {
            tx.commit().await?;
            return Ok(OccupyOutcome::AlreadyHeld);
        }

        let occupied: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM slots WHERE event_id = $1
            "#,
        )
        .bind(event_id.as_uuid())
        .fetch_one(&mut *tx)
        .await?;
        if occupied >= capacity as i64 {
            tx.commit().await?;
            return Ok(OccupyOutcome::NoSlotAvailable);
        }

        sqlx::query(
            r#"
            INSERT INTO slots (event_id, booking_id) VALUES ($1, $2)
            "#,
        )
        .bind(event_id.as_uuid())
        .bind(booking_id.as_uuid())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(OccupyOutcome::Occupied)
    }

    async fn release_slot(&self, event_id: EventId, booking_id: BookingId) -> Result<()> {
        sqlx::query(
            r#"
            DELETE FROM slots WHERE event_id = $1 AND booking_id = $2
            "#,
        )
        .bind(event_id.as_uuid())
        .bind(booking_id.as_uuid())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn occupied_count(&self, event_id: EventId) -> Result<u32> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM slots WHERE event_id = $1
            "#,
        )
        .bind(event_id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(count as u32)
    }
}
