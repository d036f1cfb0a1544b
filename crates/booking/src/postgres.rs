//! PostgreSQL-backed booking store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{BookingId, EventId, Money, UserId};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::error::{BookingError, Result};
use crate::record::Booking;
use crate::status::BookingStatus;
use crate::store::BookingStore;

/// PostgreSQL-backed booking store.
#[derive(Clone)]
pub struct PostgresBookingStore {
    pool: PgPool,
}

impl PostgresBookingStore {
    /// Creates a new PostgreSQL booking store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the bookings table if it does not exist.
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS bookings (
                id         UUID        PRIMARY KEY,
                user_id    UUID        NOT NULL,
                event_id   UUID        NOT NULL,
                price      BIGINT,
                status     TEXT        NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    fn row_to_booking(row: PgRow) -> Result<Booking> {
        let status: String = row.try_get("status")?;
        // A status value outside the closed enum is data corruption, not a
        // state to drive the saga from; surface it before the driver runs.
        let status = status
            .parse::<BookingStatus>()
            .map_err(|e| BookingError::Database(sqlx::Error::Decode(e.into())))?;

        Ok(Booking {
            id: BookingId::from_uuid(row.try_get::<Uuid, _>("id")?),
            user_id: UserId::from_uuid(row.try_get::<Uuid, _>("user_id")?),
            event_id: EventId::from_uuid(row.try_get::<Uuid, _>("event_id")?),
            price: row.try_get::<Option<i64>, _>("price")?.map(Money::from_cents),
            status,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        })
    }
}

#[async_trait]
impl BookingStore for PostgresBookingStore {
    async fn insert(&self, booking: &Booking) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO bookings (id, user_id, event_id, price, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(booking.id.as_uuid())
        .bind(booking.user_id.as_uuid())
        .bind(booking.event_id.as_uuid())
        .bind(booking.price.map(|p| p.cents()))
        .bind(booking.status.as_str())
        .bind(booking.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, booking_id: BookingId) -> Result<Option<Booking>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, event_id, price, status, created_at
            FROM bookings
            WHERE id = $1
            "#,
        )
        .bind(booking_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_booking).transpose()
    }

    async fn list(&self) -> Result<Vec<Booking>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, event_id, price, status, created_at
            FROM bookings
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_booking).collect()
    }

    async fn set_status(&self, booking_id: BookingId, status: BookingStatus) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE bookings SET status = $2 WHERE id = $1
            "#,
        )
        .bind(booking_id.as_uuid())
        .bind(status.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(BookingError::NotFound(booking_id));
        }
        Ok(())
    }

    async fn set_price(&self, booking_id: BookingId, price: Money) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE bookings SET price = $2 WHERE id = $1
            "#,
        )
        .bind(booking_id.as_uuid())
        .bind(price.cents())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(BookingError::NotFound(booking_id));
        }
        Ok(())
    }
}
