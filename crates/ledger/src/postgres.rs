//! PostgreSQL-backed ledger store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{Money, OperationToken, UserId};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::entry::{EntryStatus, LedgerEntry};
use crate::error::{LedgerError, Result};
use crate::store::LedgerStore;

/// PostgreSQL-backed ledger store.
///
/// The idempotency protocol maps onto two guarded statements: the reserve
/// insert is absorbed by the `(user_id, token)` primary key, and the commit
/// update only matches a row that is still pending. `rows_affected`
/// reports whether the conditional write took effect.
#[derive(Clone)]
pub struct PostgresLedgerStore {
    pool: PgPool,
}

impl PostgresLedgerStore {
    /// Creates a new PostgreSQL ledger store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the ledger table if it does not exist.
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS ledger_entries (
                user_id    UUID        NOT NULL,
                token      UUID        NOT NULL,
                delta      BIGINT      NOT NULL DEFAULT 0,
                status     TEXT        NOT NULL DEFAULT 'pending',
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                PRIMARY KEY (user_id, token)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    fn row_to_entry(row: PgRow) -> Result<LedgerEntry> {
        let status: String = row.try_get("status")?;
        let status = status
            .parse::<EntryStatus>()
            .map_err(|e| LedgerError::Database(sqlx::Error::Decode(e.into())))?;

        Ok(LedgerEntry {
            user_id: UserId::from_uuid(row.try_get::<Uuid, _>("user_id")?),
            token: OperationToken::from_uuid(row.try_get::<Uuid, _>("token")?),
            delta: Money::from_cents(row.try_get("delta")?),
            status,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        })
    }
}

#[async_trait]
impl LedgerStore for PostgresLedgerStore {
    async fn insert_pending(&self, user_id: UserId, token: OperationToken) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO ledger_entries (user_id, token, delta, status)
            VALUES ($1, $2, 0, 'pending')
            ON CONFLICT (user_id, token) DO NOTHING
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(token.as_uuid())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn commit_entry(
        &self,
        user_id: UserId,
        token: OperationToken,
        delta: Money,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE ledger_entries
            SET delta = $3, status = 'committed'
            WHERE user_id = $1 AND token = $2 AND status = 'pending'
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(token.as_uuid())
        .bind(delta.cents())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn balance(&self, user_id: UserId) -> Result<Money> {
        let cents: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(delta), 0)
            FROM ledger_entries
            WHERE user_id = $1 AND status = 'committed'
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(Money::from_cents(cents))
    }

    async fn entries_for_user(&self, user_id: UserId) -> Result<Vec<LedgerEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT user_id, token, delta, status, created_at
            FROM ledger_entries
            WHERE user_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_entry).collect()
    }
}
