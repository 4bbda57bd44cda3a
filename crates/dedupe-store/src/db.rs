//! # Database Persistence Layer
//!
//! PostgreSQL persistence for the name history ledger via SQLx.
//!
//! ## Architecture
//!
//! The database is **optional**. When `DATABASE_URL` is set, associations
//! are written to the `unique_files` table and survive restarts. When
//! absent, the in-memory ledger is used (development and tests).
//!
//! "Latest" queries order by the `BIGSERIAL` primary key, so concurrent
//! appends that share a timestamp are still totally ordered.

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::error::LedgerError;
use crate::ledger::{Ledger, NewUniqueFile, UniqueFileRecord};

/// Initialize the database connection pool and run migrations.
///
/// Returns `None` if `DATABASE_URL` is not set (in-memory-only mode).
/// Returns `Err` if the URL is set but the connection or migration fails.
pub async fn init_pool() -> Result<Option<PgPool>, sqlx::Error> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => return Ok(None),
    };

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(&url)
        .await?;

    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(Some(pool))
}

/// Ledger backed by the `unique_files` table.
#[derive(Debug, Clone)]
pub struct PgLedger {
    pool: PgPool,
}

impl PgLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl Ledger for PgLedger {
    async fn append(&self, record: NewUniqueFile) -> Result<UniqueFileRecord, LedgerError> {
        let row = sqlx::query_as::<_, UniqueFileRow>(
            "INSERT INTO unique_files (name, original_name)
             VALUES ($1, $2)
             RETURNING id, name, original_name, created_at",
        )
        .bind(&record.name)
        .bind(&record.original_name)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_record())
    }

    async fn latest_by_original_name(
        &self,
        original_name: &str,
    ) -> Result<Option<UniqueFileRecord>, LedgerError> {
        let row = sqlx::query_as::<_, UniqueFileRow>(
            "SELECT id, name, original_name, created_at
             FROM unique_files WHERE original_name = $1
             ORDER BY id DESC LIMIT 1",
        )
        .bind(original_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UniqueFileRow::into_record))
    }

    async fn latest_by_unique_name(
        &self,
        name: &str,
    ) -> Result<Option<UniqueFileRecord>, LedgerError> {
        let row = sqlx::query_as::<_, UniqueFileRow>(
            "SELECT id, name, original_name, created_at
             FROM unique_files WHERE name = $1
             ORDER BY id DESC LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UniqueFileRow::into_record))
    }
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct UniqueFileRow {
    id: i64,
    name: String,
    original_name: String,
    created_at: DateTime<Utc>,
}

impl UniqueFileRow {
    fn into_record(self) -> UniqueFileRecord {
        UniqueFileRecord {
            id: self.id,
            name: self.name,
            original_name: self.original_name,
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Runs only when `DATABASE_URL` points at a disposable database.
    async fn test_ledger() -> Option<(PgLedger, PgPool)> {
        let pool = init_pool().await.expect("connect and migrate test database")?;
        Some((PgLedger::new(pool.clone()), pool))
    }

    async fn cleanup(pool: &PgPool, original_name: &str) {
        let _ = sqlx::query("DELETE FROM unique_files WHERE original_name = $1")
            .bind(original_name)
            .execute(pool)
            .await;
    }

    #[tokio::test]
    async fn latest_by_original_name_follows_sequence() {
        let Some((ledger, pool)) = test_ledger().await else {
            return;
        };
        let original = format!("img/{}.png", uuid::Uuid::new_v4());

        let first = ledger
            .append(NewUniqueFile::new("img/aaa.png", original.clone()))
            .await
            .unwrap();
        let second = ledger
            .append(NewUniqueFile::new("img/000.png", original.clone()))
            .await
            .unwrap();
        assert!(second.id > first.id);

        // Name order would pick the first record; sequence order picks the second.
        let latest = ledger.latest_by_original_name(&original).await.unwrap().unwrap();
        assert_eq!(latest.id, second.id);
        assert_eq!(latest.name, "img/000.png");

        cleanup(&pool, &original).await;
    }

    #[tokio::test]
    async fn latest_by_unique_name_returns_newest_original() {
        let Some((ledger, pool)) = test_ledger().await else {
            return;
        };
        let tag = uuid::Uuid::new_v4();
        let unique = format!("docs/{tag}.txt");
        let a = format!("docs/a-{tag}.txt");
        let b = format!("docs/b-{tag}.txt");

        ledger.append(NewUniqueFile::new(unique.clone(), b.clone())).await.unwrap();
        ledger.append(NewUniqueFile::new(unique.clone(), a.clone())).await.unwrap();

        let latest = ledger.latest_by_unique_name(&unique).await.unwrap().unwrap();
        assert_eq!(latest.original_name, a);
        assert!(ledger
            .latest_by_original_name(&format!("missing-{tag}"))
            .await
            .unwrap()
            .is_none());

        cleanup(&pool, &a).await;
        cleanup(&pool, &b).await;
    }
}
