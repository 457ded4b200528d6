//! SQLite repository adapter.
#![allow(clippy::collapsible_if)]

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

use fx_types::{
    CurrencyReferenceRow, DateWindow, ProviderCode, RateObservation, RateRepository,
    ReferenceRepository, RepoError, StoredRate, UpsertOutcome,
};

use crate::types::sqlite_rows::{DbRate, DbReference};
use crate::types::{db_err, write_err};

const MIGRATION: &str = include_str!("../migrations/0001_create_currency_tables.sql");

const RATE_COLUMNS: &str = "currency_key, rate_date, unit_count, rate, rate_change, updated_at";

fn date_text(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Repository
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite repository implementation.
pub struct SqliteRepo {
    pool: SqlitePool,
}

impl SqliteRepo {
    /// Creates a new SQLite repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            let path = path.split('?').next().unwrap_or(path);
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let in_memory = database_url.contains(":memory:");
        let mut pool_options = SqlitePoolOptions::new().max_connections(if in_memory { 1 } else { 8 });
        if in_memory {
            // An in-memory database vanishes with its last connection.
            pool_options = pool_options.idle_timeout(None).max_lifetime(None);
        }
        let pool = pool_options.connect_with(options).await?;

        sqlx::query(MIGRATION).execute(&pool).await?;
        tracing::debug!(in_memory, "sqlite schema ready");

        Ok(Self { pool })
    }

    async fn fetch_reference(
        &self,
        country: &str,
        currency_name: &str,
    ) -> Result<Option<CurrencyReferenceRow>, RepoError> {
        let row: Option<DbReference> = sqlx::query_as(
            r#"SELECT country, currency_name, iso_code, numeric_code FROM currency_reference
               WHERE country = ? AND currency_name = ?"#,
        )
        .bind(country)
        .bind(currency_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(DbReference::into_domain).transpose()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rate store
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl RateRepository for SqliteRepo {
    async fn get_rate(
        &self,
        key: ProviderCode,
        date: NaiveDate,
    ) -> Result<Option<StoredRate>, RepoError> {
        let row: Option<DbRate> = sqlx::query_as(&format!(
            "SELECT {} FROM currency_rate WHERE currency_key = ? AND rate_date = ?",
            RATE_COLUMNS
        ))
        .bind(i64::from(key.value()))
        .bind(date_text(date))
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(DbRate::into_domain).transpose()
    }

    async fn insert_rate(
        &self,
        key: ProviderCode,
        obs: &RateObservation,
    ) -> Result<StoredRate, RepoError> {
        let now = Utc::now();

        sqlx::query(
            r#"INSERT INTO currency_rate (currency_key, rate_date, unit_count, rate, rate_change, updated_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(i64::from(key.value()))
        .bind(date_text(obs.date))
        .bind(i64::from(obs.unit_count))
        .bind(obs.rate.normalize().to_string())
        .bind(obs.change.normalize().to_string())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| write_err(e, format!("{}/{}", key, obs.date)))?;

        Ok(StoredRate::from_parts(key, obs.clone(), now))
    }

    async fn update_rate(
        &self,
        key: ProviderCode,
        date: NaiveDate,
        obs: &RateObservation,
    ) -> Result<StoredRate, RepoError> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"UPDATE currency_rate SET unit_count = ?, rate = ?, rate_change = ?, updated_at = ?
               WHERE currency_key = ? AND rate_date = ?"#,
        )
        .bind(i64::from(obs.unit_count))
        .bind(obs.rate.normalize().to_string())
        .bind(obs.change.normalize().to_string())
        .bind(now.to_rfc3339())
        .bind(i64::from(key.value()))
        .bind(date_text(date))
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }

        let stored = RateObservation { date, ..obs.clone() };
        Ok(StoredRate::from_parts(key, stored, now))
    }

    async fn list_rates(&self, key: Option<ProviderCode>) -> Result<Vec<StoredRate>, RepoError> {
        let rows: Vec<DbRate> = match key {
            Some(key) => sqlx::query_as(&format!(
                "SELECT {} FROM currency_rate WHERE currency_key = ? ORDER BY rate_date ASC",
                RATE_COLUMNS
            ))
            .bind(i64::from(key.value()))
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?,
            None => sqlx::query_as(&format!(
                "SELECT {} FROM currency_rate ORDER BY rate_date ASC, currency_key ASC",
                RATE_COLUMNS
            ))
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?,
        };

        rows.into_iter().map(DbRate::into_domain).collect()
    }

    async fn list_rates_in_window(
        &self,
        key: ProviderCode,
        window: DateWindow,
    ) -> Result<Vec<StoredRate>, RepoError> {
        let rows: Vec<DbRate> = sqlx::query_as(&format!(
            r#"SELECT {} FROM currency_rate
               WHERE currency_key = ? AND rate_date >= ? AND rate_date <= ?
               ORDER BY rate_date ASC"#,
            RATE_COLUMNS
        ))
        .bind(i64::from(key.value()))
        .bind(date_text(window.start()))
        .bind(date_text(window.end()))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(DbRate::into_domain).collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Reference store
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl ReferenceRepository for SqliteRepo {
    async fn upsert_reference(
        &self,
        row: &CurrencyReferenceRow,
    ) -> Result<UpsertOutcome, RepoError> {
        let now = Utc::now().to_rfc3339();

        if self
            .fetch_reference(&row.country, &row.currency_name)
            .await?
            .is_none()
        {
            let inserted = sqlx::query(
                r#"INSERT INTO currency_reference (country, currency_name, iso_code, numeric_code, updated_at)
                   VALUES (?, ?, ?, ?, ?)
                   ON CONFLICT (country, currency_name) DO NOTHING"#,
            )
            .bind(&row.country)
            .bind(&row.currency_name)
            .bind(&row.iso_code)
            .bind(row.numeric_code.map(i64::from))
            .bind(&now)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

            if inserted.rows_affected() == 1 {
                return Ok(UpsertOutcome::Inserted);
            }
        }

        // Either present before, or inserted concurrently by another writer.
        let result = sqlx::query(
            r#"UPDATE currency_reference SET iso_code = ?, numeric_code = ?, updated_at = ?
               WHERE country = ? AND currency_name = ?
                 AND (iso_code <> ? OR numeric_code IS NOT ?)"#,
        )
        .bind(&row.iso_code)
        .bind(row.numeric_code.map(i64::from))
        .bind(&now)
        .bind(&row.country)
        .bind(&row.currency_name)
        .bind(&row.iso_code)
        .bind(row.numeric_code.map(i64::from))
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(if result.rows_affected() == 0 {
            UpsertOutcome::Unchanged
        } else {
            UpsertOutcome::Updated
        })
    }

    async fn list_references(&self) -> Result<Vec<CurrencyReferenceRow>, RepoError> {
        let rows: Vec<DbReference> = sqlx::query_as(
            r#"SELECT country, currency_name, iso_code, numeric_code FROM currency_reference
               ORDER BY country ASC, currency_name ASC"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(DbReference::into_domain).collect()
    }
}
