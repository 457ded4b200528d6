//! PostgreSQL repository adapter.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::PgPool;

use fx_types::{
    CurrencyReferenceRow, DateWindow, ProviderCode, RateObservation, RateRepository,
    ReferenceRepository, RepoError, StoredRate, UpsertOutcome,
};

use crate::types::pg_rows::{DbRate, DbReference};
use crate::types::{db_err, write_err};

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL Repository
// ─────────────────────────────────────────────────────────────────────────────

/// PostgreSQL repository implementation.
pub struct PostgresRepo {
    pool: PgPool,
}

/// Executes SQL statements from a migration file, splitting by semicolons.
async fn execute_migration(pool: &PgPool, sql: &str, name: &str) -> Result<(), anyhow::Error> {
    for statement in sql.split(';') {
        let stmt = statement.trim();
        if !stmt.is_empty() {
            sqlx::query(stmt)
                .execute(pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration {} failed: {}", name, e))?;
        }
    }
    Ok(())
}

async fn run_migrations(pool: &PgPool) -> Result<(), anyhow::Error> {
    execute_migration(
        pool,
        include_str!("../migrations/0001_create_currency_tables_pg.sql"),
        "0001",
    )
    .await
}

impl PostgresRepo {
    /// Creates a new PostgreSQL repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        run_migrations(&pool).await?;
        tracing::debug!("postgres schema ready");
        Ok(Self { pool })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rate store
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl RateRepository for PostgresRepo {
    async fn get_rate(
        &self,
        key: ProviderCode,
        date: NaiveDate,
    ) -> Result<Option<StoredRate>, RepoError> {
        let row: Option<DbRate> = sqlx::query_as(
            r#"SELECT currency_key, rate_date, unit_count, rate, rate_change, updated_at
               FROM currency_rate WHERE currency_key = $1 AND rate_date = $2"#,
        )
        .bind(i64::from(key.value()))
        .bind(date)
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
        let row: DbRate = sqlx::query_as(
            r#"INSERT INTO currency_rate (currency_key, rate_date, unit_count, rate, rate_change, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING currency_key, rate_date, unit_count, rate, rate_change, updated_at"#,
        )
        .bind(i64::from(key.value()))
        .bind(obs.date)
        .bind(i64::from(obs.unit_count))
        .bind(obs.rate)
        .bind(obs.change)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_err(e, format!("{}/{}", key, obs.date)))?;

        row.into_domain()
    }

    async fn update_rate(
        &self,
        key: ProviderCode,
        date: NaiveDate,
        obs: &RateObservation,
    ) -> Result<StoredRate, RepoError> {
        let row: Option<DbRate> = sqlx::query_as(
            r#"UPDATE currency_rate SET unit_count = $1, rate = $2, rate_change = $3, updated_at = $4
               WHERE currency_key = $5 AND rate_date = $6
               RETURNING currency_key, rate_date, unit_count, rate, rate_change, updated_at"#,
        )
        .bind(i64::from(obs.unit_count))
        .bind(obs.rate)
        .bind(obs.change)
        .bind(Utc::now())
        .bind(i64::from(key.value()))
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.ok_or(RepoError::NotFound)?.into_domain()
    }

    async fn list_rates(&self, key: Option<ProviderCode>) -> Result<Vec<StoredRate>, RepoError> {
        let rows: Vec<DbRate> = sqlx::query_as(
            r#"SELECT currency_key, rate_date, unit_count, rate, rate_change, updated_at
               FROM currency_rate
               WHERE $1::BIGINT IS NULL OR currency_key = $1
               ORDER BY rate_date ASC, currency_key ASC"#,
        )
        .bind(key.map(|k| i64::from(k.value())))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(DbRate::into_domain).collect()
    }

    async fn list_rates_in_window(
        &self,
        key: ProviderCode,
        window: DateWindow,
    ) -> Result<Vec<StoredRate>, RepoError> {
        let rows: Vec<DbRate> = sqlx::query_as(
            r#"SELECT currency_key, rate_date, unit_count, rate, rate_change, updated_at
               FROM currency_rate
               WHERE currency_key = $1 AND rate_date BETWEEN $2 AND $3
               ORDER BY rate_date ASC"#,
        )
        .bind(i64::from(key.value()))
        .bind(window.start())
        .bind(window.end())
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
impl ReferenceRepository for PostgresRepo {
    async fn upsert_reference(
        &self,
        row: &CurrencyReferenceRow,
    ) -> Result<UpsertOutcome, RepoError> {
        // xmax = 0 only for freshly inserted tuples; the WHERE clause leaves
        // identical rows untouched so they return nothing.
        let outcome: Option<(bool,)> = sqlx::query_as(
            r#"INSERT INTO currency_reference (country, currency_name, iso_code, numeric_code, updated_at)
               VALUES ($1, $2, $3, $4, NOW())
               ON CONFLICT (country, currency_name) DO UPDATE
                 SET iso_code = EXCLUDED.iso_code,
                     numeric_code = EXCLUDED.numeric_code,
                     updated_at = NOW()
                 WHERE currency_reference.iso_code IS DISTINCT FROM EXCLUDED.iso_code
                    OR currency_reference.numeric_code IS DISTINCT FROM EXCLUDED.numeric_code
               RETURNING (xmax = 0) AS inserted"#,
        )
        .bind(&row.country)
        .bind(&row.currency_name)
        .bind(&row.iso_code)
        .bind(row.numeric_code)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(match outcome {
            Some((true,)) => UpsertOutcome::Inserted,
            Some((false,)) => UpsertOutcome::Updated,
            None => UpsertOutcome::Unchanged,
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

        Ok(rows.into_iter().map(DbReference::into_domain).collect())
    }
}
