//! Database row types for SQLite and PostgreSQL.
//!
//! SQLite has no native date or decimal type, so its rows carry text columns;
//! the PostgreSQL rows use `DATE`, `NUMERIC` and `TIMESTAMPTZ`.

use fx_types::{CurrencyReferenceRow, ProviderCode, RateObservation, RepoError, StoredRate};

// ─────────────────────────────────────────────────────────────────────────────
// Conversion helpers
// ─────────────────────────────────────────────────────────────────────────────

pub fn db_err(e: impl std::fmt::Display) -> RepoError {
    RepoError::Database(e.to_string())
}

/// Maps a write error, surfacing unique-constraint violations as `DuplicateKey`.
pub fn write_err(e: sqlx::Error, key: impl std::fmt::Display) -> RepoError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepoError::DuplicateKey(key.to_string())
        }
        _ => db_err(e),
    }
}

pub fn parse_key(raw: i64) -> Result<ProviderCode, RepoError> {
    u32::try_from(raw)
        .map(ProviderCode::new)
        .map_err(|_| RepoError::Database(format!("Invalid currency key: {}", raw)))
}

pub fn parse_unit_count(raw: i64) -> Result<u32, RepoError> {
    u32::try_from(raw).map_err(|_| RepoError::Database(format!("Invalid unit count: {}", raw)))
}

// ─────────────────────────────────────────────────────────────────────────────
// SQLite rows
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "sqlite")]
pub mod sqlite_rows {
    use std::str::FromStr;

    use chrono::{DateTime, NaiveDate, Utc};
    use rust_decimal::Decimal;
    use sqlx::FromRow;

    use super::*;

    /// Rate row from database.
    #[derive(FromRow)]
    pub struct DbRate {
        pub currency_key: i64,
        pub rate_date: String,
        pub unit_count: i64,
        pub rate: String,
        pub rate_change: String,
        pub updated_at: String,
    }

    impl DbRate {
        pub fn into_domain(self) -> Result<StoredRate, RepoError> {
            let date = NaiveDate::parse_from_str(&self.rate_date, "%Y-%m-%d").map_err(db_err)?;
            let rate = Decimal::from_str(&self.rate).map_err(db_err)?;
            let change = Decimal::from_str(&self.rate_change).map_err(db_err)?;
            let obs =
                RateObservation::new(date, parse_unit_count(self.unit_count)?, rate, change)?;
            let updated_at = DateTime::parse_from_rfc3339(&self.updated_at)
                .map_err(db_err)?
                .with_timezone(&Utc);

            Ok(StoredRate::from_parts(
                parse_key(self.currency_key)?,
                obs,
                updated_at,
            ))
        }
    }

    /// Reference row from database.
    #[derive(FromRow)]
    pub struct DbReference {
        pub country: String,
        pub currency_name: String,
        pub iso_code: String,
        pub numeric_code: Option<i64>,
    }

    impl DbReference {
        pub fn into_domain(self) -> Result<CurrencyReferenceRow, RepoError> {
            let numeric_code = self
                .numeric_code
                .map(i32::try_from)
                .transpose()
                .map_err(db_err)?;
            Ok(CurrencyReferenceRow {
                country: self.country,
                currency_name: self.currency_name,
                iso_code: self.iso_code,
                numeric_code,
            })
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL rows
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "postgres")]
pub mod pg_rows {
    use chrono::{DateTime, NaiveDate, Utc};
    use rust_decimal::Decimal;
    use sqlx::FromRow;

    use super::*;

    /// Rate row from database.
    #[derive(FromRow)]
    pub struct DbRate {
        pub currency_key: i64,
        pub rate_date: NaiveDate,
        pub unit_count: i64,
        pub rate: Decimal,
        pub rate_change: Decimal,
        pub updated_at: DateTime<Utc>,
    }

    impl DbRate {
        pub fn into_domain(self) -> Result<StoredRate, RepoError> {
            let obs = RateObservation::new(
                self.rate_date,
                parse_unit_count(self.unit_count)?,
                self.rate,
                self.rate_change,
            )?;
            Ok(StoredRate::from_parts(
                parse_key(self.currency_key)?,
                obs,
                self.updated_at,
            ))
        }
    }

    /// Reference row from database.
    #[derive(FromRow)]
    pub struct DbReference {
        pub country: String,
        pub currency_name: String,
        pub iso_code: String,
        pub numeric_code: Option<i32>,
    }

    impl DbReference {
        pub fn into_domain(self) -> CurrencyReferenceRow {
            CurrencyReferenceRow {
                country: self.country,
                currency_name: self.currency_name,
                iso_code: self.iso_code,
                numeric_code: self.numeric_code,
            }
        }
    }
}
