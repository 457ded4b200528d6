//! Repository port traits.
//!
//! Adapters (Postgres, SQLite, in-memory mocks) implement these traits.

use chrono::NaiveDate;

use crate::domain::{CurrencyReferenceRow, DateWindow, RateObservation, StoredRate, UpsertOutcome};
use crate::error::RepoError;
use fx_directory::ProviderCode;

/// Keyed persistence of rate observations.
///
/// At most one row exists per `(currency_key, date)`. Implementations must
/// surface a uniqueness violation as `RepoError::DuplicateKey` rather than
/// storing a second row.
#[async_trait::async_trait]
pub trait RateRepository: Send + Sync + 'static {
    /// Gets the stored observation for one key and day.
    async fn get_rate(
        &self,
        key: ProviderCode,
        date: NaiveDate,
    ) -> Result<Option<StoredRate>, RepoError>;

    /// Inserts a new observation. Fails with `DuplicateKey` if the day is already stored.
    async fn insert_rate(
        &self,
        key: ProviderCode,
        obs: &RateObservation,
    ) -> Result<StoredRate, RepoError>;

    /// Overwrites the values stored for `(key, date)`. Fails with `NotFound` if absent.
    async fn update_rate(
        &self,
        key: ProviderCode,
        date: NaiveDate,
        obs: &RateObservation,
    ) -> Result<StoredRate, RepoError>;

    /// Lists stored rates ordered by date ascending (then key), optionally for one key.
    async fn list_rates(&self, key: Option<ProviderCode>) -> Result<Vec<StoredRate>, RepoError>;

    /// Lists stored rates of one key inside a window, ordered by date ascending.
    async fn list_rates_in_window(
        &self,
        key: ProviderCode,
        window: DateWindow,
    ) -> Result<Vec<StoredRate>, RepoError>;
}

/// Upsert-by-natural-key persistence of the currency reference table.
#[async_trait::async_trait]
pub trait ReferenceRepository: Send + Sync + 'static {
    /// Inserts or updates the row keyed by `(country, currency_name)`.
    async fn upsert_reference(&self, row: &CurrencyReferenceRow)
    -> Result<UpsertOutcome, RepoError>;

    /// Lists all reference rows ordered by country, then currency name.
    async fn list_references(&self) -> Result<Vec<CurrencyReferenceRow>, RepoError>;
}

/// Both stores behind one handle.
pub trait Repository: RateRepository + ReferenceRepository {}

impl<T: RateRepository + ReferenceRepository> Repository for T {}
