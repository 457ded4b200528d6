//! Outbound data source ports.
//!
//! Implementations can be HTTP clients, simulated sources, test scripts, etc.

use std::time::Duration;

use crate::domain::{DateWindow, RawRateRow, RawReferenceRow};
use fx_directory::ProviderCode;

/// Error type for fetch operations.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Fetch exceeded {}s", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("Source unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

/// Port for the exchange-rate archive.
#[async_trait::async_trait]
pub trait RateSource: Send + Sync {
    /// Returns the raw rate rows published for `code` within `window`.
    async fn fetch_rates(
        &self,
        code: ProviderCode,
        window: DateWindow,
    ) -> Result<Vec<RawRateRow>, FetchError>;
}

/// Port for the country/currency reference table.
#[async_trait::async_trait]
pub trait ReferenceSource: Send + Sync {
    async fn fetch_reference_table(&self) -> Result<Vec<RawReferenceRow>, FetchError>;
}
