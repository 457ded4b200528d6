//! HTTP data sources.
//!
//! Both sources talk to a scraping sidecar that exposes the archive pages as
//! JSON rows. The rate endpoint takes the archive's own query parameters:
//! `cur` (provider code) and `bd/bm/by`, `ed/em/ey` (window start and end as
//! day, month, year).

use async_trait::async_trait;
use chrono::Datelike;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use fx_types::{
    DateWindow, FetchError, ProviderCode, RateSource, RawRateRow, RawReferenceRow,
    ReferenceSource,
};

fn unavailable(e: reqwest::Error) -> FetchError {
    FetchError::Unavailable(e.to_string())
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, FetchError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(FetchError::Unavailable(format!(
            "HTTP {}: {}",
            status.as_u16(),
            body.chars().take(200).collect::<String>()
        )));
    }
    let bytes = resp.bytes().await.map_err(unavailable)?;
    serde_json::from_slice(&bytes).map_err(|e| FetchError::InvalidPayload(e.to_string()))
}

/// Query parameters of the archive's rate table.
pub fn rate_query(code: ProviderCode, window: DateWindow) -> Vec<(&'static str, String)> {
    let (start, end) = (window.start(), window.end());
    vec![
        ("cur", code.to_string()),
        ("bd", start.day().to_string()),
        ("bm", start.month().to_string()),
        ("by", start.year().to_string()),
        ("ed", end.day().to_string()),
        ("em", end.month().to_string()),
        ("ey", end.year().to_string()),
    ]
}

// ─────────────────────────────────────────────────────────────────────────────
// Rate source
// ─────────────────────────────────────────────────────────────────────────────

/// Rate archive reached over HTTP.
pub struct HttpRateSource {
    url: String,
    http: Client,
}

impl HttpRateSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http: Client::new(),
        }
    }
}

#[async_trait]
impl RateSource for HttpRateSource {
    #[tracing::instrument(skip(self), fields(url = %self.url))]
    async fn fetch_rates(
        &self,
        code: ProviderCode,
        window: DateWindow,
    ) -> Result<Vec<RawRateRow>, FetchError> {
        let resp = self
            .http
            .get(&self.url)
            .query(&rate_query(code, window))
            .send()
            .await
            .map_err(unavailable)?;
        let rows: Vec<RawRateRow> = decode(resp).await?;
        tracing::debug!(rows = rows.len(), "fetched rate rows");
        Ok(rows)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Reference source
// ─────────────────────────────────────────────────────────────────────────────

/// Currency reference table reached over HTTP.
pub struct HttpReferenceSource {
    url: String,
    http: Client,
}

impl HttpReferenceSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http: Client::new(),
        }
    }
}

#[async_trait]
impl ReferenceSource for HttpReferenceSource {
    #[tracing::instrument(skip(self), fields(url = %self.url))]
    async fn fetch_reference_table(&self) -> Result<Vec<RawReferenceRow>, FetchError> {
        let resp = self.http.get(&self.url).send().await.map_err(unavailable)?;
        let rows: Vec<RawReferenceRow> = decode(resp).await?;
        tracing::debug!(rows = rows.len(), "fetched reference rows");
        Ok(rows)
    }
}
