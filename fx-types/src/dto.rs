//! Data Transfer Objects (DTOs) for requests and responses.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{CurrencyReferenceRow, DateWindow, ParseFailure, StoredRate};
use crate::error::DomainError;
use fx_directory::ProviderCode;

// ─────────────────────────────────────────────────────────────────────────────
// Sync DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// A calendar date as accepted by the API.
///
/// Either an ISO `YYYY-MM-DD` string (also `DD.MM.YYYY`) or separate parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum DateInput {
    Text(String),
    Parts { day: u32, month: u32, year: i32 },
}

impl DateInput {
    pub fn to_date(&self) -> Result<NaiveDate, DomainError> {
        match self {
            DateInput::Text(s) => crate::domain::rate::parse_rate_date(s),
            DateInput::Parts { day, month, year } => NaiveDate::from_ymd_opt(*year, *month, *day)
                .ok_or_else(|| {
                    DomainError::Validation(format!(
                        "invalid date {:02}.{:02}.{}",
                        day, month, year
                    ))
                }),
        }
    }
}

impl From<NaiveDate> for DateInput {
    fn from(date: NaiveDate) -> Self {
        DateInput::Text(date.format("%Y-%m-%d").to_string())
    }
}

/// Request to synchronize one currency over a date window.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SyncRequest {
    /// Country or currency display name
    #[schema(example = "Euro")]
    pub country: String,
    pub start_date: DateInput,
    pub end_date: DateInput,
}

/// Counters of what a synchronization did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SyncSummary {
    #[schema(example = 3)]
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    /// Rate rows that failed to parse
    pub skipped: usize,
    pub reference_upserted: usize,
    /// Reference rows that failed validation
    pub reference_skipped: usize,
}

/// Response after a synchronization.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SyncResponse {
    #[schema(example = "Euro")]
    pub country: String,
    pub provider_code: ProviderCode,
    pub window: DateWindow,
    pub summary: SyncSummary,
    pub parse_failures: Vec<ParseFailure>,
    pub reference_rows: Vec<CurrencyReferenceRow>,
    /// Stored rates for the window, ordered by date
    pub rate_rows: Vec<StoredRate>,
    /// Handle of the rendered chart, absent when rendering failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_id: Option<Uuid>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Query DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Filter for listing stored rates.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RatesQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_code: Option<ProviderCode>,
}
