//! Currency reference table domain model.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::DomainError;

/// A reference row exactly as the reference source published it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RawReferenceRow {
    #[schema(example = "Germany")]
    pub country: String,
    #[schema(example = "Euro")]
    pub currency_name: String,
    #[schema(example = "EUR")]
    pub iso_code: String,
    #[schema(example = "978")]
    pub numeric_code: String,
}

impl RawReferenceRow {
    pub fn new(
        country: impl Into<String>,
        currency_name: impl Into<String>,
        iso_code: impl Into<String>,
        numeric_code: impl Into<String>,
    ) -> Self {
        Self {
            country: country.into(),
            currency_name: currency_name.into(),
            iso_code: iso_code.into(),
            numeric_code: numeric_code.into(),
        }
    }
}

/// One (country, currency) pairing of the reference table.
///
/// Identity is `(country, currency_name)`; a country may list several
/// currencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CurrencyReferenceRow {
    #[schema(example = "Germany")]
    pub country: String,
    #[schema(example = "Euro")]
    pub currency_name: String,
    /// ISO 4217 alphabetic code; empty when the source publishes none
    #[schema(example = "EUR")]
    pub iso_code: String,
    /// ISO 4217 numeric code
    #[schema(example = 978)]
    pub numeric_code: Option<i32>,
}

fn is_placeholder(s: &str) -> bool {
    matches!(s, "" | "-" | "\u{2014}" | "\u{2013}")
}

impl CurrencyReferenceRow {
    /// Trims and validates a raw row.
    ///
    /// # Validation
    /// - Country and currency name cannot be empty
    /// - ISO code, when present, must be three ASCII letters
    /// - Numeric code, when present, must be a non-negative integer
    pub fn from_raw(raw: &RawReferenceRow) -> Result<Self, DomainError> {
        let country = raw.country.trim();
        let currency_name = raw.currency_name.trim();
        if country.is_empty() {
            return Err(DomainError::Validation("country cannot be empty".into()));
        }
        if currency_name.is_empty() {
            return Err(DomainError::Validation(format!(
                "currency name cannot be empty (country {})",
                country
            )));
        }

        let iso = raw.iso_code.trim();
        let iso_code = if is_placeholder(iso) {
            String::new()
        } else if iso.len() == 3 && iso.chars().all(|c| c.is_ascii_alphabetic()) {
            iso.to_ascii_uppercase()
        } else {
            return Err(DomainError::Validation(format!(
                "invalid ISO code {:?} for {}",
                iso, country
            )));
        };

        let numeric = raw.numeric_code.trim();
        let numeric_code = if is_placeholder(numeric) {
            None
        } else {
            match numeric.parse::<i32>() {
                Ok(n) if n >= 0 => Some(n),
                _ => {
                    return Err(DomainError::Validation(format!(
                        "invalid numeric code {:?} for {}",
                        numeric, country
                    )));
                }
            }
        };

        Ok(Self {
            country: country.to_string(),
            currency_name: currency_name.to_string(),
            iso_code,
            numeric_code,
        })
    }
}

/// What an upsert did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpsertOutcome {
    Inserted,
    Updated,
    Unchanged,
}
