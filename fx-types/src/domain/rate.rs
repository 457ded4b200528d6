//! Exchange-rate observation domain model.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::DomainError;
use fx_directory::ProviderCode;

/// A rate row exactly as the rate source published it.
///
/// All fields are unparsed text; the reconciliation engine validates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RawRateRow {
    #[schema(example = "02.01.2024")]
    pub date: String,
    #[schema(example = "1")]
    pub unit_count: String,
    #[schema(example = "99,1919")]
    pub rate: String,
    #[schema(example = "+1,2345")]
    pub change: String,
}

impl RawRateRow {
    pub fn new(
        date: impl Into<String>,
        unit_count: impl Into<String>,
        rate: impl Into<String>,
        change: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            unit_count: unit_count.into(),
            rate: rate.into(),
            change: change.into(),
        }
    }
}

/// One published exchange rate for one calendar day.
///
/// `rate` is the price in roubles of `unit_count` foreign units; `change` is
/// the delta against the previous publication as stated by the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RateObservation {
    #[schema(value_type = String, example = "2024-01-02")]
    pub date: NaiveDate,
    #[schema(example = 1)]
    pub unit_count: u32,
    #[schema(value_type = String, example = "99.1919")]
    pub rate: Decimal,
    #[schema(value_type = String, example = "1.2345")]
    pub change: Decimal,
}

impl RateObservation {
    /// Creates a validated observation.
    ///
    /// # Validation
    /// - `unit_count` must be positive
    /// - `rate` must be positive
    /// - `rate` and `change` must fit the store: at most [`MAX_SCALE`]
    ///   fractional digits and an absolute value below 10^[`MAX_INTEGER_DIGITS`]
    pub fn new(
        date: NaiveDate,
        unit_count: u32,
        rate: Decimal,
        change: Decimal,
    ) -> Result<Self, DomainError> {
        if unit_count == 0 {
            return Err(DomainError::Validation("unit count must be positive".into()));
        }
        if rate <= Decimal::ZERO {
            return Err(DomainError::Validation(format!(
                "rate must be positive, got {}",
                rate
            )));
        }
        Ok(Self {
            date,
            unit_count,
            rate: check_stored_shape(rate.normalize(), "rate")?,
            change: check_stored_shape(change.normalize(), "change")?,
        })
    }

    /// Parses a raw published row.
    pub fn parse(raw: &RawRateRow) -> Result<Self, DomainError> {
        let date = parse_rate_date(&raw.date)?;
        let unit_count = parse_unit_count(&raw.unit_count)?;
        let rate = parse_decimal(&raw.rate, "rate")?;
        let change = parse_change(&raw.change)?;
        Self::new(date, unit_count, rate, change)
    }

    /// True when every value field matches; the date is the identity and is not compared.
    pub fn same_values(&self, other: &RateObservation) -> bool {
        self.unit_count == other.unit_count && self.rate == other.rate && self.change == other.change
    }
}

/// A rate observation as held by the rate store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StoredRate {
    pub currency_key: ProviderCode,
    #[schema(value_type = String, example = "2024-01-02")]
    pub date: NaiveDate,
    pub unit_count: u32,
    #[schema(value_type = String, example = "99.1919")]
    pub rate: Decimal,
    #[schema(value_type = String, example = "1.2345")]
    pub change: Decimal,
    /// When the row was last written (ISO 8601)
    #[schema(value_type = String, example = "2024-01-02T10:00:00Z")]
    pub updated_at: DateTime<Utc>,
}

impl StoredRate {
    /// Reconstructs a stored row from database fields.
    pub fn from_parts(
        currency_key: ProviderCode,
        observation: RateObservation,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            currency_key,
            date: observation.date,
            unit_count: observation.unit_count,
            rate: observation.rate,
            change: observation.change,
            updated_at,
        }
    }

    pub fn observation(&self) -> RateObservation {
        RateObservation {
            date: self.date,
            unit_count: self.unit_count,
            rate: self.rate,
            change: self.change,
        }
    }
}

/// A fetched row that could not be parsed, kept with its raw payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ParseFailure {
    pub raw: RawRateRow,
    #[schema(example = "invalid date \"32.01.2024\"")]
    pub reason: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Field parsers
// ─────────────────────────────────────────────────────────────────────────────

/// Parses `DD.MM.YYYY` (as published) or ISO `YYYY-MM-DD`.
pub fn parse_rate_date(s: &str) -> Result<NaiveDate, DomainError> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%d.%m.%Y")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .map_err(|_| DomainError::Validation(format!("invalid date {:?}", s)))
}

fn strip_spacing(s: &str) -> String {
    // char::is_whitespace covers the NBSP used as a thousands separator.
    s.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == '\u{2212}' { '-' } else { c })
        .collect()
}

fn parse_unit_count(s: &str) -> Result<u32, DomainError> {
    let cleaned = strip_spacing(s);
    match cleaned.parse::<u32>() {
        Ok(0) | Err(_) => Err(DomainError::Validation(format!(
            "invalid unit count {:?}",
            s.trim()
        ))),
        Ok(n) => Ok(n),
    }
}

/// Fractional digits a stored rate or change may carry.
pub const MAX_SCALE: u32 = 6;
/// Integer digits a stored rate or change may carry.
pub const MAX_INTEGER_DIGITS: u32 = 14;

/// Rejects values the rate store could not hold exactly.
///
/// Stores keep `NUMERIC(20, 6)`; anything finer would be rounded on write and
/// compare unequal on the next sync.
fn check_stored_shape(value: Decimal, field: &str) -> Result<Decimal, DomainError> {
    if value.scale() > MAX_SCALE {
        return Err(DomainError::Validation(format!(
            "{} {} has more than {} decimal places",
            field, value, MAX_SCALE
        )));
    }
    if value.abs() >= Decimal::from(10_i64.pow(MAX_INTEGER_DIGITS)) {
        return Err(DomainError::Validation(format!(
            "{} {} exceeds {} integer digits",
            field, value, MAX_INTEGER_DIGITS
        )));
    }
    Ok(value)
}

/// Parses a decimal written with either `,` or `.` as the separator.
pub fn parse_decimal(s: &str, field: &str) -> Result<Decimal, DomainError> {
    let cleaned = strip_spacing(s).replace(',', ".");
    let cleaned = cleaned.strip_prefix('+').unwrap_or(&cleaned);
    if cleaned.is_empty() {
        return Err(DomainError::Validation(format!("missing {}", field)));
    }
    Decimal::from_str(cleaned)
        .map_err(|_| DomainError::Validation(format!("invalid {} {:?}", field, s.trim())))
}

fn parse_change(s: &str) -> Result<Decimal, DomainError> {
    match strip_spacing(s).as_str() {
        "" | "-" | "\u{2014}" | "\u{2013}" => Ok(Decimal::ZERO),
        _ => parse_decimal(s, "change"),
    }
}
