//! Deterministic development source.
//!
//! Serves rate rows and a reference table without network access. Rates
//! wander around each currency's nominal base rate; the value for a given
//! (currency, day) is always the same, so repeated syncs are idempotent.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Weekday};
use rand::{Rng, SeedableRng, rngs::StdRng};
use rust_decimal::Decimal;

use fx_types::{
    DateWindow, FetchError, ProviderCode, ProviderCurrency, RateSource, RawRateRow,
    RawReferenceRow, ReferenceSource,
};

/// (country, currency name, ISO code, numeric code)
const REFERENCE_TABLE: &[(&str, &str, &str, &str)] = &[
    ("Armenia", "Armenian Dram", "AMD", "051"),
    ("Australia", "Australian Dollar", "AUD", "036"),
    ("Austria", "Euro", "EUR", "978"),
    ("Azerbaijan", "Azerbaijan Manat", "AZN", "944"),
    ("Belarus", "Belarusian Ruble", "BYN", "933"),
    ("Brazil", "Brazilian Real", "BRL", "986"),
    ("Canada", "Canadian Dollar", "CAD", "124"),
    ("China", "Yuan Renminbi", "CNY", "156"),
    ("Czechia", "Czech Koruna", "CZK", "203"),
    ("Denmark", "Danish Krone", "DKK", "208"),
    ("France", "Euro", "EUR", "978"),
    ("Georgia", "Lari", "GEL", "981"),
    ("Germany", "Euro", "EUR", "978"),
    ("Hong Kong", "Hong Kong Dollar", "HKD", "344"),
    ("India", "Indian Rupee", "INR", "356"),
    ("Japan", "Yen", "JPY", "392"),
    ("Kazakhstan", "Tenge", "KZT", "398"),
    ("Norway", "Norwegian Krone", "NOK", "578"),
    ("Poland", "Zloty", "PLN", "985"),
    ("Sweden", "Swedish Krona", "SEK", "752"),
    ("Switzerland", "Swiss Franc", "CHF", "756"),
    ("Turkey", "Turkish Lira", "TRY", "949"),
    ("United Kingdom", "Pound Sterling", "GBP", "826"),
    ("United States", "US Dollar", "USD", "840"),
    ("Zimbabwe", "US Dollar", "USD", "840"),
    ("Zimbabwe", "Zimbabwe Gold", "ZWG", "924"),
    ("Antarctica", "No universal currency", "", ""),
];

/// Offline stand-in for both the rate archive and the reference table.
#[derive(Debug, Clone, Default)]
pub struct SimulatedSource;

impl SimulatedSource {
    pub fn new() -> Self {
        Self
    }

    fn publishes_on(date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
    }

    fn previous_publication(date: NaiveDate) -> Option<NaiveDate> {
        let mut day = date.pred_opt()?;
        while !Self::publishes_on(day) {
            day = day.pred_opt()?;
        }
        Some(day)
    }

    /// Rate for `code` on `date`, within ±3% of the base rate.
    fn rate_on(code: ProviderCode, base: Decimal, date: NaiveDate) -> Decimal {
        let seed =
            (u64::from(code.value()) << 32) | u64::from(date.num_days_from_ce().unsigned_abs());
        let mut rng = StdRng::seed_from_u64(seed);
        let drift_bp: i64 = rng.random_range(-300..=300);
        (base + base * Decimal::new(drift_bp, 4)).round_dp(4)
    }

    fn row(code: ProviderCode, date: NaiveDate) -> RawRateRow {
        let currency = ProviderCurrency::from_provider_code(code);
        let base = currency.map(|c| c.base_rate()).unwrap_or(Decimal::ONE);
        let units = currency.map(|c| c.unit_count()).unwrap_or(1);

        let rate = Self::rate_on(code, base, date);
        let change = Self::previous_publication(date)
            .map(|prev| rate - Self::rate_on(code, base, prev))
            .unwrap_or(Decimal::ZERO);

        RawRateRow::new(
            date.format("%d.%m.%Y").to_string(),
            units.to_string(),
            format!("{:.4}", rate).replace('.', ","),
            format!("{:+.4}", change).replace('.', ","),
        )
    }
}

#[async_trait]
impl RateSource for SimulatedSource {
    async fn fetch_rates(
        &self,
        code: ProviderCode,
        window: DateWindow,
    ) -> Result<Vec<RawRateRow>, FetchError> {
        Ok(window
            .days()
            .filter(|d| Self::publishes_on(*d))
            .map(|d| Self::row(code, d))
            .collect())
    }
}

#[async_trait]
impl ReferenceSource for SimulatedSource {
    async fn fetch_reference_table(&self) -> Result<Vec<RawReferenceRow>, FetchError> {
        Ok(REFERENCE_TABLE
            .iter()
            .map(|(country, name, iso, numeric)| RawReferenceRow::new(*country, *name, *iso, *numeric))
            .collect())
    }
}
