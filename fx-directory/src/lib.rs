//! Currency Directory with Macro-Based Currency Table
//!
//! Maps the display names users type (English or Russian) to the numeric
//! currency identifiers used by the rate archive provider. The built-in table
//! is declared once with the `define_provider_currencies!` macro, which
//! generates the `ProviderCurrency` enum and its lookup tables.
//!
//! A `CurrencyDirectory` is built once at startup, optionally extended with a
//! JSON override map, and then shared read-only.
//!
//! # Example
//! ```
//! use fx_directory::{CurrencyDirectory, ProviderCode};
//!
//! let directory = CurrencyDirectory::builtin();
//! assert_eq!(directory.resolve("Euro").unwrap(), ProviderCode::new(52170));
//! assert_eq!(directory.resolve("  евро ").unwrap(), ProviderCode::new(52170));
//! assert!(directory.resolve("Atlantis Drachma").is_err());
//! ```

use std::collections::HashMap;
use std::fmt;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

// ─────────────────────────────────────────────────────────────────────────────
// Provider Code
// ─────────────────────────────────────────────────────────────────────────────

/// The rate provider's numeric identifier for a currency.
///
/// This is distinct from the ISO 4217 numeric code: the provider assigns its
/// own ids (e.g. `52170` for the Euro). Every stored rate row is scoped by it.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    serde::Serialize,
    serde::Deserialize,
    utoipa::ToSchema,
)]
#[serde(transparent)]
pub struct ProviderCode(u32);

impl ProviderCode {
    pub const fn new(code: u32) -> Self {
        Self(code)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ProviderCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ProviderCode {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("Currency not found in directory: {0}")]
    NotFound(String),

    #[error("Invalid currency map: {0}")]
    InvalidMap(String),
}

// ─────────────────────────────────────────────────────────────────────────────
// THE MACRO: Defines the provider currency table
// ─────────────────────────────────────────────────────────────────────────────

/// Macro to define provider currencies with generated lookup tables.
///
/// # Syntax
/// ```ignore
/// define_provider_currencies! {
///     ISO => (provider_code, "English name", "Russian name", unit_count, base_rate_e4),
/// }
/// ```
///
/// `base_rate_e4` is a nominal rouble rate per `unit_count` units, scaled by
/// 10^4. It only seeds the simulated development source.
#[macro_export]
macro_rules! define_provider_currencies {
    (
        $(
            $iso:ident => ($code:literal, $english:literal, $russian:literal, $units:expr, $base_e4:expr)
        ),* $(,)?
    ) => {
        /// Currencies published by the rate archive provider.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
        #[allow(clippy::upper_case_acronyms)]
        pub enum ProviderCurrency {
            $($iso),*
        }

        impl ProviderCurrency {
            pub fn provider_code(&self) -> ProviderCode {
                match self {
                    $(ProviderCurrency::$iso => ProviderCode::new($code)),*
                }
            }

            pub fn iso_code(&self) -> &'static str {
                match self {
                    $(ProviderCurrency::$iso => stringify!($iso)),*
                }
            }

            pub fn english_name(&self) -> &'static str {
                match self {
                    $(ProviderCurrency::$iso => $english),*
                }
            }

            pub fn russian_name(&self) -> &'static str {
                match self {
                    $(ProviderCurrency::$iso => $russian),*
                }
            }

            /// How many foreign units the published rate is quoted for.
            pub fn unit_count(&self) -> u32 {
                match self {
                    $(ProviderCurrency::$iso => $units),*
                }
            }

            pub fn base_rate(&self) -> Decimal {
                match self {
                    $(ProviderCurrency::$iso => Decimal::new($base_e4, 4)),*
                }
            }

            pub fn all() -> &'static [ProviderCurrency] {
                &[$(ProviderCurrency::$iso),*]
            }

            pub fn from_provider_code(code: ProviderCode) -> Option<ProviderCurrency> {
                match code.value() {
                    $($code => Some(ProviderCurrency::$iso),)*
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for ProviderCurrency {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.iso_code())
            }
        }

        impl std::str::FromStr for ProviderCurrency {
            type Err = String;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_uppercase().as_str() {
                    $(stringify!($iso) => Ok(ProviderCurrency::$iso),)*
                    _ => Err(format!("Unknown currency: {}", s)),
                }
            }
        }
    };
}

// ─────────────────────────────────────────────────────────────────────────────
// CURRENCY DEFINITIONS
// ─────────────────────────────────────────────────────────────────────────────

define_provider_currencies! {
    USD => (52148, "US Dollar", "Доллар США", 1, 896_883),
    EUR => (52170, "Euro", "Евро", 1, 973_779),
    GBP => (52146, "Pound Sterling", "Фунт стерлингов", 1, 1_142_128),
    CHF => (52133, "Swiss Franc", "Швейцарский франк", 1, 1_052_210),
    AUD => (52182, "Australian Dollar", "Австралийский доллар", 1, 598_100),
    AZN => (52180, "Azerbaijani Manat", "Азербайджанский манат", 1, 527_600),
    AMD => (52187, "Armenian Dram", "Армянский драм", 100, 221_800),
    BYN => (52200, "Belarusian Ruble", "Белорусский рубль", 1, 276_000),
    BGN => (52197, "Bulgarian Lev", "Болгарский лев", 1, 498_000),
    BRL => (52174, "Brazilian Real", "Бразильский реал", 1, 184_000),
    HUF => (52236, "Hungarian Forint", "Венгерский форинт", 100, 259_000),
    KRW => (52074, "South Korean Won", "Вона Республики Корея", 1000, 690_000),
    VND => (52124, "Vietnamese Dong", "Вьетнамский донг", 10000, 369_000),
    HKD => (52235, "Hong Kong Dollar", "Гонконгский доллар", 1, 114_700),
    GEL => (52172, "Georgian Lari", "Грузинский лари", 1, 334_000),
    DKK => (52215, "Danish Krone", "Датская крона", 1, 130_600),
    AED => (52139, "UAE Dirham", "Дирхам ОАЭ", 1, 244_200),
    EGP => (52145, "Egyptian Pound", "Египетский фунт", 10, 290_000),
    INR => (52238, "Indian Rupee", "Индийская рупия", 10, 107_800),
    IDR => (52239, "Indonesian Rupiah", "Индонезийская рупия", 10000, 576_000),
    KZT => (52247, "Kazakhstani Tenge", "Казахстанский тенге", 100, 196_000),
    CAD => (52202, "Canadian Dollar", "Канадский доллар", 1, 668_000),
    QAR => (52115, "Qatari Riyal", "Катарский риал", 1, 246_400),
    KGS => (52075, "Kyrgyzstani Som", "Киргизский сом", 10, 100_500),
    CNY => (52207, "Chinese Yuan Renminbi", "Китайский юань Жэньминьби", 1, 125_500),
    LVL => (52079, "Latvian Lats", "Латвийский лат", 1, 490_000),
    LTL => (52082, "Lithuanian Litas", "Литовский лит", 1, 125_000),
    MDL => (52093, "Moldovan Leu", "Молдавский лей", 10, 506_000),
    NZD => (52103, "New Zealand Dollar", "Новозеландский доллар", 1, 555_000),
    TMT => (52141, "New Turkmenistan Manat", "Новый туркменский манат", 1, 256_000),
    NOK => (52106, "Norwegian Krone", "Норвежская крона", 10, 876_000),
    PLN => (52173, "Polish Zloty", "Польский злотый", 1, 226_000),
    RON => (52157, "Romanian Leu", "Румынский лей", 1, 196_000),
    XDR => (52164, "Special Drawing Rights", "СДР (спец. прав заим-я)", 1, 1_195_000),
    RSD => (52178, "Serbian Dinar", "Сербский динар", 100, 830_000),
    SGD => (52122, "Singapore Dollar", "Сингапурский доллар", 1, 674_000),
    TJS => (52168, "Tajikistani Somoni", "Таджикский сомони", 10, 818_000),
    THB => (52136, "Thai Baht", "Тайландский бат", 10, 256_000),
    TRY => (52158, "Turkish Lira", "Турецкая лира", 10, 301_000),
    UZS => (52150, "Uzbekistani Som", "Узбекский сум", 10000, 726_000),
    UAH => (52171, "Ukrainian Hryvnia", "Украинская гривна", 10, 237_000),
    CZK => (52214, "Czech Koruna", "Чешская крона", 10, 399_000),
    SEK => (52132, "Swedish Krona", "Шведская крона", 10, 886_000),
    EEK => (52220, "Estonian Kroon", "Эстонская крона", 10, 620_000),
    ZAR => (52127, "South African Rand", "Южноафриканский рэнд", 10, 486_000),
    JPY => (52246, "Japanese Yen", "Японская йена", 100, 629_000),
}

// ─────────────────────────────────────────────────────────────────────────────
// Directory
// ─────────────────────────────────────────────────────────────────────────────

/// One resolvable currency with every name it answers to.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct DirectoryEntry {
    pub provider_code: ProviderCode,
    /// ISO 4217 alphabetic code, when the currency is part of the built-in table
    #[schema(example = "EUR")]
    pub iso_code: Option<String>,
    #[schema(example = json!(["Euro", "Евро"]))]
    pub names: Vec<String>,
}

/// Immutable name → provider code lookup.
#[derive(Debug, Clone)]
pub struct CurrencyDirectory {
    by_name: HashMap<String, ProviderCode>,
    entries: Vec<DirectoryEntry>,
}

fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

impl CurrencyDirectory {
    /// Directory over the built-in provider table.
    pub fn builtin() -> Self {
        Self::from_entries(ProviderCurrency::all().iter().map(|c| DirectoryEntry {
            provider_code: c.provider_code(),
            iso_code: Some(c.iso_code().to_string()),
            names: vec![c.english_name().to_string(), c.russian_name().to_string()],
        }))
    }

    pub fn from_entries(entries: impl IntoIterator<Item = DirectoryEntry>) -> Self {
        let mut directory = Self {
            by_name: HashMap::new(),
            entries: Vec::new(),
        };
        for entry in entries {
            directory.insert(entry);
        }
        directory
    }

    /// Extends the directory with `{ "display name": provider_code }` pairs.
    ///
    /// A name that already exists is re-pointed at the new code.
    pub fn with_overrides(mut self, overrides: HashMap<String, u32>) -> Self {
        let mut names: Vec<_> = overrides.into_iter().collect();
        names.sort();
        for (name, code) in names {
            let code = ProviderCode::new(code);
            for entry in &mut self.entries {
                entry.names.retain(|n| normalize_name(n) != normalize_name(&name));
            }
            self.entries.retain(|e| !e.names.is_empty());
            match self.entries.iter_mut().find(|e| e.provider_code == code) {
                Some(entry) => {
                    entry.names.push(name.clone());
                    self.by_name.insert(normalize_name(&name), code);
                }
                None => self.insert(DirectoryEntry {
                    provider_code: code,
                    iso_code: None,
                    names: vec![name],
                }),
            }
        }
        self
    }

    /// Parses a JSON object of overrides and applies it on top of the built-in table.
    pub fn builtin_with_json_overrides(json: &str) -> Result<Self, DirectoryError> {
        let overrides: HashMap<String, u32> =
            serde_json::from_str(json).map_err(|e| DirectoryError::InvalidMap(e.to_string()))?;
        if let Some(name) = overrides.keys().find(|k| k.trim().is_empty()) {
            return Err(DirectoryError::InvalidMap(format!(
                "empty currency name {:?}",
                name
            )));
        }
        Ok(Self::builtin().with_overrides(overrides))
    }

    fn insert(&mut self, entry: DirectoryEntry) {
        for name in &entry.names {
            self.by_name.insert(normalize_name(name), entry.provider_code);
        }
        self.entries.push(entry);
    }

    /// Resolves a display name to the provider code.
    ///
    /// Matching ignores case and surrounding/repeated whitespace.
    pub fn resolve(&self, name: &str) -> Result<ProviderCode, DirectoryError> {
        self.by_name
            .get(&normalize_name(name))
            .copied()
            .ok_or_else(|| DirectoryError::NotFound(name.trim().to_string()))
    }

    pub fn entry(&self, code: ProviderCode) -> Option<&DirectoryEntry> {
        self.entries.iter().find(|e| e.provider_code == code)
    }

    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CurrencyDirectory {
    fn default() -> Self {
        Self::builtin()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Provider Calendar
// ─────────────────────────────────────────────────────────────────────────────

/// Date range the rate archive can answer for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderCalendar {
    pub earliest: NaiveDate,
    pub latest: NaiveDate,
}

impl ProviderCalendar {
    /// The archive starts with the first official rates of 1 July 1992.
    pub fn archive_start() -> NaiveDate {
        NaiveDate::from_ymd_opt(1992, 7, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Calendar ending today (UTC); the archive never publishes future dates.
    pub fn current() -> Self {
        Self {
            earliest: Self::archive_start(),
            latest: Utc::now().date_naive(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.earliest <= date && date <= self.latest
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
