//! Domain models for the FX rate synchronization service.

pub mod rate;
pub mod reference;
pub mod window;

pub use rate::{ParseFailure, RateObservation, RawRateRow, StoredRate};
pub use reference::{CurrencyReferenceRow, RawReferenceRow, UpsertOutcome};
pub use window::DateWindow;
