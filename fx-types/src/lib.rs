//! # FX Types
//!
//! Domain types and port traits for the FX rate synchronization service.
//! This crate has ZERO external IO dependencies - only data structures,
//! validation rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (rate observations, reference rows, date windows)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for API boundaries
//! - `error/` - Domain and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    CurrencyReferenceRow, DateWindow, ParseFailure, RateObservation, RawRateRow,
    RawReferenceRow, StoredRate, UpsertOutcome,
};
pub use dto::*;
pub use error::{AppError, DomainError, RepoError};
pub use fx_directory::{
    CurrencyDirectory, DirectoryEntry, DirectoryError, ProviderCalendar, ProviderCode,
    ProviderCurrency,
};
pub use ports::{
    FetchError, RateRepository, RateSource, ReferenceRepository, ReferenceSource, RenderedReport,
    ReportError, ReportRenderer, Repository,
};
