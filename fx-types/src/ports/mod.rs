//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The application layer depends on these traits, not concrete implementations.

mod report;
mod repository;
mod source;

pub use report::{RenderedReport, ReportError, ReportRenderer};
pub use repository::{RateRepository, ReferenceRepository, Repository};
pub use source::{FetchError, RateSource, ReferenceSource};
