//! # FX Hex
//!
//! Application service layer and adapters for the FX rate sync service.
//!
//! ## Architecture
//!
//! - `service` - Synchronization service (orchestrates the stages)
//! - `reconcile` - Per-currency rate reconciliation
//! - `reports` - In-memory archive of rendered charts
//! - `inbound/` - HTTP adapter (Axum server)
//! - `outbound/` - Rate/reference sources and the chart renderer
//!
//! The service is generic over `R: Repository`, allowing different store
//! implementations to be injected.

pub mod inbound;
pub mod openapi;
pub mod outbound;
pub mod reconcile;
pub mod reports;
pub mod service;

#[cfg(test)]
mod service_tests;

pub use reconcile::{ReconcileResult, Reconciler};
pub use reports::{ReportArchive, ReportArtifact};
pub use service::{DEFAULT_FETCH_TIMEOUT, ReferenceSummary, SyncService};
