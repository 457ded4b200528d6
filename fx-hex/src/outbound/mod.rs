//! Outbound Adapters
//!
//! Implementations of the source and renderer ports.

mod chart;
mod http;
mod simulated;

pub use chart::SvgChartRenderer;
pub use http::{HttpRateSource, HttpReferenceSource, rate_query};
pub use simulated::SimulatedSource;
