//! HTTP Inbound Adapter
//!
//! Axum-based HTTP server that drives the synchronization service.

mod extract;
mod handlers;
mod rate_limit;
mod server;

pub use extract::{ApiJson, ApiQuery};
pub use handlers::{ApiError, AppState};
pub use rate_limit::RateLimiterState;
pub use server::HttpServer;
