//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use fx_types::{
    CurrencyReferenceRow, DateInput, DateWindow, DirectoryEntry, ParseFailure, ProviderCode,
    RawRateRow, StoredRate, SyncRequest, SyncResponse, SyncSummary,
};
use utoipa::OpenApi;

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy"}))
    )
)]
async fn health() {}

/// Synchronize one currency over a date window
#[utoipa::path(
    post,
    path = "/api/sync",
    tag = "sync",
    request_body = SyncRequest,
    responses(
        (status = 200, description = "Window reconciled", body = SyncResponse),
        (status = 400, description = "Malformed date"),
        (status = 404, description = "Unknown country or currency"),
        (status = 422, description = "Window reversed or outside the archive calendar"),
        (status = 502, description = "Upstream source unavailable"),
        (status = 504, description = "Upstream source timed out")
    )
)]
async fn sync() {}

/// List the currency directory
#[utoipa::path(
    get,
    path = "/api/currencies",
    tag = "directory",
    responses(
        (status = 200, description = "Known currencies", body = Vec<DirectoryEntry>)
    )
)]
async fn list_currencies() {}

/// List the stored currency reference table
#[utoipa::path(
    get,
    path = "/api/reference",
    tag = "directory",
    responses(
        (status = 200, description = "Reference rows ordered by country", body = Vec<CurrencyReferenceRow>)
    )
)]
async fn list_reference() {}

/// List stored rates
#[utoipa::path(
    get,
    path = "/api/rates",
    tag = "rates",
    params(
        ("provider_code" = Option<u32>, Query, description = "Restrict to one provider currency code")
    ),
    responses(
        (status = 200, description = "Stored rates ordered by code and date", body = Vec<StoredRate>)
    )
)]
async fn list_rates() {}

/// Fetch a rendered chart
#[utoipa::path(
    get,
    path = "/api/reports/{id}",
    tag = "rates",
    params(
        ("id" = String, Path, description = "Report ID (UUID)")
    ),
    responses(
        (status = 200, description = "SVG chart", content_type = "image/svg+xml", body = String),
        (status = 400, description = "Malformed report ID"),
        (status = 404, description = "Report not found or superseded")
    )
)]
async fn get_report() {}

/// OpenAPI documentation for the FX sync API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "FX Rate Sync API",
        version = "1.0.0",
        description = "Synchronizes historical exchange rates from the provider archive into a local store.\n\nA sync resolves a country or currency name, fetches the window and the currency reference table, reconciles rates by `(provider_code, date)`, and renders a chart retrievable from `/api/reports/{id}`.",
        license(name = "MIT"),
    ),
    paths(
        health,
        sync,
        list_currencies,
        list_reference,
        list_rates,
        get_report,
    ),
    components(
        schemas(
            SyncRequest,
            SyncResponse,
            SyncSummary,
            DateInput,
            DateWindow,
            ParseFailure,
            RawRateRow,
            StoredRate,
            CurrencyReferenceRow,
            DirectoryEntry,
            ProviderCode,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sync", description = "Rate synchronization"),
        (name = "directory", description = "Currency directory and reference table"),
        (name = "rates", description = "Stored rates and charts"),
    )
)]
pub struct ApiDoc;
