//! # FX Sync Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Initialize the repository adapter
//! - Build the currency directory and upstream sources
//! - Create the sync service
//! - Start the HTTP server

mod config;

use std::sync::Arc;

use opentelemetry::global;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace as sdktrace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fx_hex::{
    SyncService,
    inbound::HttpServer,
    outbound::{HttpRateSource, HttpReferenceSource, SimulatedSource, SvgChartRenderer},
};
use fx_repo::build_repo;
use fx_types::{CurrencyDirectory, RateSource, ReferenceSource};

use config::Config;

fn init_tracer() -> anyhow::Result<(sdktrace::Tracer, sdktrace::SdkTracerProvider)> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // Use gRPC exporter with batch processing (non-blocking)
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()?;

    let provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    global::set_tracer_provider(provider.clone());

    use opentelemetry::trace::TracerProvider as _;
    Ok((provider.tracer("fx-sync"), provider))
}

fn load_directory(config: &Config) -> anyhow::Result<CurrencyDirectory> {
    match &config.currency_map_path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("reading {}: {}", path.display(), e))?;
            let directory = CurrencyDirectory::builtin_with_json_overrides(&json)?;
            tracing::info!(path = %path.display(), entries = directory.len(), "loaded currency map overrides");
            Ok(directory)
        }
        None => Ok(CurrencyDirectory::builtin()),
    }
}

fn build_sources(config: &Config) -> (Arc<dyn RateSource>, Arc<dyn ReferenceSource>) {
    let simulated = Arc::new(SimulatedSource::new());

    let rates: Arc<dyn RateSource> = match &config.rate_source_url {
        Some(url) => {
            tracing::info!(url = %url, "using HTTP rate source");
            Arc::new(HttpRateSource::new(url.clone()))
        }
        None => {
            tracing::warn!("RATE_SOURCE_URL not set, serving simulated rates");
            simulated.clone()
        }
    };

    let reference: Arc<dyn ReferenceSource> = match &config.reference_source_url {
        Some(url) => {
            tracing::info!(url = %url, "using HTTP reference source");
            Arc::new(HttpReferenceSource::new(url.clone()))
        }
        None => {
            tracing::warn!("REFERENCE_SOURCE_URL not set, serving simulated reference table");
            simulated
        }
    };

    (rates, reference)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Export traces only when a collector is configured
    let otel = if std::env::var_os("OTEL_EXPORTER_OTLP_ENDPOINT").is_some() {
        Some(init_tracer()?)
    } else {
        None
    };
    let telemetry = otel
        .as_ref()
        .map(|(tracer, _)| tracing_opentelemetry::layer().with_tracer(tracer.clone()));

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,fx_app=debug,fx_hex=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(telemetry)
        .init();

    // Load configuration
    let config = Config::from_env()?;

    tracing::info!("Starting FX sync server on port {}", config.port);
    tracing::info!("Using database: {}", config::redact_url(&config.database_url));

    // Build repository (handles connection and migration)
    let repo = build_repo(&config.database_url).await?;

    let directory = Arc::new(load_directory(&config)?);
    let (rate_source, reference_source) = build_sources(&config);

    // Create the sync service
    let service = SyncService::new(
        repo,
        directory,
        rate_source,
        reference_source,
        Arc::new(SvgChartRenderer::new()),
    )
    .with_fetch_timeout(config.fetch_timeout);

    // Create and run the HTTP server
    let server = HttpServer::with_rate_limit(service, config.rate_limit_per_minute);
    let addr = format!("0.0.0.0:{}", config.port);

    server.run(&addr).await?;

    // Ensure traces are flushed before exit
    if let Some((_, provider)) = otel {
        let _ = provider.shutdown();
    }
    Ok(())
}
