//! Client example demonstrating a full sync flow against a running server.
//!
//! Run with: cargo run -p fx-app --example client_example

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::NaiveDate;
use fx_client::{ClientError, FxClient};
use fx_hex::{
    SyncService,
    inbound::HttpServer,
    outbound::{SimulatedSource, SvgChartRenderer},
};
use fx_repo::build_repo;
use fx_types::CurrencyDirectory;
use tempfile::tempdir;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt().with_env_filter("info").init();

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr: SocketAddr = listener.local_addr()?;

    // Use a temp file-backed SQLite DB
    let tmp = tempdir()?;
    let db_path = tmp.path().join("fx.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    println!("🚀 Starting server on {addr}...");
    println!("   Database: {db_url}");

    // Build repository (handles connection and migration)
    let repo = build_repo(&db_url).await?;

    let source = Arc::new(SimulatedSource::new());
    let service = SyncService::new(
        repo,
        Arc::new(CurrencyDirectory::builtin()),
        source.clone(),
        source,
        Arc::new(SvgChartRenderer::new()),
    );
    let router = HttpServer::new(service).router();

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router.into_make_service()).await {
            eprintln!("server error: {e}");
        }
    });

    let client = FxClient::new(format!("http://{addr}"));

    // ─────────────────────────────────────────────────────────────────────────
    // Demo: sync, resync, inspect
    // ─────────────────────────────────────────────────────────────────────────

    let health = client.health().await?;
    println!("✅ Server health: {health}");

    let start = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or_else(|| anyhow::anyhow!("bad date"))?;
    let end = NaiveDate::from_ymd_opt(2024, 1, 31).ok_or_else(|| anyhow::anyhow!("bad date"))?;

    let first = client.sync("Euro", start, end).await?;
    println!(
        "✅ First sync of {} (code {}): {} inserted, {} reference rows",
        first.country,
        first.provider_code,
        first.summary.inserted,
        first.reference_rows.len()
    );

    let second = client.sync("Euro", start, end).await?;
    println!(
        "✅ Resync: {} inserted, {} updated, {} unchanged",
        second.summary.inserted, second.summary.updated, second.summary.unchanged
    );

    match client.sync("Atlantis", start, end).await {
        Err(ClientError::Api { status, kind, .. }) => {
            println!("✅ Unknown country rejected: {status} {kind}")
        }
        other => anyhow::bail!("expected an API error, got {:?}", other.map(|r| r.summary)),
    }

    if let Some(id) = second.report_id {
        let (content_type, bytes) = client.report(id).await?;
        let out = tmp.path().join("euro.svg");
        tokio::fs::write(&out, &bytes).await?;
        println!("✅ Chart {id}: {content_type}, {} bytes", bytes.len());
    }

    let rates = client.rates(Some(first.provider_code)).await?;
    println!("\n📋 Stored Euro rates:");
    for rate in rates.iter().take(5) {
        println!("   - {}: {} per {}", rate.date, rate.rate, rate.unit_count);
    }

    println!("\n🎉 Example completed successfully!");

    Ok(())
}
