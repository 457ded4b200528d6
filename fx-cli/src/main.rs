//! FX CLI
//!
//! Command-line interface for the FX rate sync API.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use uuid::Uuid;

use fx_client::FxClient;
use fx_types::ProviderCode;

#[derive(Parser)]
#[command(name = "fx")]
#[command(author, version, about = "FX rate sync API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the FX sync API
    #[arg(long, env = "FX_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synchronize one currency over a date window
    Sync {
        /// Country or currency name, e.g. "Euro"
        country: String,
        /// First day (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,
        /// Last day (YYYY-MM-DD), defaults to the first day
        #[arg(long)]
        end: Option<NaiveDate>,
        /// Save the rendered chart to this file
        #[arg(long)]
        chart: Option<PathBuf>,
    },
    /// List the currency directory
    Currencies,
    /// List the stored reference table
    Reference,
    /// List stored rates
    Rates {
        /// Restrict to one provider currency code
        #[arg(long)]
        code: Option<u32>,
    },
    /// Download a rendered chart
    Report {
        /// Report ID (UUID)
        id: String,
        /// Output file
        #[arg(long, short, default_value = "report.svg")]
        out: PathBuf,
    },
    /// Check API health
    Health,
}

fn parse_report_id(s: &str) -> Result<Uuid> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("Invalid report ID: {}", s))
}

async fn save_report(client: &FxClient, id: Uuid, out: &Path) -> Result<()> {
    let (content_type, bytes) = client.report(id).await?;
    tokio::fs::write(out, &bytes).await?;
    println!("✓ Saved {} ({} bytes) to {}", content_type, bytes.len(), out.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let client = FxClient::new(&cli.api_url);

    match cli.command {
        Commands::Health => {
            let healthy = client.health().await?;
            if healthy {
                println!("✓ API is healthy");
            } else {
                println!("✗ API is not healthy");
                std::process::exit(1);
            }
        }

        Commands::Sync {
            country,
            start,
            end,
            chart,
        } => {
            let response = client.sync(&country, start, end.unwrap_or(start)).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);

            if let Some(out) = chart {
                match response.report_id {
                    Some(id) => save_report(&client, id, &out).await?,
                    None => eprintln!("✗ No chart was rendered for this sync"),
                }
            }
        }

        Commands::Currencies => {
            let entries = client.currencies().await?;
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }

        Commands::Reference => {
            let rows = client.reference().await?;
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }

        Commands::Rates { code } => {
            let rates = client.rates(code.map(ProviderCode::new)).await?;
            println!("{}", serde_json::to_string_pretty(&rates)?);
        }

        Commands::Report { id, out } => {
            let report_id = parse_report_id(&id)?;
            save_report(&client, report_id, &out).await?;
        }
    }

    Ok(())
}
