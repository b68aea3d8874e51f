//! Shelf-Scout main entry point
//!
//! Command-line interface for the product page scraping service.

use anyhow::Context;
use clap::Parser;
use shelf_scout::config::{load_config, Config};
use shelf_scout::scrape::build_http_client;
use shelf_scout::server::{serve, AppState};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Shelf-Scout: product page scraping service
///
/// Accepts JSON batches of product page URLs over HTTP and returns one
/// structured record per URL, synchronously or through named background jobs
/// collected exactly once.
#[derive(Parser, Debug)]
#[command(name = "shelf-scout")]
#[command(version)]
#[command(about = "Product page scraping service", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply without one)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Listen address override, e.g. 0.0.0.0:8080
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("failed to load config {}", path.display()))?
        }
        None => Config::default(),
    };

    let addr = match cli.listen {
        Some(addr) => addr,
        None => config.listen_addr().context("invalid listen address")?,
    };

    let client = build_http_client(&config.fetcher).context("failed to build HTTP client")?;
    let state = AppState::new(client);

    serve(addr, state).await?;

    Ok(())
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("shelf_scout=info,warn"),
            1 => EnvFilter::new("shelf_scout=debug,info"),
            2 => EnvFilter::new("shelf_scout=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
