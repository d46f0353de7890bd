//! Paddock
//!
//! Backtests race pick strategies, compares two presets side by side and
//! produces picks for the coming weekend.

mod cli;
mod commands;
mod output;

use anyhow::Result;
use clap::Parser;
use paddock_core::config::Config;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::Cli;

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "paddock=info,backtester=info,paddock_core=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so that stdout stays clean for tables and JSON
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    // Load configuration
    let mut config = Config::load()?;
    if let Some(url) = cli.database_url {
        config.database.url = url;
    }
    info!(database = %config.database.url, "Starting Paddock");

    let app = commands::App::connect(&config, cli.json).await?;
    app.run(cli.command).await
}
