//! Vitals CLI - Patient vital-sign trend analysis
//!
//! Usage:
//!   vitals summary --attribute heart_rate     Aggregate metrics
//!   vitals insights --source both             Generated insights
//!   vitals analyze --json                     Full analysis as JSON
//!   vitals serve --port 3000                  Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_config(
        cli.config.as_deref(),
        cli.historical.as_deref(),
        cli.predicted.as_deref(),
    )?;
    let session = commands::open_session(&config, cli.synthetic).await;

    match cli.command {
        Commands::Attributes => commands::cmd_attributes(&session),
        Commands::Summary { filter } => {
            let criteria = commands::resolve_criteria(&session, &config, &filter)?;
            commands::cmd_summary(&session, &criteria)
        }
        Commands::Insights { filter } => {
            let criteria = commands::resolve_criteria(&session, &config, &filter)?;
            commands::cmd_insights(&session, &criteria)
        }
        Commands::Histogram { filter } => {
            let criteria = commands::resolve_criteria(&session, &config, &filter)?;
            commands::cmd_histogram(&session, &criteria)
        }
        Commands::Quartiles { filter } => {
            let criteria = commands::resolve_criteria(&session, &config, &filter)?;
            commands::cmd_quartiles(&session, &criteria)
        }
        Commands::Analyze { filter, json } => {
            let criteria = commands::resolve_criteria(&session, &config, &filter)?;
            commands::cmd_analyze(&session, &criteria, json)
        }
        Commands::Serve {
            port,
            host,
            static_dir,
        } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            commands::cmd_serve(
                session,
                &config,
                cli.synthetic,
                &host,
                port,
                static_dir.as_deref(),
            )
            .await
        }
    }
}
