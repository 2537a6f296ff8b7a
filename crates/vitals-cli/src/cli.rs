//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use vitals_core::FilterRequest;

/// Vitals - Patient vital-sign trends, history vs prediction
#[derive(Parser)]
#[command(name = "vitals")]
#[command(about = "Historical and predicted vital-sign trend analysis", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to the user config, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Historical readings CSV (overrides config)
    #[arg(long, global = true)]
    pub historical: Option<PathBuf>,

    /// Predicted readings CSV (overrides config)
    #[arg(long, global = true)]
    pub predicted: Option<PathBuf>,

    /// Skip the CSV sources and use the built-in synthetic dataset
    #[arg(long, global = true)]
    pub synthetic: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Filter flags shared by the analysis commands
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Attribute: stress_index, heart_rate, systolic_bp, diastolic_bp
    #[arg(short, long)]
    pub attribute: Option<String>,

    /// Start date (YYYY-MM-DD), defaults to the first reading
    #[arg(long)]
    pub from: Option<String>,

    /// End date (YYYY-MM-DD), defaults to the last reading
    #[arg(long)]
    pub to: Option<String>,

    /// Data source: both, historical, predicted
    #[arg(short, long)]
    pub source: Option<String>,
}

impl FilterArgs {
    pub fn to_request(&self) -> FilterRequest {
        FilterRequest {
            attribute: self.attribute.clone(),
            from: self.from.clone(),
            to: self.to.clone(),
            source: self.source.clone(),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List attributes and whether the data has readings for them
    Attributes,

    /// Show aggregate metrics and the per-source summary table
    Summary {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Show generated insights
    Insights {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Show the value distribution by source
    Histogram {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Show quartile summaries by source
    Quartiles {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Run the full analysis
    Analyze {
        #[command(flatten)]
        filter: FilterArgs,

        /// Print the analysis as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start the web server
    Serve {
        /// Port to listen on (defaults to config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (defaults to config)
        #[arg(long)]
        host: Option<String>,

        /// Directory of static dashboard files to serve
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
}
