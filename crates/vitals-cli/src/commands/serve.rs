//! Server command implementation

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use vitals_core::{Session, VitalsConfig};
use vitals_server::{AppState, ServerOptions};

pub async fn cmd_serve(
    session: Session,
    config: &VitalsConfig,
    synthetic: bool,
    host: &str,
    port: u16,
    static_dir: Option<&Path>,
) -> Result<()> {
    println!("🚀 Starting Vitals web server...");
    println!("   Data: {} ({} records)", session.origin, session.series.len());
    if synthetic {
        println!("   Sources: synthetic dataset (--synthetic)");
    } else {
        println!("   Historical: {}", config.data.historical.display());
        println!("   Predicted: {}", config.data.predicted.display());
    }
    println!("   Listening: http://{}:{}", host, port);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }

    // Parse allowed CORS origins from environment (comma-separated)
    let allowed_origins: Vec<String> = std::env::var("VITALS_ALLOWED_ORIGINS")
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    let sources = if synthetic {
        None
    } else {
        Some(config.data.clone())
    };
    let state = Arc::new(AppState::new(session, sources, config.default_attribute));
    let options = ServerOptions {
        allowed_origins,
        static_dir: static_dir.map(|d| d.display().to_string()),
    };

    vitals_server::serve(state, host, port, options).await
}
