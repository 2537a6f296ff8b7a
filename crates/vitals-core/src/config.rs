//! Dashboard configuration
//!
//! The built-in defaults live in `config/vitals.toml` and are compiled in.
//! A user copy at `<data dir>/vitals/config/vitals.toml`, or an explicit
//! path, replaces them; keys it leaves out keep their defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Error, Result};
use crate::insights::InsightThresholds;
use crate::models::Attribute;
use crate::session::DataSources;

/// Default config (embedded at compile time)
const DEFAULT_CONFIG: &str = include_str!("../../../config/vitals.toml");

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Resolved configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VitalsConfig {
    pub data: DataSources,
    pub default_attribute: Attribute,
    pub thresholds: InsightThresholds,
    pub server: ServerConfig,
}

impl Default for VitalsConfig {
    fn default() -> Self {
        Self {
            data: DataSources::default(),
            default_attribute: Attribute::StressIndex,
            thresholds: InsightThresholds::default(),
            server: ServerConfig::default(),
        }
    }
}

impl VitalsConfig {
    /// Load from `override_path`, else the user override if it exists, else
    /// the embedded defaults. An explicit path that does not exist is an error.
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let path = match override_path {
            Some(path) if !path.exists() => {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            Some(path) => Some(path.to_path_buf()),
            None => default_config_path().filter(|p| p.exists()),
        };

        match path {
            Some(path) => {
                debug!(path = %path.display(), "Loading config override");
                let content = fs::read_to_string(&path)
                    .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;
                parse_config(&content)
            }
            None => parse_config(DEFAULT_CONFIG),
        }
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("vitals").join("config").join("vitals.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    data: Option<RawData>,
    analysis: Option<RawAnalysis>,
    thresholds: Option<InsightThresholds>,
    server: Option<RawServer>,
}

#[derive(Debug, Deserialize)]
struct RawData {
    historical: Option<PathBuf>,
    predicted: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    default_attribute: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawServer {
    host: Option<String>,
    port: Option<u16>,
}

/// Parse config from TOML content
pub fn parse_config(content: &str) -> Result<VitalsConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = VitalsConfig::default();

    if let Some(data) = raw.data {
        if let Some(historical) = data.historical {
            config.data.historical = historical;
        }
        if let Some(predicted) = data.predicted {
            config.data.predicted = predicted;
        }
    }

    if let Some(analysis) = raw.analysis {
        if let Some(attribute) = analysis.default_attribute {
            config.default_attribute = attribute.parse().map_err(Error::Config)?;
        }
    }

    if let Some(thresholds) = raw.thresholds {
        config.thresholds = thresholds;
    }

    if let Some(server) = raw.server {
        if let Some(host) = server.host {
            config.server.host = host;
        }
        if let Some(port) = server.port {
            config.server.port = port;
        }
    }

    Ok(config)
}
