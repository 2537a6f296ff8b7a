//! Shared command utilities and the attributes command
//!
//! This module contains:
//! - `load_config` - Resolve configuration plus command-line overrides
//! - `open_session` - Load the data sources into a session
//! - `resolve_criteria` - Turn filter flags into validated criteria
//! - `cmd_attributes` - List attributes

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use vitals_core::session::load_synthetic;
use vitals_core::{Attribute, FilterCriteria, Session, VitalsConfig};

use crate::cli::FilterArgs;

/// Load config, then apply `--historical` / `--predicted`
pub fn load_config(
    config_path: Option<&Path>,
    historical: Option<&Path>,
    predicted: Option<&Path>,
) -> Result<VitalsConfig> {
    let mut config = VitalsConfig::load(config_path).context("Failed to load configuration")?;

    if let Some(path) = historical {
        config.data.historical = path.to_path_buf();
    }
    if let Some(path) = predicted {
        config.data.predicted = path.to_path_buf();
    }

    Ok(config)
}

/// Load both sources (or the synthetic dataset) into a session
pub async fn open_session(config: &VitalsConfig, synthetic: bool) -> Session {
    let now = Local::now().naive_local();
    let session = if synthetic {
        Session::from_report(load_synthetic(now), now)
    } else {
        Session::load(&config.data, now).await
    };
    session.with_thresholds(config.thresholds)
}

pub fn resolve_criteria(
    session: &Session,
    config: &VitalsConfig,
    filter: &FilterArgs,
) -> Result<FilterCriteria> {
    session
        .resolve_criteria(&filter.to_request(), config.default_attribute)
        .context("Invalid filter")
}

/// Print a one-line description of where the data came from
pub fn print_source_banner(session: &Session, criteria: &FilterCriteria) {
    let counts = session.series.count_by_source();
    println!(
        "   Data: {} ({} historical, {} predicted)",
        session.origin, counts.historical, counts.predicted
    );
    println!(
        "   Filter: {} │ {} to {} │ {}",
        criteria.attribute.label(),
        criteria.date_range.start.date(),
        criteria.date_range.end.date(),
        criteria.source_filter
    );
    if !session.row_errors.is_empty() {
        println!(
            "   ⚠️  {} malformed row(s) skipped (run with -v for details)",
            session.row_errors.len()
        );
    }
}

pub fn cmd_attributes(session: &Session) -> Result<()> {
    let available = session.series.available_attributes();

    println!();
    println!("🩺 Attributes");
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   {:14} │ {:12} │ {:14} │ {:6} │ {:>5}",
        "Key", "Column", "Label", "Unit", "Data"
    );
    println!("   ───────────────┼──────────────┼────────────────┼────────┼──────");

    for attribute in Attribute::ALL {
        let meta = attribute.metadata();
        let marker = if available.contains(&attribute) {
            "✓"
        } else {
            "-"
        };
        println!(
            "   {:14} │ {:12} │ {:14} │ {:6} │ {:>5}",
            attribute.as_str(),
            meta.column,
            meta.label,
            meta.unit,
            marker
        );
    }

    Ok(())
}
