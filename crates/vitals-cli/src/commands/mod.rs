//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `common` - Config/session loading, filter resolution, attribute listing
//! - `insights` - Generated insights
//! - `reports` - Summary, histogram, quartile and full analysis output
//! - `serve` - Web server command

pub mod common;
pub mod insights;
pub mod reports;
pub mod serve;

// Re-export command functions for main.rs
pub use common::*;
pub use insights::*;
pub use reports::*;
pub use serve::*;

/// Format an optional reading, "-" when absent
pub fn fmt_value(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "-".to_string(),
    }
}

/// Horizontal bar scaled so `max` fills `width` cells
pub fn bar(count: usize, max: usize, width: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let cells = (count * width).div_ceil(max);
    "█".repeat(cells)
}
