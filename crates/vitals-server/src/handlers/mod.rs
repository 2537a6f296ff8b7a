//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area. Analysis
//! endpoints share the filter query parameters: `attribute`, `from`, `to`
//! (`YYYY-MM-DD`) and `source` (`both|historical|predicted`).

pub mod analysis;
pub mod data;

// Re-export all handlers for use in router
pub use analysis::*;
pub use data::*;

use crate::AppError;

/// Fallback for unknown `/api` routes
pub async fn api_not_found() -> AppError {
    AppError::not_found("Unknown API endpoint")
}
