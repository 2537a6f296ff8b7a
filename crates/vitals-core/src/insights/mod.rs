//! Insight Generator - rule-based natural-language observations
//!
//! Rules run in a fixed order over the filtered working set:
//!
//! - **Comparison** - historical vs predicted mean (both sources only)
//! - **Trend** - least-squares slope over the ordinal position
//! - **Variability** - coefficient of variation buckets
//! - **Outliers** - readings outside the IQR fences
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vitals_core::insights::{AnalysisContext, InsightEngine};
//!
//! let engine = InsightEngine::with_thresholds(config.thresholds);
//! let ctx = AnalysisContext::new(&working_set, attribute, SourceFilter::Both);
//! let insights = engine.analyze(&ctx);
//! ```

pub mod comparison;
pub mod engine;
pub mod outliers;
pub mod trend;
pub mod types;
pub mod variability;

pub use comparison::ComparisonRule;
pub use engine::{generate_insights, AnalysisContext, InsightEngine, InsightRule};
pub use outliers::OutlierRule;
pub use trend::TrendRule;
pub use types::{Insight, InsightKind, InsightThresholds, RuleType};
pub use variability::VariabilityRule;
