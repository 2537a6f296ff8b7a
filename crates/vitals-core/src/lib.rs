//! Vitals Core Library
//!
//! Shared functionality for the Vitals patient trend tool:
//! - CSV import and record normalization
//! - Chronological merge of historical and predicted readings
//! - Filtering by attribute, date range and source
//! - Aggregate metrics, histograms and quartile summaries
//! - Rule-based insight generation
//! - Configuration and session loading with a synthetic fallback

pub mod config;
pub mod error;
pub mod filter;
pub mod import;
pub mod insights;
pub mod models;
pub mod normalize;
pub mod sample;
pub mod series;
pub mod session;
pub mod stats;

pub use config::{ServerConfig, VitalsConfig};
pub use error::{Error, Result};
pub use filter::{compute_working_set, SeriesPoint, WorkingSet};
pub use import::{ParsedTable, RowError};
pub use insights::{
    generate_insights, AnalysisContext, Insight, InsightEngine, InsightKind, InsightRule,
    InsightThresholds, RuleType,
};
pub use models::{
    Attribute, AttributeMetadata, DateRange, FilterCriteria, Record, Source, SourceFilter,
};
pub use normalize::{RawRow, RawValue};
pub use series::{Series, SourceCounts};
pub use session::{
    Analysis, DataOrigin, DataSources, FilterRequest, LoadReport, Session, SkippedRow,
};
pub use stats::{
    compute_histogram, compute_quartiles, compute_statistics, summarize_by_source,
    AggregateMetrics, Histogram, HistogramBin, QuartileReport, QuartileSummary, SourceSummary,
};
