//! Session: loading both sources and running the analysis pipeline
//!
//! Loading is the only asynchronous step. Both CSV files are read
//! concurrently on the blocking pool; if either cannot be read the whole
//! session falls back to the synthetic dataset. Everything after loading is
//! a pure function of the series and the filter criteria.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::filter::{compute_working_set, WorkingSet};
use crate::import::{load_table, ParsedTable};
use crate::insights::{AnalysisContext, Insight, InsightEngine, InsightThresholds};
use crate::models::{Attribute, DateRange, FilterCriteria, Source, SourceFilter};
use crate::normalize::normalize_rows;
use crate::sample::synthetic_dataset;
use crate::series::Series;
use crate::stats::{
    compute_histogram, compute_quartiles, compute_statistics, summarize_by_source,
    AggregateMetrics, Histogram, QuartileReport, SourceSummary,
};

/// Locations of the two CSV sources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSources {
    pub historical: PathBuf,
    pub predicted: PathBuf,
}

impl Default for DataSources {
    fn default() -> Self {
        Self {
            historical: PathBuf::from("data/patient_180days_hourly.csv"),
            predicted: PathBuf::from("data/Prediction_with_StressIndex.csv"),
        }
    }
}

impl DataSources {
    pub fn path(&self, source: Source) -> &PathBuf {
        match source {
            Source::Historical => &self.historical,
            Source::Predicted => &self.predicted,
        }
    }
}

/// Where the loaded series came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataOrigin {
    Files,
    Synthetic,
}

impl DataOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataOrigin::Files => "files",
            DataOrigin::Synthetic => "synthetic",
        }
    }
}

impl fmt::Display for DataOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A CSV row dropped during loading
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRow {
    pub source: Source,
    pub line: u64,
    pub message: String,
}

/// Outcome of loading both sources
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub series: Series,
    pub origin: DataOrigin,
    pub row_errors: Vec<SkippedRow>,
}

async fn read_source(path: PathBuf) -> Result<ParsedTable> {
    let shown = path.display().to_string();
    tokio::task::spawn_blocking(move || load_table(&path))
        .await
        .map_err(|e| Error::SourceUnavailable(format!("{}: {}", shown, e)))?
        .map_err(|e| Error::SourceUnavailable(format!("{}: {}", shown, e)))
}

fn skipped_rows(source: Source, table: &ParsedTable) -> impl Iterator<Item = SkippedRow> + '_ {
    table.errors.iter().map(move |e| SkippedRow {
        source,
        line: e.line,
        message: e.message.clone(),
    })
}

/// Build a series from the synthetic dataset
pub fn load_synthetic(now: NaiveDateTime) -> LoadReport {
    let dataset = synthetic_dataset(now);
    let series = Series::merge(
        normalize_rows(&dataset.historical, Source::Historical, now),
        normalize_rows(&dataset.predicted, Source::Predicted, now),
    );
    LoadReport {
        series,
        origin: DataOrigin::Synthetic,
        row_errors: Vec::new(),
    }
}

/// Load both sources concurrently. Never fails: an unreadable source
/// switches both to synthetic data.
pub async fn load_sources(sources: &DataSources, now: NaiveDateTime) -> LoadReport {
    let (historical, predicted) = tokio::join!(
        read_source(sources.historical.clone()),
        read_source(sources.predicted.clone()),
    );

    let (historical, predicted) = match (historical, predicted) {
        (Ok(h), Ok(p)) => (h, p),
        (h, p) => {
            for e in [h.err(), p.err()].into_iter().flatten() {
                warn!(error = %e, "Data source unavailable, using synthetic data");
            }
            return load_synthetic(now);
        }
    };

    let row_errors: Vec<SkippedRow> = skipped_rows(Source::Historical, &historical)
        .chain(skipped_rows(Source::Predicted, &predicted))
        .collect();

    let series = Series::merge(
        normalize_rows(&historical.rows, Source::Historical, now),
        normalize_rows(&predicted.rows, Source::Predicted, now),
    );

    info!(
        records = series.len(),
        skipped = row_errors.len(),
        "Loaded data sources"
    );
    LoadReport {
        series,
        origin: DataOrigin::Files,
        row_errors,
    }
}

/// Filter selection as typed by a user: query string or command-line flags.
/// Blank values mean "use the default".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FilterRequest {
    pub attribute: Option<String>,
    /// Inclusive start date, `YYYY-MM-DD`
    pub from: Option<String>,
    /// Inclusive end date, `YYYY-MM-DD`
    pub to: Option<String>,
    /// `both`, `historical` or `predicted`
    pub source: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_date(value: &Option<String>, name: &str) -> Result<Option<NaiveDate>> {
    non_blank(value)
        .map(|v| {
            NaiveDate::parse_from_str(v, "%Y-%m-%d").map_err(|_| {
                Error::InvalidData(format!("Invalid {} date '{}' (use YYYY-MM-DD)", name, v))
            })
        })
        .transpose()
}

/// Everything derived from one filter selection
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub criteria: FilterCriteria,
    pub metrics: AggregateMetrics,
    pub histogram: Histogram,
    pub quartiles: QuartileReport,
    pub summary: Vec<SourceSummary>,
    pub insights: Vec<Insight>,
}

/// A loaded series plus the settings used to analyze it
#[derive(Debug, Clone)]
pub struct Session {
    pub series: Series,
    pub origin: DataOrigin,
    pub loaded_at: NaiveDateTime,
    pub row_errors: Vec<SkippedRow>,
    thresholds: InsightThresholds,
}

impl Session {
    pub fn from_series(series: Series, origin: DataOrigin, loaded_at: NaiveDateTime) -> Self {
        Self {
            series,
            origin,
            loaded_at,
            row_errors: Vec::new(),
            thresholds: InsightThresholds::default(),
        }
    }

    pub async fn load(sources: &DataSources, now: NaiveDateTime) -> Self {
        let report = load_sources(sources, now).await;
        Self::from_report(report, now)
    }

    pub fn from_report(report: LoadReport, loaded_at: NaiveDateTime) -> Self {
        Self {
            series: report.series,
            origin: report.origin,
            loaded_at,
            row_errors: report.row_errors,
            thresholds: InsightThresholds::default(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: InsightThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn thresholds(&self) -> &InsightThresholds {
        &self.thresholds
    }

    /// Full series extent, both sources. Falls back to the load day when
    /// the series is empty.
    pub fn default_criteria(&self, attribute: Attribute) -> FilterCriteria {
        let range = self.series.default_range().unwrap_or_else(|| {
            let day = self.loaded_at.date();
            DateRange::from_dates(day, day)
        });
        FilterCriteria::new(attribute, range, SourceFilter::Both)
    }

    /// Validate a user filter selection against this session's defaults
    pub fn resolve_criteria(
        &self,
        request: &FilterRequest,
        default_attribute: Attribute,
    ) -> Result<FilterCriteria> {
        let attribute = match non_blank(&request.attribute) {
            Some(a) => a.parse::<Attribute>().map_err(Error::InvalidData)?,
            None => default_attribute,
        };
        let source_filter = match non_blank(&request.source) {
            Some(s) => s.parse::<SourceFilter>().map_err(Error::InvalidData)?,
            None => SourceFilter::Both,
        };

        let default_range = self.default_criteria(attribute).date_range;
        let from = parse_date(&request.from, "from")?.unwrap_or(default_range.start.date());
        let to = parse_date(&request.to, "to")?.unwrap_or(default_range.end.date());
        if from > to {
            return Err(Error::InvalidData(format!(
                "Start date {} is after end date {}",
                from, to
            )));
        }

        Ok(FilterCriteria::new(
            attribute,
            DateRange::from_dates(from, to),
            source_filter,
        ))
    }

    pub fn working_set(&self, criteria: &FilterCriteria) -> WorkingSet {
        compute_working_set(&self.series, criteria)
    }

    pub fn insights(&self, criteria: &FilterCriteria) -> Vec<Insight> {
        let ws = self.working_set(criteria);
        self.run_insights(&ws, criteria)
    }

    fn run_insights(&self, ws: &WorkingSet, criteria: &FilterCriteria) -> Vec<Insight> {
        let ctx = AnalysisContext::new(ws, criteria.attribute, criteria.source_filter);
        InsightEngine::with_thresholds(self.thresholds).analyze(&ctx)
    }

    /// criteria -> working set -> metrics, distributions and insights
    pub fn analyze(&self, criteria: &FilterCriteria) -> Analysis {
        let ws = self.working_set(criteria);
        Analysis {
            criteria: *criteria,
            metrics: compute_statistics(&ws, criteria.attribute, criteria),
            histogram: compute_histogram(&ws),
            quartiles: compute_quartiles(&ws, criteria.source_filter),
            summary: summarize_by_source(&ws),
            insights: self.run_insights(&ws, criteria),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::InsightKind;
    use chrono::Duration;
    use std::io::Write;

    fn now() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2024-06-01 12:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn csv_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_load_sources_from_files() {
        let historical = csv_file(
            "datetime,StressIndex\n2024-01-02 00:00:00,40\n2024-01-01 00:00:00,50\nbad,row,here\n",
        );
        let predicted = csv_file("datetime,StressIndex\n2024-01-03 00:00:00,70\n");
        let sources = DataSources {
            historical: historical.path().to_path_buf(),
            predicted: predicted.path().to_path_buf(),
        };

        let report = load_sources(&sources, now()).await;

        assert_eq!(report.origin, DataOrigin::Files);
        assert_eq!(report.series.len(), 3);
        assert_eq!(report.row_errors.len(), 1);
        assert_eq!(report.row_errors[0].source, Source::Historical);
        assert_eq!(report.row_errors[0].line, 4);

        let first = &report.series.records()[0];
        assert_eq!(first.timestamp.to_string(), "2024-01-01 00:00:00");
    }

    #[tokio::test]
    async fn test_missing_source_falls_back_to_synthetic() {
        let predicted = csv_file("datetime,StressIndex\n2024-01-03 00:00:00,70\n");
        let sources = DataSources {
            historical: PathBuf::from("/nonexistent/history.csv"),
            predicted: predicted.path().to_path_buf(),
        };

        let session = Session::load(&sources, now()).await;

        assert_eq!(session.origin, DataOrigin::Synthetic);
        let counts = session.series.count_by_source();
        assert_eq!(counts.historical, 180 * 24);
        assert_eq!(counts.predicted, 90 * 24);
    }

    #[test]
    fn test_default_criteria_spans_series() {
        let session = Session::from_report(load_synthetic(now()), now());
        let criteria = session.default_criteria(Attribute::HeartRate);

        assert_eq!(criteria.source_filter, SourceFilter::Both);
        assert_eq!(criteria.date_range.start.to_string(), "2023-12-04 00:00:00");
        assert!(criteria
            .date_range
            .contains(now() + Duration::days(90) - Duration::hours(1)));
    }

    #[test]
    fn test_default_criteria_for_empty_series() {
        let session = Session::from_series(Series::default(), DataOrigin::Files, now());
        let criteria = session.default_criteria(Attribute::StressIndex);
        assert_eq!(criteria.date_range.span_days(), 1);

        let analysis = session.analyze(&criteria);
        assert_eq!(analysis.metrics.total_records, 0);
        assert!(analysis.insights.is_empty());
        assert!(analysis.histogram.bins.is_empty());
    }

    #[test]
    fn test_resolve_criteria_defaults_and_overrides() {
        let session = Session::from_report(load_synthetic(now()), now());

        let defaults = session
            .resolve_criteria(&FilterRequest::default(), Attribute::SystolicBP)
            .unwrap();
        assert_eq!(defaults, session.default_criteria(Attribute::SystolicBP));

        let request = FilterRequest {
            attribute: Some("heart_rate".into()),
            from: Some("2024-05-01".into()),
            to: Some(" ".into()),
            source: Some("Predicted".into()),
        };
        let criteria = session
            .resolve_criteria(&request, Attribute::StressIndex)
            .unwrap();
        assert_eq!(criteria.attribute, Attribute::HeartRate);
        assert_eq!(criteria.source_filter, SourceFilter::Predicted);
        assert_eq!(criteria.date_range.start.to_string(), "2024-05-01 00:00:00");
        assert_eq!(
            criteria.date_range.end.date(),
            defaults.date_range.end.date()
        );
    }

    #[test]
    fn test_resolve_criteria_rejects_bad_input() {
        let session = Session::from_report(load_synthetic(now()), now());
        let resolve = |request: FilterRequest| {
            session.resolve_criteria(&request, Attribute::StressIndex)
        };

        let bad_attribute = resolve(FilterRequest {
            attribute: Some("glucose".into()),
            ..Default::default()
        });
        assert!(matches!(bad_attribute, Err(Error::InvalidData(_))));

        let bad_date = resolve(FilterRequest {
            from: Some("01/05/2024".into()),
            ..Default::default()
        });
        assert!(matches!(bad_date, Err(Error::InvalidData(_))));

        let inverted = resolve(FilterRequest {
            from: Some("2024-05-02".into()),
            to: Some("2024-05-01".into()),
            ..Default::default()
        });
        assert!(matches!(inverted, Err(Error::InvalidData(_))));

        let bad_source = resolve(FilterRequest {
            source: Some("forecast".into()),
            ..Default::default()
        });
        assert!(matches!(bad_source, Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_analyze_uses_session_thresholds() {
        let base = now();
        let records = [10.0, 10.0, 10.0, 10.5]
            .iter()
            .enumerate()
            .map(|(i, v)| {
                crate::models::Record::new(base + Duration::hours(i as i64), Source::Historical)
                    .with_value(Attribute::StressIndex, *v)
            })
            .collect();
        let series = Series::merge(records, vec![]);
        let session = Session::from_series(series, DataOrigin::Files, now());
        let criteria = session.default_criteria(Attribute::StressIndex);

        let variability = |s: &Session| {
            s.analyze(&criteria)
                .insights
                .into_iter()
                .find(|i| i.rule == crate::insights::RuleType::Variability)
                .unwrap()
        };

        assert_eq!(variability(&session).kind, InsightKind::Success);

        let strict = session.clone().with_thresholds(InsightThresholds {
            high_cv: 1.0,
            low_cv: 0.5,
            ..Default::default()
        });
        assert_eq!(variability(&strict).kind, InsightKind::Warning);
    }
}
