//! Statistics engine
//!
//! Aggregate metrics, historical-vs-predicted change, histogram binning and
//! nearest-rank quartile summaries over a working set. Degenerate inputs
//! (empty sets, zero spread, zero baseline) produce `None` or empty output
//! rather than NaN.

use serde::Serialize;

use crate::filter::WorkingSet;
use crate::models::{Attribute, FilterCriteria, Source, SourceFilter};

/// Upper bound on histogram bins
pub const MAX_HISTOGRAM_BINS: usize = 20;

// ============================================================================
// Numeric helpers
// ============================================================================

/// Arithmetic mean
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Variance dividing by n
pub fn population_variance(values: &[f64]) -> Option<f64> {
    let mean = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some(sum_sq / values.len() as f64)
}

/// Standard deviation dividing by n - 1
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

/// Least-squares slope of the values against their ordinal index 0..n-1
pub fn ols_slope(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }

    let n_f = n as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) = (0.0, 0.0, 0.0, 0.0);
    for (i, y) in values.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_xx += x * x;
    }

    let denominator = n_f * sum_xx - sum_x * sum_x;
    if denominator == 0.0 {
        return None;
    }
    Some((n_f * sum_xy - sum_x * sum_y) / denominator)
}

/// Ascending copy; callers never sort shared data in place
pub fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Nearest-rank pick at `floor(n * p)`. `sorted` must be non-empty.
pub fn nearest_rank(sorted: &[f64], p: f64) -> f64 {
    let index = ((sorted.len() as f64) * p).floor() as usize;
    sorted[index.min(sorted.len() - 1)]
}

/// Percentage change of the predicted mean over the historical mean.
///
/// `None` when either subset is empty or the historical mean is zero, so
/// "no comparison" is never confused with "no change".
pub fn change_percent(ws: &WorkingSet) -> Option<f64> {
    let historical = mean(&ws.values_for(Source::Historical))?;
    let predicted = mean(&ws.values_for(Source::Predicted))?;
    if historical == 0.0 {
        return None;
    }
    Some((predicted - historical) / historical * 100.0)
}

// ============================================================================
// Aggregate metrics
// ============================================================================

/// Headline numbers for the selected attribute
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateMetrics {
    pub attribute: Attribute,
    pub label: &'static str,
    pub unit: &'static str,
    pub average: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Sample standard deviation (n - 1)
    pub std_dev: Option<f64>,
    pub total_records: usize,
    pub historical_records: usize,
    pub predicted_records: usize,
    /// Days covered by the filter's date range, rounded up
    pub date_span_days: i64,
    pub change_percent: Option<f64>,
}

pub fn compute_statistics(
    ws: &WorkingSet,
    attribute: Attribute,
    criteria: &FilterCriteria,
) -> AggregateMetrics {
    let values: Vec<f64> = ws
        .records()
        .iter()
        .filter_map(|r| r.value(attribute))
        .collect();

    let min = values.iter().copied().reduce(f64::min);
    let max = values.iter().copied().reduce(f64::max);

    AggregateMetrics {
        attribute,
        label: attribute.label(),
        unit: attribute.unit(),
        average: mean(&values),
        min,
        max,
        std_dev: sample_std_dev(&values),
        total_records: ws.len(),
        historical_records: ws.count_for(Source::Historical),
        predicted_records: ws.count_for(Source::Predicted),
        date_span_days: criteria.date_range.span_days(),
        change_percent: change_percent(ws),
    }
}

// ============================================================================
// Histogram
// ============================================================================

/// One histogram bin with per-source counts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub historical: usize,
    pub predicted: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub bin_width: f64,
    pub bins: Vec<HistogramBin>,
}

/// `min(20, ceil(sqrt(n)))`, zero for an empty set
pub fn bin_count(n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    ((n as f64).sqrt().ceil() as usize).clamp(1, MAX_HISTOGRAM_BINS)
}

pub fn compute_histogram(ws: &WorkingSet) -> Histogram {
    let attribute = ws.attribute();
    let readings: Vec<(Source, f64)> = ws
        .records()
        .iter()
        .filter_map(|r| r.value(attribute).map(|v| (r.source, v)))
        .collect();

    let min = readings.iter().map(|(_, v)| *v).reduce(f64::min);
    let max = readings.iter().map(|(_, v)| *v).reduce(f64::max);

    let (Some(lo), Some(hi)) = (min, max) else {
        return Histogram {
            min: None,
            max: None,
            bin_width: 0.0,
            bins: Vec::new(),
        };
    };

    // hi - lo overflows for extreme finite readings; scale before subtracting
    let span = hi - lo;
    let bins_wanted = bin_count(readings.len()) as f64;
    let width = if span.is_finite() {
        span / bins_wanted
    } else {
        hi / bins_wanted - lo / bins_wanted
    };
    let count = if width > 0.0 {
        bin_count(readings.len())
    } else {
        1
    };

    let edge = |i: usize| -> f64 {
        if i == count {
            hi
        } else if span.is_finite() {
            lo + i as f64 * width
        } else {
            let t = i as f64 / count as f64;
            lo * (1.0 - t) + hi * t
        }
    };
    let position = |value: f64| -> f64 {
        if span.is_finite() {
            (value - lo) / width
        } else {
            value / width - lo / width
        }
    };

    let mut bins: Vec<HistogramBin> = (0..count)
        .map(|i| HistogramBin {
            lower: edge(i),
            upper: edge(i + 1),
            historical: 0,
            predicted: 0,
            total: 0,
        })
        .collect();

    for (source, value) in readings {
        let index = if width > 0.0 {
            (position(value).floor() as usize).min(count - 1)
        } else {
            0
        };
        let bin = &mut bins[index];
        match source {
            Source::Historical => bin.historical += 1,
            Source::Predicted => bin.predicted += 1,
        }
        bin.total += 1;
    }

    Histogram {
        min,
        max,
        bin_width: width,
        bins,
    }
}

// ============================================================================
// Quartiles
// ============================================================================

/// Nearest-rank five-number summary plus mean
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuartileSummary {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub mean: f64,
}

impl QuartileSummary {
    /// Indices `floor(n*0.25)`, `floor(n*0.5)`, `floor(n*0.75)` into a sorted
    /// copy; no interpolation.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mean = mean(values)?;
        let sorted = sorted_copy(values);
        Some(Self {
            count: sorted.len(),
            min: sorted[0],
            q1: nearest_rank(&sorted, 0.25),
            median: nearest_rank(&sorted, 0.5),
            q3: nearest_rank(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
            mean,
        })
    }

    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// Box-plot data per source
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuartileReport {
    pub historical: Option<QuartileSummary>,
    pub predicted: Option<QuartileSummary>,
}

impl QuartileReport {
    pub fn get(&self, source: Source) -> Option<&QuartileSummary> {
        match source {
            Source::Historical => self.historical.as_ref(),
            Source::Predicted => self.predicted.as_ref(),
        }
    }
}

pub fn compute_quartiles(ws: &WorkingSet, source_filter: SourceFilter) -> QuartileReport {
    let summary_for = |source: Source| {
        if source_filter.includes(source) {
            QuartileSummary::from_values(&ws.values_for(source))
        } else {
            None
        }
    };

    QuartileReport {
        historical: summary_for(Source::Historical),
        predicted: summary_for(Source::Predicted),
    }
}

// ============================================================================
// Per-source summary table
// ============================================================================

/// Row of the per-source summary table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceSummary {
    pub source: Source,
    pub count: usize,
    pub mean: f64,
    pub std_dev: Option<f64>,
    pub min: f64,
    pub max: f64,
    /// Nearest-rank (`floor(n*0.5)` of the sorted values), so an even count
    /// yields the upper middle value rather than the interpolated midpoint
    pub median: f64,
}

/// One row per source present in the working set
pub fn summarize_by_source(ws: &WorkingSet) -> Vec<SourceSummary> {
    Source::ALL
        .into_iter()
        .filter_map(|source| {
            let values = ws.values_for(source);
            let quartiles = QuartileSummary::from_values(&values)?;
            Some(SourceSummary {
                source,
                count: quartiles.count,
                mean: quartiles.mean,
                std_dev: sample_std_dev(&values),
                min: quartiles.min,
                max: quartiles.max,
                median: quartiles.median,
            })
        })
        .collect()
}
