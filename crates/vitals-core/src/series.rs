//! Chronological series built from the historical and predicted batches

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::debug;

use crate::models::{Attribute, DateRange, Record, Source};

/// The merged, time-ordered record set for a session.
///
/// Built once per load and never mutated afterwards; a reload builds a new one.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Series {
    records: Vec<Record>,
}

/// Record counts per source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SourceCounts {
    pub historical: usize,
    pub predicted: usize,
}

impl Series {
    /// Concatenate historical then predicted, then stable-sort by timestamp so
    /// equal timestamps keep historical rows ahead of predicted ones.
    pub fn merge(historical: Vec<Record>, predicted: Vec<Record>) -> Self {
        let mut records = historical;
        records.extend(predicted);
        records.sort_by_key(|record| record.timestamp);

        debug!(records = records.len(), "Merged series");
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First and last timestamp
    pub fn extent(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let first = self.records.first()?;
        let last = self.records.last()?;
        Some((first.timestamp, last.timestamp))
    }

    /// Whole-day range covering the series, the default date filter
    pub fn default_range(&self) -> Option<DateRange> {
        self.extent()
            .map(|(start, end)| DateRange::from_dates(start.date(), end.date()))
    }

    pub fn count_by_source(&self) -> SourceCounts {
        self.records
            .iter()
            .fold(SourceCounts::default(), |mut counts, record| {
                match record.source {
                    Source::Historical => counts.historical += 1,
                    Source::Predicted => counts.predicted += 1,
                }
                counts
            })
    }

    /// Attributes with at least one reading anywhere in the series
    pub fn available_attributes(&self) -> Vec<Attribute> {
        Attribute::ALL
            .into_iter()
            .filter(|attr| self.records.iter().any(|r| r.value(*attr).is_some()))
            .collect()
    }
}
