//! Filter engine: date window, attribute presence and source selection

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::models::{Attribute, FilterCriteria, Record, Source};
use crate::series::Series;

/// Records that pass the active filter, in series order.
///
/// Every record in a working set carries a reading for `attribute`.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkingSet {
    attribute: Attribute,
    records: Vec<Record>,
}

/// One point of the time-series chart payload
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub timestamp: NaiveDateTime,
    pub source: Source,
    pub value: f64,
}

impl WorkingSet {
    /// Build a working set directly, dropping records that lack `attribute`
    pub fn from_records(attribute: Attribute, records: Vec<Record>) -> Self {
        let records = records
            .into_iter()
            .filter(|r| r.value(attribute).is_some())
            .collect();
        Self { attribute, records }
    }

    pub fn attribute(&self) -> Attribute {
        self.attribute
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

    /// Attribute readings in series order
    pub fn values(&self) -> Vec<f64> {
        self.records
            .iter()
            .filter_map(|r| r.value(self.attribute))
            .collect()
    }

    /// Attribute readings for one source, in series order
    pub fn values_for(&self, source: Source) -> Vec<f64> {
        self.records
            .iter()
            .filter(|r| r.source == source)
            .filter_map(|r| r.value(self.attribute))
            .collect()
    }

    pub fn count_for(&self, source: Source) -> usize {
        self.records.iter().filter(|r| r.source == source).count()
    }

    pub fn points(&self) -> Vec<SeriesPoint> {
        self.records
            .iter()
            .filter_map(|r| {
                r.value(self.attribute).map(|value| SeriesPoint {
                    timestamp: r.timestamp,
                    source: r.source,
                    value,
                })
            })
            .collect()
    }
}

/// Apply the filter criteria to the series. Pure: the series is only read.
pub fn compute_working_set(series: &Series, criteria: &FilterCriteria) -> WorkingSet {
    let records = series
        .records()
        .iter()
        .filter(|r| criteria.date_range.contains(r.timestamp))
        .filter(|r| r.value(criteria.attribute).is_some())
        .filter(|r| criteria.source_filter.includes(r.source))
        .copied()
        .collect();

    WorkingSet {
        attribute: criteria.attribute,
        records,
    }
}
