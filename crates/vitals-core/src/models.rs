//! Domain models for Vitals

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Where a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Observed readings from the look-back window
    Historical,
    /// Model output for the look-ahead window
    Predicted,
}

impl Source {
    pub const ALL: [Source; 2] = [Source::Historical, Source::Predicted];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Historical => "historical",
            Self::Predicted => "predicted",
        }
    }

    /// Capitalized label used in reports
    pub fn label(&self) -> &'static str {
        match self {
            Self::Historical => "Historical",
            Self::Predicted => "Predicted",
        }
    }
}

impl std::str::FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "historical" | "history" => Ok(Self::Historical),
            "predicted" | "prediction" => Ok(Self::Predicted),
            _ => Err(format!("Unknown source: {}", s)),
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Vital-sign attributes tracked per record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attribute {
    #[serde(rename = "stress_index")]
    StressIndex,
    #[serde(rename = "heart_rate")]
    HeartRate,
    #[serde(rename = "systolic_bp")]
    SystolicBP,
    #[serde(rename = "diastolic_bp")]
    DiastolicBP,
}

impl Attribute {
    pub const ALL: [Attribute; 4] = [
        Attribute::StressIndex,
        Attribute::HeartRate,
        Attribute::SystolicBP,
        Attribute::DiastolicBP,
    ];

    /// Stable snake_case key (API and config)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StressIndex => "stress_index",
            Self::HeartRate => "heart_rate",
            Self::SystolicBP => "systolic_bp",
            Self::DiastolicBP => "diastolic_bp",
        }
    }

    /// Column header in the source CSV files
    pub fn column(&self) -> &'static str {
        match self {
            Self::StressIndex => "StressIndex",
            Self::HeartRate => "HeartRate",
            Self::SystolicBP => "SystolicBP",
            Self::DiastolicBP => "DiastolicBP",
        }
    }

    /// Human-readable label embedded in metrics and insight messages
    pub fn label(&self) -> &'static str {
        match self {
            Self::StressIndex => "Stress Index",
            Self::HeartRate => "Heart Rate",
            Self::SystolicBP => "Systolic BP",
            Self::DiastolicBP => "Diastolic BP",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Self::StressIndex => "index",
            Self::HeartRate => "bpm",
            Self::SystolicBP | Self::DiastolicBP => "mmHg",
        }
    }

    pub fn metadata(&self) -> AttributeMetadata {
        AttributeMetadata {
            key: *self,
            column: self.column(),
            label: self.label(),
            unit: self.unit(),
        }
    }
}

impl std::str::FromStr for Attribute {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let needle = s.trim();
        Attribute::ALL
            .into_iter()
            .find(|attr| {
                needle.eq_ignore_ascii_case(attr.as_str())
                    || needle.eq_ignore_ascii_case(attr.column())
                    || needle.eq_ignore_ascii_case(attr.label())
            })
            .ok_or_else(|| format!("Unknown attribute: {}", s))
    }
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Static display metadata for an attribute
#[derive(Debug, Clone, Serialize)]
pub struct AttributeMetadata {
    pub key: Attribute,
    pub column: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
}

/// Attribute readings for one record. `None` means the reading is absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeValues {
    pub stress_index: Option<f64>,
    pub heart_rate: Option<f64>,
    pub systolic_bp: Option<f64>,
    pub diastolic_bp: Option<f64>,
}

impl AttributeValues {
    pub fn get(&self, attribute: Attribute) -> Option<f64> {
        match attribute {
            Attribute::StressIndex => self.stress_index,
            Attribute::HeartRate => self.heart_rate,
            Attribute::SystolicBP => self.systolic_bp,
            Attribute::DiastolicBP => self.diastolic_bp,
        }
    }

    pub fn set(&mut self, attribute: Attribute, value: Option<f64>) {
        let slot = match attribute {
            Attribute::StressIndex => &mut self.stress_index,
            Attribute::HeartRate => &mut self.heart_rate,
            Attribute::SystolicBP => &mut self.systolic_bp,
            Attribute::DiastolicBP => &mut self.diastolic_bp,
        };
        *slot = value;
    }
}

/// A single normalized observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub timestamp: NaiveDateTime,
    pub source: Source,
    pub values: AttributeValues,
}

impl Record {
    pub fn new(timestamp: NaiveDateTime, source: Source) -> Self {
        Self {
            timestamp,
            source,
            values: AttributeValues::default(),
        }
    }

    /// Builder-style setter, mostly for fixtures
    pub fn with_value(mut self, attribute: Attribute, value: f64) -> Self {
        self.values.set(attribute, Some(value));
        self
    }

    pub fn value(&self, attribute: Attribute) -> Option<f64> {
        self.values.get(attribute)
    }
}

/// Which sources a query should include
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFilter {
    #[default]
    Both,
    Historical,
    Predicted,
}

impl SourceFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Both => "both",
            Self::Historical => "historical",
            Self::Predicted => "predicted",
        }
    }

    pub fn includes(&self, source: Source) -> bool {
        match self {
            Self::Both => true,
            Self::Historical => source == Source::Historical,
            Self::Predicted => source == Source::Predicted,
        }
    }
}

impl std::str::FromStr for SourceFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "both" | "all" => Ok(Self::Both),
            "historical" => Ok(Self::Historical),
            "predicted" => Ok(Self::Predicted),
            _ => Err(format!(
                "Unknown source filter: {}. Available: both, historical, predicted",
                s
            )),
        }
    }
}

impl std::fmt::Display for SourceFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Inclusive timestamp window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Range covering whole calendar days, from the first instant of `start`
    /// to the last instant of `end`.
    pub fn from_dates(start: NaiveDate, end: NaiveDate) -> Self {
        let end_of_day =
            end.and_time(NaiveTime::MIN) + Duration::days(1) - Duration::nanoseconds(1);
        Self {
            start: start.and_time(NaiveTime::MIN),
            end: end_of_day,
        }
    }

    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        timestamp >= self.start && timestamp <= self.end
    }

    /// Whole days covered, rounded up. Zero for empty or inverted ranges.
    pub fn span_days(&self) -> i64 {
        let span = self.end.signed_duration_since(self.start);
        if span <= Duration::zero() {
            return 0;
        }

        match span.num_nanoseconds() {
            Some(nanos) => {
                let day = Duration::days(1).num_nanoseconds().unwrap_or(86_400_000_000_000);
                (nanos + day - 1) / day
            }
            None => {
                let day_ms = Duration::days(1).num_milliseconds();
                (span.num_milliseconds() + day_ms - 1) / day_ms
            }
        }
    }
}

/// Filter selection for one analysis request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub attribute: Attribute,
    pub date_range: DateRange,
    pub source_filter: SourceFilter,
}

impl FilterCriteria {
    pub fn new(attribute: Attribute, date_range: DateRange, source_filter: SourceFilter) -> Self {
        Self {
            attribute,
            date_range,
            source_filter,
        }
    }
}
