//! Core types for the insight generator

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Display category of an insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    /// Worth attention
    Warning,
    /// Favorable signal
    Success,
    /// Neutral observation
    Info,
}

impl InsightKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightKind::Warning => "warning",
            InsightKind::Success => "success",
            InsightKind::Info => "info",
        }
    }
}

impl fmt::Display for InsightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InsightKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "warning" => Ok(InsightKind::Warning),
            "success" => Ok(InsightKind::Success),
            "info" => Ok(InsightKind::Info),
            _ => Err(format!("Unknown insight kind: {}", s)),
        }
    }
}

/// Rules that can produce an insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    /// Historical vs predicted mean
    Comparison,
    /// Least-squares slope over the selected window
    Trend,
    /// Coefficient of variation
    Variability,
    /// IQR fences
    Outliers,
}

impl RuleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleType::Comparison => "comparison",
            RuleType::Trend => "trend",
            RuleType::Variability => "variability",
            RuleType::Outliers => "outliers",
        }
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RuleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "comparison" => Ok(RuleType::Comparison),
            "trend" => Ok(RuleType::Trend),
            "variability" => Ok(RuleType::Variability),
            "outliers" => Ok(RuleType::Outliers),
            _ => Err(format!("Unknown rule type: {}", s)),
        }
    }
}

/// A generated natural-language observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub rule: RuleType,
    pub message: String,
}

impl Insight {
    pub fn new(rule: RuleType, kind: InsightKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            rule,
            message: message.into(),
        }
    }

    pub fn warning(rule: RuleType, message: impl Into<String>) -> Self {
        Self::new(rule, InsightKind::Warning, message)
    }

    pub fn success(rule: RuleType, message: impl Into<String>) -> Self {
        Self::new(rule, InsightKind::Success, message)
    }

    pub fn info(rule: RuleType, message: impl Into<String>) -> Self {
        Self::new(rule, InsightKind::Info, message)
    }
}

/// Cut-offs used by the rules. Missing keys in configuration keep the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightThresholds {
    /// Percent change beyond which the comparison is flagged (either direction)
    pub change_percent: f64,
    /// Absolute slope below which the trend counts as stable
    pub trend_slope: f64,
    /// CV (%) above which variability is high
    pub high_cv: f64,
    /// CV (%) below which variability is low
    pub low_cv: f64,
    /// IQR multiplier for the outlier fences
    pub outlier_iqr_multiplier: f64,
}

impl Default for InsightThresholds {
    fn default() -> Self {
        Self {
            change_percent: 10.0,
            trend_slope: 0.01,
            high_cv: 20.0,
            low_cv: 10.0,
            outlier_iqr_multiplier: 1.5,
        }
    }
}
