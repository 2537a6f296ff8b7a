//! Trend direction over the selected window
//!
//! The slope is fitted against the ordinal position of each reading
//! (0..n-1), not its timestamp.

use crate::stats::ols_slope;

use super::engine::{AnalysisContext, InsightRule};
use super::types::{Insight, InsightThresholds, RuleType};

pub struct TrendRule {
    min_slope: f64,
}

impl TrendRule {
    pub fn new() -> Self {
        Self::with_thresholds(InsightThresholds::default())
    }

    pub fn with_thresholds(thresholds: InsightThresholds) -> Self {
        Self {
            min_slope: thresholds.trend_slope,
        }
    }
}

impl Default for TrendRule {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightRule for TrendRule {
    fn rule_type(&self) -> RuleType {
        RuleType::Trend
    }

    fn name(&self) -> &'static str {
        "Trend Analysis"
    }

    fn evaluate(&self, ctx: &AnalysisContext<'_>) -> Option<Insight> {
        let slope = ols_slope(&ctx.values())?;

        let direction = if slope.abs() <= self.min_slope {
            "a stable"
        } else if slope > 0.0 {
            "an upward"
        } else {
            "a downward"
        };

        Some(Insight::info(
            RuleType::Trend,
            format!(
                "{} shows {} trend over the selected period.",
                ctx.label(),
                direction
            ),
        ))
    }
}
