//! IQR outlier detection over the whole working set
//!
//! Quartiles are taken from a sorted copy at the same nearest-rank indices
//! the statistics engine uses, regardless of source.

use crate::stats::{nearest_rank, sorted_copy};

use super::engine::{AnalysisContext, InsightRule};
use super::types::{Insight, InsightThresholds, RuleType};

pub struct OutlierRule {
    multiplier: f64,
}

impl OutlierRule {
    pub fn new() -> Self {
        Self::with_thresholds(InsightThresholds::default())
    }

    pub fn with_thresholds(thresholds: InsightThresholds) -> Self {
        Self {
            multiplier: thresholds.outlier_iqr_multiplier,
        }
    }

    /// Lower and upper fences for a set of readings
    pub fn fences(&self, values: &[f64]) -> Option<(f64, f64)> {
        if values.is_empty() {
            return None;
        }
        let sorted = sorted_copy(values);
        let q1 = nearest_rank(&sorted, 0.25);
        let q3 = nearest_rank(&sorted, 0.75);
        let iqr = q3 - q1;
        Some((q1 - self.multiplier * iqr, q3 + self.multiplier * iqr))
    }
}

impl Default for OutlierRule {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightRule for OutlierRule {
    fn rule_type(&self) -> RuleType {
        RuleType::Outliers
    }

    fn name(&self) -> &'static str {
        "Outliers"
    }

    fn evaluate(&self, ctx: &AnalysisContext<'_>) -> Option<Insight> {
        let values = ctx.values();
        let (lower, upper) = self.fences(&values)?;

        let count = values.iter().filter(|v| **v < lower || **v > upper).count();
        if count == 0 {
            return None;
        }

        let (noun, verb) = if count == 1 {
            ("reading", "falls")
        } else {
            ("readings", "fall")
        };
        Some(Insight::warning(
            RuleType::Outliers,
            format!(
                "{} {} {} {} outside the expected range [{:.1}, {:.1}]. Review for measurement errors or acute events.",
                count,
                ctx.label(),
                noun,
                verb,
                lower,
                upper
            ),
        ))
    }
}
