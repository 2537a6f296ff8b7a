//! Variability via the coefficient of variation
//!
//! Uses the population standard deviation. A zero mean leaves the CV
//! undefined and is reported as such instead of bucketed.

use crate::stats::{mean, population_variance};

use super::engine::{AnalysisContext, InsightRule};
use super::types::{Insight, InsightThresholds, RuleType};

pub struct VariabilityRule {
    high_cv: f64,
    low_cv: f64,
}

impl VariabilityRule {
    pub fn new() -> Self {
        Self::with_thresholds(InsightThresholds::default())
    }

    pub fn with_thresholds(thresholds: InsightThresholds) -> Self {
        Self {
            high_cv: thresholds.high_cv,
            low_cv: thresholds.low_cv,
        }
    }
}

impl Default for VariabilityRule {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightRule for VariabilityRule {
    fn rule_type(&self) -> RuleType {
        RuleType::Variability
    }

    fn name(&self) -> &'static str {
        "Variability"
    }

    fn evaluate(&self, ctx: &AnalysisContext<'_>) -> Option<Insight> {
        let values = ctx.values();
        let mean = mean(&values)?;
        let std_dev = population_variance(&values)?.sqrt();
        let label = ctx.label();

        if mean == 0.0 {
            return Some(Insight::info(
                RuleType::Variability,
                format!(
                    "Variability of {} cannot be assessed: the coefficient of variation is undefined for a zero mean.",
                    label
                ),
            ));
        }

        let cv = std_dev / mean * 100.0;
        let insight = if cv > self.high_cv {
            Insight::warning(
                RuleType::Variability,
                format!(
                    "High variability detected in {} (CV: {:.1}%). Consider monitoring more closely.",
                    label, cv
                ),
            )
        } else if cv < self.low_cv {
            Insight::success(
                RuleType::Variability,
                format!(
                    "Low variability in {} (CV: {:.1}%). Values are relatively consistent.",
                    label, cv
                ),
            )
        } else {
            Insight::info(
                RuleType::Variability,
                format!("Moderate variability in {} (CV: {:.1}%).", label, cv),
            )
        };
        Some(insight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::WorkingSet;
    use crate::insights::types::InsightKind;
    use crate::models::{Attribute, Record, Source, SourceFilter};
    use chrono::NaiveDateTime;

    fn evaluate(values: &[f64]) -> Option<Insight> {
        let ts = NaiveDateTime::parse_from_str("2024-03-01 00:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let records = values
            .iter()
            .map(|v| Record::new(ts, Source::Historical).with_value(Attribute::DiastolicBP, *v))
            .collect();
        let set = WorkingSet::from_records(Attribute::DiastolicBP, records);
        let ctx = AnalysisContext::new(&set, Attribute::DiastolicBP, SourceFilter::Both);
        VariabilityRule::new().evaluate(&ctx)
    }

    #[test]
    fn test_zero_spread_is_low() {
        let insight = evaluate(&[10.0, 10.0, 10.0, 10.0]).unwrap();
        assert_eq!(insight.kind, InsightKind::Success);
        assert!(insight.message.contains("Low variability"));
        assert!(insight.message.contains("CV: 0.0%"));
    }

    #[test]
    fn test_high_variability() {
        // mean 50, population sd 40 -> CV 80%
        let insight = evaluate(&[10.0, 90.0]).unwrap();
        assert_eq!(insight.kind, InsightKind::Warning);
        assert!(insight.message.contains("CV: 80.0%"));
    }

    #[test]
    fn test_moderate_variability() {
        // mean 100, population sd 15 -> CV 15%
        let insight = evaluate(&[85.0, 115.0]).unwrap();
        assert_eq!(insight.kind, InsightKind::Info);
        assert_eq!(insight.message, "Moderate variability in Diastolic BP (CV: 15.0%).");
    }

    #[test]
    fn test_zero_mean_is_undefined() {
        let insight = evaluate(&[0.0, 0.0]).unwrap();
        assert_eq!(insight.kind, InsightKind::Info);
        assert!(insight.message.contains("undefined"));
        assert!(!insight.message.contains("NaN"));
    }
}
