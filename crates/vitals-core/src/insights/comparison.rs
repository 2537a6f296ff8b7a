//! Historical vs predicted comparison
//!
//! Only runs with both sources selected and both present. The change is the
//! predicted mean relative to the historical mean.

use crate::models::SourceFilter;
use crate::stats::change_percent;

use super::engine::{AnalysisContext, InsightRule};
use super::types::{Insight, InsightThresholds, RuleType};

pub struct ComparisonRule {
    threshold: f64,
}

impl ComparisonRule {
    pub fn new() -> Self {
        Self::with_thresholds(InsightThresholds::default())
    }

    pub fn with_thresholds(thresholds: InsightThresholds) -> Self {
        Self {
            threshold: thresholds.change_percent,
        }
    }
}

impl Default for ComparisonRule {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightRule for ComparisonRule {
    fn rule_type(&self) -> RuleType {
        RuleType::Comparison
    }

    fn name(&self) -> &'static str {
        "Historical vs Predicted"
    }

    fn evaluate(&self, ctx: &AnalysisContext<'_>) -> Option<Insight> {
        if ctx.source_filter != SourceFilter::Both {
            return None;
        }
        let change = change_percent(ctx.working_set)?;
        let label = ctx.label();

        let insight = if change > self.threshold {
            Insight::warning(
                RuleType::Comparison,
                format!(
                    "{} is projected to increase by {:.1}%. Preventive measures recommended.",
                    label, change
                ),
            )
        } else if change < -self.threshold {
            Insight::success(
                RuleType::Comparison,
                format!(
                    "{} shows signs of improvement with a projected decrease of {:.1}%.",
                    label,
                    change.abs()
                ),
            )
        } else {
            Insight::info(
                RuleType::Comparison,
                format!(
                    "{} remains relatively stable with minor fluctuations ({:+.1}%).",
                    label, change
                ),
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
    use crate::models::{Attribute, Record, Source};
    use chrono::NaiveDateTime;

    fn ws(historical: &[f64], predicted: &[f64]) -> WorkingSet {
        let ts = NaiveDateTime::parse_from_str("2024-03-01 00:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let records = historical
            .iter()
            .map(|v| Record::new(ts, Source::Historical).with_value(Attribute::HeartRate, *v))
            .chain(
                predicted
                    .iter()
                    .map(|v| Record::new(ts, Source::Predicted).with_value(Attribute::HeartRate, *v)),
            )
            .collect();
        WorkingSet::from_records(Attribute::HeartRate, records)
    }

    fn run(set: &WorkingSet, filter: SourceFilter) -> Option<Insight> {
        let ctx = AnalysisContext::new(set, Attribute::HeartRate, filter);
        ComparisonRule::new().evaluate(&ctx)
    }

    #[test]
    fn test_increase_is_warning() {
        let insight = run(&ws(&[100.0], &[120.0]), SourceFilter::Both).unwrap();
        assert_eq!(insight.kind, InsightKind::Warning);
        assert_eq!(
            insight.message,
            "Heart Rate is projected to increase by 20.0%. Preventive measures recommended."
        );
    }

    #[test]
    fn test_decrease_is_success() {
        let insight = run(&ws(&[100.0], &[75.0]), SourceFilter::Both).unwrap();
        assert_eq!(insight.kind, InsightKind::Success);
        assert!(insight.message.contains("projected decrease of 25.0%"));
    }

    #[test]
    fn test_small_change_is_stable() {
        let insight = run(&ws(&[100.0], &[105.0]), SourceFilter::Both).unwrap();
        assert_eq!(insight.kind, InsightKind::Info);
        assert!(insight.message.contains("(+5.0%)"));

        // Exactly at the threshold is still stable
        let edge = run(&ws(&[100.0], &[110.0]), SourceFilter::Both).unwrap();
        assert_eq!(edge.kind, InsightKind::Info);
    }

    #[test]
    fn test_skipped_without_both_sources() {
        assert!(run(&ws(&[100.0], &[]), SourceFilter::Both).is_none());
        assert!(run(&ws(&[100.0], &[150.0]), SourceFilter::Historical).is_none());
        assert!(run(&ws(&[0.0], &[10.0]), SourceFilter::Both).is_none());
    }

    #[test]
    fn test_custom_threshold() {
        let rule = ComparisonRule::with_thresholds(InsightThresholds {
            change_percent: 3.0,
            ..Default::default()
        });
        let set = ws(&[100.0], &[105.0]);
        let ctx = AnalysisContext::new(&set, Attribute::HeartRate, SourceFilter::Both);
        assert_eq!(rule.evaluate(&ctx).unwrap().kind, InsightKind::Warning);
    }
}
