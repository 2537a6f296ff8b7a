//! Insight Engine - runs the registered rules in order

use tracing::debug;

use crate::filter::WorkingSet;
use crate::models::{Attribute, SourceFilter};

use super::types::{Insight, InsightThresholds, RuleType};
use super::{ComparisonRule, OutlierRule, TrendRule, VariabilityRule};

/// Context provided to insight rules
pub struct AnalysisContext<'a> {
    /// Records that passed the active filter
    pub working_set: &'a WorkingSet,
    /// Attribute under analysis
    pub attribute: Attribute,
    /// Source selection of the active filter
    pub source_filter: SourceFilter,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(
        working_set: &'a WorkingSet,
        attribute: Attribute,
        source_filter: SourceFilter,
    ) -> Self {
        Self {
            working_set,
            attribute,
            source_filter,
        }
    }

    /// Readings for the analyzed attribute, in series order
    pub fn values(&self) -> Vec<f64> {
        self.working_set
            .records()
            .iter()
            .filter_map(|r| r.value(self.attribute))
            .collect()
    }

    pub fn label(&self) -> &'static str {
        self.attribute.label()
    }
}

/// Trait for insight rules
pub trait InsightRule: Send + Sync {
    /// Unique identifier for this rule
    fn rule_type(&self) -> RuleType;

    /// Human-readable name
    fn name(&self) -> &'static str;

    /// Evaluate the rule; `None` when it has nothing to say
    fn evaluate(&self, ctx: &AnalysisContext<'_>) -> Option<Insight>;
}

/// Runs rules in registration order. The order of the output is the order
/// of registration, not a severity ranking.
pub struct InsightEngine {
    rules: Vec<Box<dyn InsightRule>>,
}

impl Default for InsightEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightEngine {
    /// Create an engine with the built-in rules and default thresholds
    pub fn new() -> Self {
        Self::with_thresholds(InsightThresholds::default())
    }

    /// Create an engine with the built-in rules and custom thresholds
    pub fn with_thresholds(thresholds: InsightThresholds) -> Self {
        let mut engine = Self { rules: vec![] };

        // Built-in rules, in output order
        engine.register(Box::new(ComparisonRule::with_thresholds(thresholds)));
        engine.register(Box::new(TrendRule::with_thresholds(thresholds)));
        engine.register(Box::new(VariabilityRule::with_thresholds(thresholds)));
        engine.register(Box::new(OutlierRule::with_thresholds(thresholds)));

        engine
    }

    /// Create an engine with no rules registered
    pub fn empty() -> Self {
        Self { rules: vec![] }
    }

    /// Append a rule; it runs after every rule already registered
    pub fn register(&mut self, rule: Box<dyn InsightRule>) {
        self.rules.push(rule);
    }

    /// Registered rules, in evaluation order
    pub fn rule_types(&self) -> Vec<RuleType> {
        self.rules.iter().map(|r| r.rule_type()).collect()
    }

    /// Run every rule. An empty working set produces no insights.
    pub fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Insight> {
        if ctx.working_set.is_empty() {
            debug!("Empty working set, skipping insight rules");
            return vec![];
        }

        let mut insights = Vec::with_capacity(self.rules.len());
        for rule in &self.rules {
            if let Some(insight) = rule.evaluate(ctx) {
                debug!(
                    rule = rule.rule_type().as_str(),
                    kind = insight.kind.as_str(),
                    "Insight generated"
                );
                insights.push(insight);
            }
        }
        insights
    }
}

/// Run the default engine over a working set
pub fn generate_insights(
    working_set: &WorkingSet,
    attribute: Attribute,
    source_filter: SourceFilter,
) -> Vec<Insight> {
    let ctx = AnalysisContext::new(working_set, attribute, source_filter);
    InsightEngine::new().analyze(&ctx)
}
