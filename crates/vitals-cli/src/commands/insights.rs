//! Insight command implementation

use anyhow::Result;
use vitals_core::{FilterCriteria, InsightKind, Session};

use super::print_source_banner;

fn kind_icon(kind: InsightKind) -> &'static str {
    match kind {
        InsightKind::Warning => "⚠️ ",
        InsightKind::Success => "✅",
        InsightKind::Info => "ℹ️ ",
    }
}

pub fn cmd_insights(session: &Session, criteria: &FilterCriteria) -> Result<()> {
    let insights = session.insights(criteria);

    println!();
    println!("🔍 Insights");
    print_source_banner(session, criteria);
    println!("   ─────────────────────────────────────────────────────────────");

    if insights.is_empty() {
        println!("   No data available for the selected filters.");
        return Ok(());
    }

    for insight in &insights {
        println!(
            "   {} [{}] {}",
            kind_icon(insight.kind),
            insight.rule,
            insight.message
        );
    }

    Ok(())
}
