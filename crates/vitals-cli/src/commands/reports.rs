//! Report command implementations

use anyhow::{Context, Result};
use vitals_core::{
    compute_histogram, compute_quartiles, compute_statistics, summarize_by_source,
    FilterCriteria, QuartileSummary, Session, Source,
};

use super::{bar, fmt_value, print_source_banner};

pub fn cmd_summary(session: &Session, criteria: &FilterCriteria) -> Result<()> {
    let ws = session.working_set(criteria);
    let metrics = compute_statistics(&ws, criteria.attribute, criteria);

    println!();
    println!("📊 {} Summary ({})", metrics.label, metrics.unit);
    print_source_banner(session, criteria);
    println!("   ─────────────────────────────────────────────────────────────");

    if ws.is_empty() {
        println!("   No data available for the selected filters.");
        return Ok(());
    }

    println!("   Average:   {}", fmt_value(metrics.average));
    println!("   Minimum:   {}", fmt_value(metrics.min));
    println!("   Maximum:   {}", fmt_value(metrics.max));
    println!("   Std dev:   {}", fmt_value(metrics.std_dev));
    println!(
        "   Records:   {} ({} historical, {} predicted)",
        metrics.total_records, metrics.historical_records, metrics.predicted_records
    );
    println!("   Span:      {} days", metrics.date_span_days);
    if let Some(change) = metrics.change_percent {
        println!("   Change:    {:+.1}% (predicted vs historical mean)", change);
    }

    let rows = summarize_by_source(&ws);
    println!();
    println!(
        "   {:10} │ {:>6} │ {:>8} │ {:>8} │ {:>8} │ {:>8} │ {:>8}",
        "Source", "Count", "Mean", "Std", "Min", "Max", "Median"
    );
    println!("   ───────────┼────────┼──────────┼──────────┼──────────┼──────────┼─────────");
    for row in rows {
        println!(
            "   {:10} │ {:>6} │ {:>8.2} │ {:>8} │ {:>8.2} │ {:>8.2} │ {:>8.2}",
            row.source.label(),
            row.count,
            row.mean,
            fmt_value(row.std_dev),
            row.min,
            row.max,
            row.median
        );
    }

    Ok(())
}

pub fn cmd_histogram(session: &Session, criteria: &FilterCriteria) -> Result<()> {
    let ws = session.working_set(criteria);
    let histogram = compute_histogram(&ws);

    println!();
    println!("📶 {} Distribution", criteria.attribute.label());
    print_source_banner(session, criteria);
    println!("   ─────────────────────────────────────────────────────────────");

    if histogram.bins.is_empty() {
        println!("   No data available for the selected filters.");
        return Ok(());
    }

    let max = histogram.bins.iter().map(|b| b.total).max().unwrap_or(0);
    println!(
        "   {:>17} │ {:>5} │ {:>5} │",
        "Range", "Hist", "Pred"
    );
    println!("   ──────────────────┼───────┼───────┼──────────────────────────────");
    for bin in &histogram.bins {
        println!(
            "   {:>7.1} - {:>7.1} │ {:>5} │ {:>5} │ {}",
            bin.lower,
            bin.upper,
            bin.historical,
            bin.predicted,
            bar(bin.total, max, 30)
        );
    }

    Ok(())
}

fn print_quartile_row(source: Source, summary: Option<&QuartileSummary>) {
    match summary {
        Some(q) => println!(
            "   {:10} │ {:>6} │ {:>8.2} │ {:>8.2} │ {:>8.2} │ {:>8.2} │ {:>8.2}",
            source.label(),
            q.count,
            q.min,
            q.q1,
            q.median,
            q.q3,
            q.max
        ),
        None => println!("   {:10} │ {:>6} │", source.label(), 0),
    }
}

pub fn cmd_quartiles(session: &Session, criteria: &FilterCriteria) -> Result<()> {
    let ws = session.working_set(criteria);
    let report = compute_quartiles(&ws, criteria.source_filter);

    println!();
    println!("📦 {} Quartiles", criteria.attribute.label());
    print_source_banner(session, criteria);
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   {:10} │ {:>6} │ {:>8} │ {:>8} │ {:>8} │ {:>8} │ {:>8}",
        "Source", "Count", "Min", "Q1", "Median", "Q3", "Max"
    );
    println!("   ───────────┼────────┼──────────┼──────────┼──────────┼──────────┼─────────");

    for source in Source::ALL {
        if criteria.source_filter.includes(source) {
            print_quartile_row(source, report.get(source));
        }
    }

    Ok(())
}

pub fn cmd_analyze(session: &Session, criteria: &FilterCriteria, json: bool) -> Result<()> {
    if json {
        let analysis = session.analyze(criteria);
        let output =
            serde_json::to_string_pretty(&analysis).context("Failed to serialize analysis")?;
        println!("{}", output);
        return Ok(());
    }

    cmd_summary(session, criteria)?;
    cmd_quartiles(session, criteria)?;
    super::cmd_insights(session, criteria)
}
