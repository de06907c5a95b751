//! Text (terminal) reporter

use super::{ClassifiedPr, ScoreReport};
use crate::classifier::{ImportanceTier, ReviewQuality};
use console::style;
use std::fmt::Write as _;

/// Rows shown in the "least reviewed" listing
const WORST_LISTED: usize = 10;

fn pct(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

fn tier_label(tier: ImportanceTier) -> String {
    let label = format!("{:<9}", tier.to_string());
    match tier {
        ImportanceTier::Critical => style(label).red().bold().to_string(),
        ImportanceTier::High => style(label).yellow().to_string(),
        ImportanceTier::Normal => label,
        ImportanceTier::Low | ImportanceTier::Trivial => style(label).dim().to_string(),
    }
}

/// Render a score report as terminal output
pub fn render(report: &ScoreReport) -> String {
    let s = &report.summary;
    let mut out = String::new();

    let _ = writeln!(out, "\n{}", style("Review Weight").bold());
    let _ = writeln!(out, "{}", style("──────────────────────────────────────").dim());
    let _ = writeln!(
        out,
        "PRs: {}  Merged: {}  Skipped records: {}",
        style(s.total_prs).bold(),
        s.merged_prs,
        report.skipped_records
    );
    let _ = writeln!(
        out,
        "Meaningful review: {} ({})  Without: {} ({})",
        s.with_meaningful_review,
        style(pct(s.meaningful_rate)).green(),
        s.without_meaningful_review,
        style(pct(s.no_meaningful_rate)).red()
    );
    let _ = writeln!(
        out,
        "Zero review signal: {} ({})  Mean weighted count: {:.2}  Completion ACKs: {}\n",
        s.zero_review,
        pct(s.zero_review_rate),
        s.mean_weighted_count,
        s.suppressed_acks
    );

    if !s.by_year.is_empty() {
        let _ = writeln!(out, "{}", style("BY YEAR").bold());
        let _ = writeln!(out, "  year    PRs  meaningful   zero  mean");
        for (year, y) in &s.by_year {
            let _ = writeln!(
                out,
                "  {}  {:>5}  {:>10}  {:>5}  {:.2}",
                year,
                y.total,
                pct(y.meaningful_rate),
                y.zero_review,
                y.mean_weighted_count
            );
        }
        if s.unknown_year > 0 {
            let _ = writeln!(out, "  {}", style(format!("{} PRs with unknown creation date", s.unknown_year)).dim());
        }
        out.push('\n');
    }

    let _ = writeln!(out, "{}", style("IMPORTANCE x REVIEW QUALITY").bold());
    let _ = write!(out, "  {:<9}", "");
    for q in ReviewQuality::all() {
        let _ = write!(out, " {:>9}", q.to_string());
    }
    let _ = writeln!(out, " {:>7}", "under");
    for tier in ImportanceTier::all().iter().rev() {
        let _ = write!(out, "  {}", tier_label(*tier));
        for q in ReviewQuality::all() {
            let _ = write!(out, " {:>9}", s.matrix.count(*tier, *q));
        }
        let under = s
            .matrix
            .under_reviewed_rate(*tier)
            .map(pct)
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(out, " {:>7}", under);
    }

    let mut worst: Vec<_> = report
        .results
        .iter()
        .filter(|r| !r.has_meaningful_review && r.importance >= ImportanceTier::High)
        .collect();
    worst.sort_by(|a, b| {
        b.importance
            .cmp(&a.importance)
            .then(a.weighted_review_count.total_cmp(&b.weighted_review_count))
            .then(a.number.cmp(&b.number))
    });
    if !worst.is_empty() {
        let _ = writeln!(
            out,
            "\n{} ({} total)",
            style("IMPORTANT PRS WITHOUT MEANINGFUL REVIEW").bold(),
            worst.len()
        );
        for r in worst.iter().take(WORST_LISTED) {
            let _ = writeln!(
                out,
                "  #{:<6} {} weighted {:.2}  reviewers {}",
                r.number,
                tier_label(r.importance),
                r.weighted_review_count,
                r.reviewer_count()
            );
        }
    }

    out
}

/// Render classifier output as a table
pub fn render_classifications(rows: &[ClassifiedPr]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", style("PR IMPORTANCE").bold());
    for row in rows {
        let c = &row.classification;
        let mut signals = Vec::new();
        if c.critical_signal {
            signals.push("critical-keyword");
        }
        if c.housekeeping {
            signals.push("housekeeping");
        }
        if c.docs_only {
            signals.push("docs-only");
        }
        if c.touches_consensus {
            signals.push("consensus");
        }
        let _ = writeln!(
            out,
            "  #{:<6} {} {:>6} lines  {}  {}",
            row.number,
            tier_label(c.tier),
            c.lines_changed,
            row.title,
            style(signals.join(",")).dim()
        );
    }

    let mut counts = std::collections::BTreeMap::new();
    for row in rows {
        *counts.entry(row.classification.tier).or_insert(0usize) += 1;
    }
    let totals: Vec<String> = counts
        .iter()
        .rev()
        .map(|(tier, n)| format!("{}: {}", tier, n))
        .collect();
    let _ = writeln!(out, "\n{} PRs  {}", rows.len(), totals.join("  "));
    out
}
