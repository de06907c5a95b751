//! Batch-level statistics over scored pull requests

use serde::Serialize;
use std::collections::BTreeMap;

use crate::classifier::QualityMatrix;
use crate::engine::PrReviewScore;

fn rate(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// Review coverage for PRs created in one calendar year.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct YearStats {
    pub total: usize,
    pub with_meaningful_review: usize,
    pub zero_review: usize,
    pub mean_weighted_count: f64,
    pub meaningful_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total_prs: usize,
    pub merged_prs: usize,
    pub with_meaningful_review: usize,
    pub without_meaningful_review: usize,
    /// PRs whose weighted count is exactly zero
    pub zero_review: usize,
    pub meaningful_rate: f64,
    pub no_meaningful_rate: f64,
    pub zero_review_rate: f64,
    pub mean_weighted_count: f64,
    pub suppressed_acks: usize,
    pub by_year: BTreeMap<i32, YearStats>,
    /// PRs with no resolvable creation time
    pub unknown_year: usize,
    pub matrix: QualityMatrix,
}

impl BatchSummary {
    pub fn from_scores(scores: &[PrReviewScore]) -> Self {
        let mut summary = BatchSummary {
            total_prs: scores.len(),
            ..Default::default()
        };
        let mut weighted_total = 0.0;
        let mut year_weighted: BTreeMap<i32, f64> = BTreeMap::new();

        for score in scores {
            weighted_total += score.weighted_review_count;
            summary.suppressed_acks += score.suppressed_acks;
            if score.merged {
                summary.merged_prs += 1;
            }
            if score.has_meaningful_review {
                summary.with_meaningful_review += 1;
            }
            let zero = score.weighted_review_count == 0.0;
            if zero {
                summary.zero_review += 1;
            }
            summary.matrix.record(score.importance, score.review_quality);

            match score.year {
                Some(year) => {
                    let stats = summary.by_year.entry(year).or_default();
                    stats.total += 1;
                    if score.has_meaningful_review {
                        stats.with_meaningful_review += 1;
                    }
                    if zero {
                        stats.zero_review += 1;
                    }
                    *year_weighted.entry(year).or_insert(0.0) += score.weighted_review_count;
                }
                None => summary.unknown_year += 1,
            }
        }

        for (year, stats) in summary.by_year.iter_mut() {
            let weighted = year_weighted.get(year).copied().unwrap_or(0.0);
            stats.mean_weighted_count = weighted / stats.total as f64;
            stats.meaningful_rate = rate(stats.with_meaningful_review, stats.total);
        }

        summary.without_meaningful_review = summary.total_prs - summary.with_meaningful_review;
        summary.meaningful_rate = rate(summary.with_meaningful_review, summary.total_prs);
        summary.no_meaningful_rate = rate(summary.without_meaningful_review, summary.total_prs);
        summary.zero_review_rate = rate(summary.zero_review, summary.total_prs);
        if summary.total_prs > 0 {
            summary.mean_weighted_count = weighted_total / summary.total_prs as f64;
        }
        summary
    }
}
