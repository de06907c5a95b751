//! PR-level review aggregation
//!
//! Collapses a reconciled [`ReviewerScoreMap`] into the weighted review count
//! and decides whether that count amounts to meaningful review.

use chrono::{DateTime, Utc};

use crate::config::ThresholdConfig;
use crate::events::ReviewerScoreMap;
use crate::models::PullRequest;

/// Sum of per-reviewer best scores. Uncapped: five substantial reviewers give
/// a count near 5. This is an effort proxy, not a probability.
pub fn weighted_review_count(scores: &ReviewerScoreMap) -> f64 {
    scores.values().sum()
}

#[derive(Debug, Clone)]
pub struct ReviewAggregator {
    review_cutoff: DateTime<Utc>,
    meaningful_pre_review_era: f64,
    meaningful: f64,
}

impl ReviewAggregator {
    pub fn new(review_cutoff: DateTime<Utc>, thresholds: &ThresholdConfig) -> Self {
        Self {
            review_cutoff,
            meaningful_pre_review_era: thresholds.meaningful_pre_review_era,
            meaningful: thresholds.meaningful,
        }
    }

    /// Meaningful-review bar for this PR's era. Before formal reviews existed
    /// the only signals were comments, so the bar is lower.
    pub fn threshold_for(&self, pr: &PullRequest) -> f64 {
        match pr.created() {
            Some(created) if created < self.review_cutoff => self.meaningful_pre_review_era,
            _ => self.meaningful,
        }
    }

    /// Whether `weighted_count` reaches the PR's era threshold.
    ///
    /// A nonzero count can still fall short: a single bare ACK (0.2) is not
    /// meaningful review in either era.
    pub fn has_meaningful_review(&self, pr: &PullRequest, weighted_count: f64) -> bool {
        weighted_count >= self.threshold_for(pr)
    }
}
