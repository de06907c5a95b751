//! Weighted review-count engine
//!
//! Wires extraction, reconciliation, aggregation and classification into a
//! single per-PR result. The engine owns the cross-platform index and is
//! built once per batch; scoring a PR never mutates it, so PRs can be scored
//! in parallel.

use chrono::{DateTime, Datelike, Utc};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::aggregate::{weighted_review_count, ReviewAggregator};
use crate::classifier::{ImportanceTier, PrClassifier, ReviewQuality};
use crate::config::ProjectConfig;
use crate::events::{
    CrossPlatformIndex, EventExtractor, EventKind, ReviewerScoreMap, TemporalReconciler,
};
use crate::models::PullRequest;

/// Review assessment for one pull request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrReviewScore {
    pub number: u64,
    pub author: String,
    /// Creation year, when the creation time resolves
    pub year: Option<i32>,
    pub merged: bool,
    pub pre_review_era: bool,
    pub weighted_review_count: f64,
    pub has_meaningful_review: bool,
    pub importance: ImportanceTier,
    pub review_quality: ReviewQuality,
    pub reviewers: ReviewerScoreMap,
    /// ACKs treated as completion signals
    pub suppressed_acks: usize,
    pub event_counts: BTreeMap<EventKind, usize>,
}

impl PrReviewScore {
    pub fn reviewer_count(&self) -> usize {
        self.reviewers.len()
    }
}

pub struct ReviewEngine {
    index: CrossPlatformIndex,
    review_cutoff: DateTime<Utc>,
    reconciler: TemporalReconciler,
    aggregator: ReviewAggregator,
    classifier: PrClassifier,
}

impl ReviewEngine {
    pub fn new(config: &ProjectConfig, index: CrossPlatformIndex) -> Self {
        let review_cutoff = config.era.cutoff();
        Self {
            index,
            review_cutoff,
            reconciler: TemporalReconciler::new(config.thresholds.substantial_review),
            aggregator: ReviewAggregator::new(review_cutoff, &config.thresholds),
            classifier: PrClassifier::new(&config.classifier),
        }
    }

    pub fn index(&self) -> &CrossPlatformIndex {
        &self.index
    }

    pub fn extractor(&self) -> EventExtractor<'_> {
        EventExtractor::new(&self.index, self.review_cutoff)
    }

    pub fn score(&self, pr: &PullRequest) -> PrReviewScore {
        let extractor = self.extractor();
        let events = extractor.extract(pr);

        let mut event_counts = BTreeMap::new();
        for event in &events {
            *event_counts.entry(event.kind()).or_insert(0) += 1;
        }

        let reconciliation = self.reconciler.reconcile(&events);
        let weighted = weighted_review_count(&reconciliation.scores);
        let meaningful = self.aggregator.has_meaningful_review(pr, weighted);

        PrReviewScore {
            number: pr.number,
            author: pr.author.to_lowercase(),
            year: pr.created().map(|c| c.year()),
            merged: pr.is_merged(),
            pre_review_era: extractor.is_pre_review_era(pr),
            weighted_review_count: weighted,
            has_meaningful_review: meaningful,
            importance: self.classifier.classify(pr),
            review_quality: ReviewQuality::bucket(weighted, meaningful),
            reviewers: reconciliation.scores,
            suppressed_acks: reconciliation.suppressed.len(),
            event_counts,
        }
    }

    /// Score every PR in parallel, preserving input order.
    pub fn score_all(&self, prs: &[PullRequest]) -> Vec<PrReviewScore> {
        prs.par_iter().map(|pr| self.score(pr)).collect()
    }

    pub fn classify(&self, pr: &PullRequest) -> ImportanceTier {
        self.classifier.classify(pr)
    }

    pub fn classifier(&self) -> &PrClassifier {
        &self.classifier
    }
}
