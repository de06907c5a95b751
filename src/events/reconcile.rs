//! Temporal reconciliation of feedback events
//!
//! Replays a PR's events in chronological order and keeps the best score per
//! reviewer. Scores merge by MAX, never SUM: one person reviewing twice is
//! still one reviewer.
//!
//! The order matters for ACK comments only. An ACK from someone who already
//! left a substantial formal review (score >= threshold) is that reviewer
//! closing out their own review, a *completion signal*, and adds nothing.
//! Any other ACK is standalone evidence.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use super::FeedbackEvent;

/// Reviewer identity -> best quality score.
pub type ReviewerScoreMap = BTreeMap<String, f64>;

/// Default score a prior review needs before a later ACK is a completion signal.
pub const SUBSTANTIAL_REVIEW_THRESHOLD: f64 = 0.7;

/// An ACK that was treated as a completion signal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuppressedAck {
    pub reviewer: String,
    pub at: DateTime<Utc>,
}

/// Result of reconciling one PR.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Reconciliation {
    pub scores: ReviewerScoreMap,
    /// Diagnostic only; does not affect the scores.
    pub suppressed: Vec<SuppressedAck>,
}

#[derive(Debug, Clone, Copy)]
pub struct TemporalReconciler {
    substantial_review: f64,
}

impl Default for TemporalReconciler {
    fn default() -> Self {
        Self::new(SUBSTANTIAL_REVIEW_THRESHOLD)
    }
}

impl TemporalReconciler {
    pub fn new(substantial_review: f64) -> Self {
        Self { substantial_review }
    }

    /// Reconcile events into per-reviewer best scores.
    ///
    /// Events are stable-sorted by timestamp, so equal timestamps keep their
    /// input order.
    pub fn reconcile(&self, events: &[FeedbackEvent]) -> Reconciliation {
        let mut ordered: Vec<&FeedbackEvent> = events.iter().collect();
        ordered.sort_by_key(|e| e.at());

        let mut result = Reconciliation::default();
        for (i, event) in ordered.iter().enumerate() {
            match event {
                FeedbackEvent::Review { signal, .. }
                | FeedbackEvent::IrcMention(signal)
                | FeedbackEvent::EmailMention(signal) => {
                    merge_max(&mut result.scores, &signal.reviewer, signal.score);
                }
                FeedbackEvent::AckComment(signal) => {
                    if self.has_substantial_review_before(&ordered[..i], &signal.reviewer) {
                        debug!(
                            "ACK from {} at {} is a completion signal",
                            signal.reviewer, signal.at
                        );
                        result.suppressed.push(SuppressedAck {
                            reviewer: signal.reviewer.clone(),
                            at: signal.at,
                        });
                    } else {
                        merge_max(&mut result.scores, &signal.reviewer, signal.score);
                    }
                }
            }
        }
        result
    }

    /// Whether any of `earlier` is a formal review by `reviewer` at or above
    /// the substantial threshold.
    fn has_substantial_review_before(&self, earlier: &[&FeedbackEvent], reviewer: &str) -> bool {
        earlier.iter().any(|e| match e {
            FeedbackEvent::Review { signal, .. } => {
                signal.reviewer == reviewer && signal.score >= self.substantial_review
            }
            _ => false,
        })
    }
}

fn merge_max(scores: &mut ReviewerScoreMap, reviewer: &str, score: f64) {
    scores
        .entry(reviewer.to_string())
        .and_modify(|best| *best = best.max(score))
        .or_insert(score);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReviewState;
    use chrono::TimeZone;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn review(who: &str, score: f64, secs: i64) -> FeedbackEvent {
        FeedbackEvent::review(who, t(secs), score, ReviewState::Approved)
    }

    fn ack(who: &str, score: f64, secs: i64) -> FeedbackEvent {
        FeedbackEvent::ack(who, t(secs), score)
    }

    #[test]
    fn test_ack_after_substantial_review_is_completion_signal() {
        let events = vec![review("A", 0.9, 1), ack("A", 0.5, 2)];
        let result = TemporalReconciler::default().reconcile(&events);
        assert_eq!(result.scores.get("a"), Some(&0.9));
        assert_eq!(result.scores.values().sum::<f64>(), 0.9);
        assert_eq!(result.suppressed.len(), 1);
        assert_eq!(result.suppressed[0].reviewer, "a");
        assert_eq!(result.suppressed[0].at, t(2));
    }

    #[test]
    fn test_ack_without_prior_review_is_standalone() {
        let result = TemporalReconciler::default().reconcile(&[ack("B", 0.5, 1)]);
        assert_eq!(result.scores.get("b"), Some(&0.5));
        assert!(result.suppressed.is_empty());
    }

    #[test]
    fn test_ack_after_weak_review_is_standalone() {
        let events = vec![review("C", 0.5, 1), ack("C", 0.4, 2)];
        let result = TemporalReconciler::default().reconcile(&events);
        assert_eq!(result.scores.get("c"), Some(&0.5));
        assert!(result.suppressed.is_empty());
    }

    #[test]
    fn test_repeated_reviews_take_max() {
        let events = vec![review("D", 0.8, 1), review("D", 1.0, 2), review("D", 0.5, 3)];
        let result = TemporalReconciler::default().reconcile(&events);
        assert_eq!(result.scores.get("d"), Some(&1.0));
        assert_eq!(result.scores.len(), 1);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let events = vec![review("E", 0.7, 1), ack("E", 0.5, 2)];
        let result = TemporalReconciler::default().reconcile(&events);
        assert_eq!(result.suppressed.len(), 1);
    }

    #[test]
    fn test_ack_before_review_counts_then_review_maxes() {
        // Input order is scrambled; chronological order puts the ACK first.
        let events = vec![review("F", 0.8, 5), ack("F", 0.4, 1)];
        let result = TemporalReconciler::default().reconcile(&events);
        assert!(result.suppressed.is_empty());
        assert_eq!(result.scores.get("f"), Some(&0.8));
    }

    #[test]
    fn test_each_ack_checks_all_earlier_events() {
        // Two ACKs after one substantial review: both suppressed, even though
        // the first ACK did not update anything.
        let events = vec![review("G", 1.0, 1), ack("G", 0.2, 2), ack("G", 0.5, 3)];
        let result = TemporalReconciler::default().reconcile(&events);
        assert_eq!(result.suppressed.len(), 2);
        assert_eq!(result.scores.get("g"), Some(&1.0));
    }

    #[test]
    fn test_cross_platform_never_suppresses_acks() {
        // A strong IRC mention is not a formal review.
        let events = vec![
            FeedbackEvent::irc("H", t(1), 1.0),
            ack("H", 0.4, 2),
        ];
        let result = TemporalReconciler::default().reconcile(&events);
        assert!(result.suppressed.is_empty());
        assert_eq!(result.scores.get("h"), Some(&1.0));
    }

    #[test]
    fn test_other_reviewers_review_does_not_suppress() {
        let events = vec![review("I", 1.0, 1), ack("J", 0.3, 2)];
        let result = TemporalReconciler::default().reconcile(&events);
        assert!(result.suppressed.is_empty());
        assert_eq!(result.scores.get("j"), Some(&0.3));
        assert_eq!(result.scores.len(), 2);
    }

    #[test]
    fn test_cross_platform_merges_with_github_identity() {
        let events = vec![
            review("K", 0.5, 1),
            FeedbackEvent::email("k", t(2), 0.6),
            FeedbackEvent::irc("k", t(3), 0.2),
        ];
        let result = TemporalReconciler::default().reconcile(&events);
        assert_eq!(result.scores.get("k"), Some(&0.6));
    }

    #[test]
    fn test_same_timestamp_keeps_input_order() {
        // ACK listed after the review at the same instant: the review is
        // "earlier", so the ACK is a completion signal.
        let events = vec![review("L", 0.9, 1), ack("L", 0.5, 1)];
        let result = TemporalReconciler::default().reconcile(&events);
        assert_eq!(result.suppressed.len(), 1);

        // Reversed input order: the ACK comes first and stands alone.
        let events = vec![ack("L", 0.5, 1), review("L", 0.9, 1)];
        let result = TemporalReconciler::default().reconcile(&events);
        assert!(result.suppressed.is_empty());
        assert_eq!(result.scores.get("l"), Some(&0.9));
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let events = vec![
            review("M", 0.8, 3),
            ack("N", 0.2, 1),
            FeedbackEvent::irc("O", t(2), 0.5),
            ack("M", 0.5, 4),
        ];
        let reconciler = TemporalReconciler::default();
        let first = reconciler.reconcile(&events);
        let second = reconciler.reconcile(&events);
        assert_eq!(first, second);
    }

    #[test]
    fn test_custom_threshold() {
        let events = vec![review("P", 0.8, 1), ack("P", 0.5, 2)];
        let result = TemporalReconciler::new(0.9).reconcile(&events);
        assert!(result.suppressed.is_empty());
        assert_eq!(result.scores.get("p"), Some(&0.8));
    }

    #[test]
    fn test_empty_events() {
        let result = TemporalReconciler::default().reconcile(&[]);
        assert!(result.scores.is_empty());
        assert!(result.suppressed.is_empty());
    }
}
