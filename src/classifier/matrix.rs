//! Importance × review-quality matrix
//!
//! Cross-tabulates how much review PRs of each importance tier received.
//! The interesting cells are the off-diagonal ones: critical PRs merged with
//! no meaningful review.

use serde::Serialize;
use std::collections::BTreeMap;

use super::ImportanceTier;

/// Weighted count at or above which review is considered thorough.
pub const THOROUGH_REVIEW_COUNT: f64 = 2.0;

/// Coarse review-quality bucket for one PR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewQuality {
    /// No review signal at all
    None,
    /// Some signal, below the meaningful-review bar
    Minimal,
    /// Meaningful, below two substantial reviewers' worth
    Adequate,
    Thorough,
}

impl ReviewQuality {
    pub fn all() -> &'static [ReviewQuality] {
        &[
            ReviewQuality::None,
            ReviewQuality::Minimal,
            ReviewQuality::Adequate,
            ReviewQuality::Thorough,
        ]
    }

    pub fn bucket(weighted_count: f64, meaningful: bool) -> Self {
        if weighted_count <= 0.0 {
            ReviewQuality::None
        } else if !meaningful {
            ReviewQuality::Minimal
        } else if weighted_count < THOROUGH_REVIEW_COUNT {
            ReviewQuality::Adequate
        } else {
            ReviewQuality::Thorough
        }
    }
}

impl std::fmt::Display for ReviewQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewQuality::None => write!(f, "none"),
            ReviewQuality::Minimal => write!(f, "minimal"),
            ReviewQuality::Adequate => write!(f, "adequate"),
            ReviewQuality::Thorough => write!(f, "thorough"),
        }
    }
}

/// PR counts per (importance, quality) cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QualityMatrix {
    cells: BTreeMap<ImportanceTier, BTreeMap<ReviewQuality, usize>>,
}

impl QualityMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, tier: ImportanceTier, quality: ReviewQuality) {
        *self
            .cells
            .entry(tier)
            .or_default()
            .entry(quality)
            .or_insert(0) += 1;
    }

    pub fn count(&self, tier: ImportanceTier, quality: ReviewQuality) -> usize {
        self.cells
            .get(&tier)
            .and_then(|row| row.get(&quality))
            .copied()
            .unwrap_or(0)
    }

    pub fn row_total(&self, tier: ImportanceTier) -> usize {
        self.cells.get(&tier).map(|row| row.values().sum()).unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.cells.values().flat_map(|row| row.values()).sum()
    }

    /// Share of a tier's PRs that lack meaningful review (none or minimal).
    pub fn under_reviewed_rate(&self, tier: ImportanceTier) -> Option<f64> {
        let total = self.row_total(tier);
        if total == 0 {
            return None;
        }
        let under = self.count(tier, ReviewQuality::None) + self.count(tier, ReviewQuality::Minimal);
        Some(under as f64 / total as f64)
    }
}
