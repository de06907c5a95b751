//! Pull request importance classification
//!
//! Assigns each PR an importance tier from its size, touched paths, labels and
//! title keywords, and cross-tabulates tiers against review quality.
//!
//! The matrix is what makes review counts comparable across PRs: a typo fix
//! with one ACK and a consensus change with one ACK are not the same outcome.

pub mod importance;
pub mod matrix;

pub use importance::{Classification, ImportanceTier, PrClassifier, SizeBucket};
pub use matrix::{QualityMatrix, ReviewQuality};
