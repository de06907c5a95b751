//! review-weight - quality-weighted review counts
//!
//! Measures how much review a pull request actually received. Formal GitHub
//! reviews, ACK comments, IRC mentions and mailing-list emails are each scored
//! for evidence quality, reconciled per reviewer in time order, and summed
//! into a weighted review count. A PR has *meaningful review* when that count
//! reaches its era's threshold.
//!
//! ```no_run
//! use review_weight::config::ProjectConfig;
//! use review_weight::engine::ReviewEngine;
//! use review_weight::events::CrossPlatformIndex;
//! use review_weight::loader::load_pull_requests;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = ProjectConfig::default();
//! let index = CrossPlatformIndex::new(config.maintainers.handle_set());
//! let engine = ReviewEngine::new(&config, index);
//! let (prs, _) = load_pull_requests(std::path::Path::new("prs.jsonl"))?;
//! for score in engine.score_all(&prs) {
//!     println!("#{} {:.2}", score.number, score.weighted_review_count);
//! }
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod events;
pub mod loader;
pub mod models;
pub mod reporters;
pub mod scoring;
pub mod summary;
