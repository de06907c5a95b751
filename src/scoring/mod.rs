//! Evidence-quality scoring for review-like events
//!
//! Every feedback event gets a score in [0, 1] from its own fields alone.
//!
//! # Formal reviews
//!
//! ```text
//! approved / changes-requested:  >50 chars 1.0 | >10 0.8 | >0 0.7 | empty 0.5
//! anything else:                 body 0.5 | empty 0.3
//! ```
//!
//! # ACK comments
//!
//! ```text
//! >100 chars 0.5 | >20 0.4 | commit hash 0.3 | bare 0.2
//! ```
//!
//! # IRC / email mentions
//!
//! ```text
//! maintainer + high keyword:  >100 chars 1.0 | >50 0.8 | 0.7
//! maintainer or high keyword: >50 chars 0.6 | 0.5
//! medium keyword:             0.3
//! bare mention:               0.2
//! ```

pub mod quality;

pub use quality::{
    ack_pattern, contains_commit_hash, is_ack, keyword_tier, score_ack_comment,
    score_cross_platform_message, score_formal_review, KeywordTier,
};
