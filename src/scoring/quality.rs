//! Per-event quality scores
//!
//! Every function here looks at a single event in isolation and returns a
//! score in [0, 1]. Missing text is scored as the empty string; nothing fails.

use crate::models::ReviewState;
use regex::Regex;
use std::sync::OnceLock;

static ACK_PATTERN: OnceLock<Regex> = OnceLock::new();
static HASH_PATTERN: OnceLock<Regex> = OnceLock::new();
static HIGH_KEYWORDS: OnceLock<Regex> = OnceLock::new();
static MEDIUM_KEYWORDS: OnceLock<Regex> = OnceLock::new();
static LOW_KEYWORDS: OnceLock<Regex> = OnceLock::new();

/// Words that signal someone actually looked at the code.
pub const HIGH_SIGNAL_KEYWORDS: &[&str] = &[
    "review",
    "reviewed",
    "reviewing",
    "ack",
    "utack",
    "tack",
    "cr-ack",
    "nack",
    "lgtm",
    "tested",
    "looks good",
    "code review",
];

/// Words about the PR's process rather than its content.
pub const MEDIUM_SIGNAL_KEYWORDS: &[&str] = &[
    "merge",
    "merged",
    "merging",
    "approve",
    "approved",
    "comment",
    "comments",
    "feedback",
    "rebase",
    "nit",
    "concerns",
];

/// Generic references to a PR or issue.
pub const LOW_SIGNAL_KEYWORDS: &[&str] = &["pr", "pull", "pull request", "issue", "patch"];

fn keyword_regex(words: &[&str]) -> Regex {
    let alternation = words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternation)).expect("valid regex")
}

/// `ACK` as a standalone word, any case, optionally followed by punctuation.
/// `NACK`, `utACK` and `tACK` do not match: the word boundary sits before `a`.
pub fn ack_pattern() -> &'static Regex {
    ACK_PATTERN.get_or_init(|| Regex::new(r"(?i)\back\b[.!:,;]?").expect("valid regex"))
}

fn hash_pattern() -> &'static Regex {
    HASH_PATTERN.get_or_init(|| Regex::new(r"(?i)\b[0-9a-f]{7,40}\b").expect("valid regex"))
}

fn high_keywords() -> &'static Regex {
    HIGH_KEYWORDS.get_or_init(|| keyword_regex(HIGH_SIGNAL_KEYWORDS))
}

fn medium_keywords() -> &'static Regex {
    MEDIUM_KEYWORDS.get_or_init(|| keyword_regex(MEDIUM_SIGNAL_KEYWORDS))
}

fn low_keywords() -> &'static Regex {
    LOW_KEYWORDS.get_or_init(|| keyword_regex(LOW_SIGNAL_KEYWORDS))
}

/// Whether a comment body contains an ACK.
pub fn is_ack(body: &str) -> bool {
    ack_pattern().is_match(body)
}

/// Whether the text contains something shaped like a commit hash.
pub fn contains_commit_hash(text: &str) -> bool {
    hash_pattern().is_match(text)
}

/// Strongest keyword tier present in a cross-platform message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeywordTier {
    None,
    Low,
    Medium,
    High,
}

pub fn keyword_tier(text: &str) -> KeywordTier {
    if high_keywords().is_match(text) {
        KeywordTier::High
    } else if medium_keywords().is_match(text) {
        KeywordTier::Medium
    } else if low_keywords().is_match(text) {
        KeywordTier::Low
    } else {
        KeywordTier::None
    }
}

fn trimmed_len(text: &str) -> usize {
    text.trim().chars().count()
}

/// Score a formal GitHub review.
///
/// Only approvals and change requests earn the body-length tiers; anything
/// else is a weak "commented" signal.
pub fn score_formal_review(state: ReviewState, body: Option<&str>) -> f64 {
    let len = trimmed_len(body.unwrap_or(""));
    if !state.is_decisive() {
        return if len > 0 { 0.5 } else { 0.3 };
    }
    match len {
        l if l > 50 => 1.0,
        l if l > 10 => 0.8,
        l if l > 0 => 0.7,
        _ => 0.5, // rubber stamp
    }
}

/// Score a comment already known to match [`ack_pattern`].
pub fn score_ack_comment(body: &str) -> f64 {
    let len = trimmed_len(body);
    if len > 100 {
        0.5
    } else if len > 20 {
        0.4
    } else if contains_commit_hash(body) {
        0.3
    } else {
        0.2
    }
}

/// Score an IRC message or email that mentions a PR.
pub fn score_cross_platform_message(text: &str, is_known_maintainer: bool) -> f64 {
    let len = trimmed_len(text);
    let tier = keyword_tier(text);
    let has_high = tier == KeywordTier::High;

    if is_known_maintainer && has_high {
        match len {
            l if l > 100 => 1.0,
            l if l > 50 => 0.8,
            _ => 0.7,
        }
    } else if is_known_maintainer || has_high {
        if len > 50 {
            0.6
        } else {
            0.5
        }
    } else if tier == KeywordTier::Medium {
        0.3
    } else {
        0.2 // bare mention
    }
}
