//! Feedback events and their per-PR reconciliation
//!
//! A pull request's review-like activity arrives in four shapes: formal
//! reviews, ACK comments, IRC mentions and mailing-list mentions. The
//! [`EventExtractor`] flattens them into [`FeedbackEvent`]s; the
//! [`TemporalReconciler`] replays them in time order and keeps each reviewer's
//! best score.

pub mod extract;
pub mod reconcile;

pub use extract::{CrossPlatformIndex, EventExtractor};
pub use reconcile::{Reconciliation, ReviewerScoreMap, SuppressedAck, TemporalReconciler};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::ReviewState;

/// The fields every event kind carries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signal {
    /// Case-folded identity, platform-local for IRC/email.
    pub reviewer: String,
    pub at: DateTime<Utc>,
    /// Quality score in [0, 1].
    pub score: f64,
}

impl Signal {
    pub fn new(reviewer: impl Into<String>, at: DateTime<Utc>, score: f64) -> Self {
        Self {
            reviewer: reviewer.into().to_lowercase(),
            at,
            score: score.clamp(0.0, 1.0),
        }
    }
}

/// One piece of review evidence for a pull request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeedbackEvent {
    Review {
        #[serde(flatten)]
        signal: Signal,
        state: ReviewState,
    },
    AckComment(Signal),
    IrcMention(Signal),
    EmailMention(Signal),
}

/// Discriminant of a [`FeedbackEvent`], for counting and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Review,
    AckComment,
    Irc,
    Email,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::Review => write!(f, "review"),
            EventKind::AckComment => write!(f, "ack_comment"),
            EventKind::Irc => write!(f, "irc"),
            EventKind::Email => write!(f, "email"),
        }
    }
}

impl FeedbackEvent {
    pub fn review(reviewer: impl Into<String>, at: DateTime<Utc>, score: f64, state: ReviewState) -> Self {
        FeedbackEvent::Review {
            signal: Signal::new(reviewer, at, score),
            state,
        }
    }

    pub fn ack(reviewer: impl Into<String>, at: DateTime<Utc>, score: f64) -> Self {
        FeedbackEvent::AckComment(Signal::new(reviewer, at, score))
    }

    pub fn irc(reviewer: impl Into<String>, at: DateTime<Utc>, score: f64) -> Self {
        FeedbackEvent::IrcMention(Signal::new(reviewer, at, score))
    }

    pub fn email(reviewer: impl Into<String>, at: DateTime<Utc>, score: f64) -> Self {
        FeedbackEvent::EmailMention(Signal::new(reviewer, at, score))
    }

    pub fn signal(&self) -> &Signal {
        match self {
            FeedbackEvent::Review { signal, .. } => signal,
            FeedbackEvent::AckComment(signal)
            | FeedbackEvent::IrcMention(signal)
            | FeedbackEvent::EmailMention(signal) => signal,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            FeedbackEvent::Review { .. } => EventKind::Review,
            FeedbackEvent::AckComment(_) => EventKind::AckComment,
            FeedbackEvent::IrcMention(_) => EventKind::Irc,
            FeedbackEvent::EmailMention(_) => EventKind::Email,
        }
    }

    pub fn reviewer(&self) -> &str {
        &self.signal().reviewer
    }

    pub fn at(&self) -> DateTime<Utc> {
        self.signal().at
    }

    pub fn score(&self) -> f64 {
        self.signal().score
    }
}
