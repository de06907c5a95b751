//! Event extraction
//!
//! Turns one pull request plus the shared cross-platform index into a flat
//! list of scored [`FeedbackEvent`]s. Output order is reviews, ACK comments,
//! IRC mentions, then emails, each in input order; the reconciler's stable
//! sort uses this as its tie-break.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use tracing::debug;

use super::FeedbackEvent;
use crate::models::{CrossPlatformMessage, Email, IrcMessage, Platform, PullRequest};
use crate::scoring::{is_ack, score_ack_comment, score_cross_platform_message, score_formal_review};

/// IRC and email messages keyed by the PR number they reference, plus the
/// maintainer handle set used to weight them.
///
/// Built once per batch and shared read-only across every PR.
#[derive(Debug, Clone, Default)]
pub struct CrossPlatformIndex {
    irc: HashMap<String, Vec<CrossPlatformMessage>>,
    email: HashMap<String, Vec<CrossPlatformMessage>>,
    maintainers: HashSet<String>,
}

/// `"#1234"` and `" 1234 "` both index as `"1234"`.
fn normalize_key(key: &str) -> String {
    key.trim().trim_start_matches('#').to_string()
}

impl CrossPlatformIndex {
    pub fn new(maintainers: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        Self {
            maintainers: maintainers
                .into_iter()
                .map(|h| h.as_ref().trim().to_lowercase())
                .filter(|h| !h.is_empty())
                .collect(),
            ..Default::default()
        }
    }

    pub fn with_irc(mut self, index: HashMap<String, Vec<IrcMessage>>) -> Self {
        for (key, messages) in index {
            self.irc
                .entry(normalize_key(&key))
                .or_default()
                .extend(messages.iter().map(CrossPlatformMessage::from));
        }
        self
    }

    pub fn with_email(mut self, index: HashMap<String, Vec<Email>>) -> Self {
        for (key, emails) in index {
            self.email
                .entry(normalize_key(&key))
                .or_default()
                .extend(emails.iter().map(CrossPlatformMessage::from));
        }
        self
    }

    /// Add already-normalized messages for one PR.
    pub fn insert(&mut self, pr_number: u64, message: CrossPlatformMessage) {
        let bucket = match message.platform {
            Platform::Irc => &mut self.irc,
            Platform::Email => &mut self.email,
        };
        bucket.entry(pr_number.to_string()).or_default().push(message);
    }

    pub fn irc_for(&self, pr_number: u64) -> &[CrossPlatformMessage] {
        self.irc
            .get(&pr_number.to_string())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn email_for(&self, pr_number: u64) -> &[CrossPlatformMessage] {
        self.email
            .get(&pr_number.to_string())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_maintainer(&self, handle: &str) -> bool {
        self.maintainers.contains(&handle.trim().to_lowercase())
    }

    /// Whether the sender's identity or any of its aliases is a maintainer.
    pub fn is_maintainer_message(&self, msg: &CrossPlatformMessage) -> bool {
        std::iter::once(&msg.author)
            .chain(&msg.aliases)
            .any(|handle| self.is_maintainer(handle))
    }

    /// (PRs with IRC mentions, PRs with email mentions)
    pub fn coverage(&self) -> (usize, usize) {
        (self.irc.len(), self.email.len())
    }
}

/// Builds feedback events for pull requests against a shared index.
#[derive(Debug, Clone)]
pub struct EventExtractor<'a> {
    index: &'a CrossPlatformIndex,
    review_cutoff: DateTime<Utc>,
}

impl<'a> EventExtractor<'a> {
    /// # Arguments
    /// * `index` - Cross-platform messages and maintainer set
    /// * `review_cutoff` - Launch of GitHub's formal review feature
    pub fn new(index: &'a CrossPlatformIndex, review_cutoff: DateTime<Utc>) -> Self {
        Self {
            index,
            review_cutoff,
        }
    }

    /// Whether the PR was opened before formal reviews existed. PRs with no
    /// resolvable creation time are treated as modern.
    pub fn is_pre_review_era(&self, pr: &PullRequest) -> bool {
        pr.created().is_some_and(|created| created < self.review_cutoff)
    }

    /// All feedback events for a PR, unsorted.
    pub fn extract(&self, pr: &PullRequest) -> Vec<FeedbackEvent> {
        let mut events = Vec::with_capacity(pr.reviews.len() + pr.comments.len());
        self.push_reviews(pr, &mut events);
        self.push_acks(pr, &mut events);
        self.push_cross_platform(pr, self.index.irc_for(pr.number), &mut events);
        self.push_cross_platform(pr, self.index.email_for(pr.number), &mut events);
        events
    }

    fn push_reviews(&self, pr: &PullRequest, events: &mut Vec<FeedbackEvent>) {
        if self.is_pre_review_era(pr) {
            if !pr.reviews.is_empty() {
                debug!(
                    "PR #{}: ignoring {} review objects from before the review cutoff",
                    pr.number,
                    pr.reviews.len()
                );
            }
            return;
        }
        for review in &pr.reviews {
            let author = review.author.trim();
            if author.is_empty() {
                continue;
            }
            let Some(at) = review.timestamp() else {
                continue;
            };
            let score = score_formal_review(review.state, review.body.as_deref());
            events.push(FeedbackEvent::review(author, at, score, review.state));
        }
    }

    fn push_acks(&self, pr: &PullRequest, events: &mut Vec<FeedbackEvent>) {
        for comment in &pr.comments {
            let author = comment.author.trim();
            if author.is_empty() || !is_ack(&comment.body) {
                continue;
            }
            let Some(at) = comment.timestamp() else {
                continue;
            };
            events.push(FeedbackEvent::ack(author, at, score_ack_comment(&comment.body)));
        }
    }

    fn push_cross_platform(
        &self,
        pr: &PullRequest,
        messages: &[CrossPlatformMessage],
        events: &mut Vec<FeedbackEvent>,
    ) {
        let resolved = pr.resolved();
        for msg in messages {
            if msg.author.is_empty() {
                continue;
            }
            let Some(at) = msg.timestamp else {
                continue;
            };
            // A message cannot review a decision that was already made.
            if resolved.is_some_and(|r| at >= r) {
                continue;
            }
            let score = score_cross_platform_message(&msg.text, self.index.is_maintainer_message(msg));
            events.push(match msg.platform {
                Platform::Irc => FeedbackEvent::irc(&msg.author, at, score),
                Platform::Email => FeedbackEvent::email(&msg.author, at, score),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use crate::models::{parse_timestamp, Comment, Review, ReviewState};

    fn cutoff() -> DateTime<Utc> {
        parse_timestamp("2016-09-14").unwrap()
    }

    fn modern_pr() -> PullRequest {
        PullRequest {
            number: 10000,
            author: "author".into(),
            created_at: Some("2017-05-01T00:00:00Z".into()),
            merged_at: Some("2017-05-10T00:00:00Z".into()),
            merged: true,
            reviews: vec![
                Review {
                    author: "Reviewer1".into(),
                    state: ReviewState::Approved,
                    body: Some("Tested on regtest, the logic looks right to me".into()),
                    submitted_at: Some("2017-05-03T00:00:00Z".into()),
                    created_at: None,
                },
                Review {
                    author: "".into(),
                    state: ReviewState::Approved,
                    body: None,
                    submitted_at: Some("2017-05-03T00:00:00Z".into()),
                    created_at: None,
                },
                Review {
                    author: "ghost".into(),
                    state: ReviewState::Approved,
                    body: None,
                    submitted_at: None,
                    created_at: None,
                },
            ],
            comments: vec![
                Comment {
                    author: "acker".into(),
                    body: "ACK 1a2b3c4".into(),
                    created_at: Some("2017-05-04T00:00:00Z".into()),
                },
                Comment {
                    author: "chatter".into(),
                    body: "Why not do it the other way?".into(),
                    created_at: Some("2017-05-04T00:00:00Z".into()),
                },
            ],
            ..Default::default()
        }
    }

    fn irc(body: &str, nick: &str, ts: &str) -> IrcMessage {
        IrcMessage {
            body: body.into(),
            author: nick.into(),
            timestamp: Some(ts.into()),
        }
    }

    #[test]
    fn test_extracts_reviews_and_acks() {
        let index = CrossPlatformIndex::default();
        let extractor = EventExtractor::new(&index, cutoff());
        let events = extractor.extract(&modern_pr());

        let kinds: Vec<EventKind> = events.iter().map(|e| e.kind()).collect();
        assert_eq!(kinds, vec![EventKind::Review, EventKind::AckComment]);
        assert_eq!(events[0].reviewer(), "reviewer1");
        assert_eq!(events[0].score(), 0.8);
        assert_eq!(events[1].reviewer(), "acker");
        assert_eq!(events[1].score(), 0.3);
    }

    #[test]
    fn test_review_falls_back_to_created_at() {
        let mut pr = modern_pr();
        pr.reviews = vec![Review {
            author: "late".into(),
            state: ReviewState::Commented,
            body: None,
            submitted_at: None,
            created_at: Some("2017-05-02T00:00:00Z".into()),
        }];
        pr.comments.clear();
        let index = CrossPlatformIndex::default();
        let events = EventExtractor::new(&index, cutoff()).extract(&pr);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].at(), parse_timestamp("2017-05-02T00:00:00Z").unwrap());
    }

    #[test]
    fn test_pre_review_era_drops_formal_reviews() {
        let mut pr = modern_pr();
        pr.created_at = Some("2015-01-01T00:00:00Z".into());
        let index = CrossPlatformIndex::default();
        let extractor = EventExtractor::new(&index, cutoff());
        assert!(extractor.is_pre_review_era(&pr));

        let events = extractor.extract(&pr);
        assert!(events.iter().all(|e| e.kind() != EventKind::Review));
        // ACK comments still count
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_unknown_creation_time_is_not_pre_era() {
        let mut pr = modern_pr();
        pr.created_at = None;
        let index = CrossPlatformIndex::default();
        assert!(!EventExtractor::new(&index, cutoff()).is_pre_review_era(&pr));
    }

    #[test]
    fn test_cross_platform_excludes_messages_after_resolution() {
        let mut irc_index = HashMap::new();
        irc_index.insert(
            "10000".to_string(),
            vec![
                irc("reviewed #10000, looks good", "sipa", "2017-05-05T00:00:00Z"),
                irc("#10000 was merged", "someone", "2017-05-10T00:00:00Z"),
                irc("#10000 broke my build", "someone", "2017-05-11T00:00:00Z"),
                irc("#10000", "nobody", "garbage"),
                irc("#10000", "", "2017-05-05T00:00:00Z"),
            ],
        );
        let index = CrossPlatformIndex::new(["sipa"]).with_irc(irc_index);
        let events = EventExtractor::new(&index, cutoff()).extract(&modern_pr());

        let irc_events: Vec<_> = events.iter().filter(|e| e.kind() == EventKind::Irc).collect();
        assert_eq!(irc_events.len(), 1);
        assert_eq!(irc_events[0].reviewer(), "sipa");
        // maintainer + high keyword, short message
        assert_eq!(irc_events[0].score(), 0.7);
    }

    #[test]
    fn test_open_pr_keeps_all_dated_messages() {
        let mut pr = modern_pr();
        pr.merged_at = None;
        pr.merged = false;
        let mut email_index = HashMap::new();
        email_index.insert(
            "#10000".to_string(),
            vec![Email {
                subject: "Re: PR 10000".into(),
                body: "Let's merge this".into(),
                from: "Dev <dev@example.org>".into(),
                date: Some("Fri, 01 Dec 2017 00:00:00 +0000".into()),
            }],
        );
        let index = CrossPlatformIndex::default().with_email(email_index);
        let events = EventExtractor::new(&index, cutoff()).extract(&pr);
        let email: Vec<_> = events.iter().filter(|e| e.kind() == EventKind::Email).collect();
        assert_eq!(email.len(), 1);
        assert_eq!(email[0].reviewer(), "dev");
        assert_eq!(email[0].score(), 0.3);
    }

    #[test]
    fn test_email_sender_matches_maintainer_by_address_handle() {
        let mut email_index = HashMap::new();
        email_index.insert(
            "10000".to_string(),
            vec![Email {
                subject: "Re: PR 10000".into(),
                body: "reviewed, lgtm".into(),
                from: "Wladimir J. van der Laan <laanwj@gmail.com>".into(),
                date: Some("Fri, 05 May 2017 00:00:00 +0000".into()),
            }],
        );
        let index = CrossPlatformIndex::new(["laanwj"]).with_email(email_index);
        let events = EventExtractor::new(&index, cutoff()).extract(&modern_pr());
        let email: Vec<_> = events.iter().filter(|e| e.kind() == EventKind::Email).collect();

        assert_eq!(email.len(), 1);
        // Scored under the display name, weighted as a maintainer
        assert_eq!(email[0].reviewer(), "wladimir j. van der laan");
        assert_eq!(email[0].score(), 0.7);
        assert!(index.is_maintainer_message(&CrossPlatformMessage::from(&Email {
            from: "Someone Else <LAANWJ@example.org>".into(),
            ..Default::default()
        })));
    }

    #[test]
    fn test_index_lookup_and_maintainers() {
        let mut index = CrossPlatformIndex::new(["LaanWJ", " "]);
        assert!(index.is_maintainer("laanwj"));
        assert!(index.is_maintainer(" LAANWJ "));
        assert!(!index.is_maintainer(""));
        assert!(index.irc_for(1).is_empty());

        index.insert(
            1,
            CrossPlatformMessage {
                platform: Platform::Irc,
                author: "x".into(),
                aliases: Vec::new(),
                text: "#1".into(),
                timestamp: None,
            },
        );
        assert_eq!(index.irc_for(1).len(), 1);
        assert!(index.email_for(1).is_empty());
        assert_eq!(index.coverage(), (1, 0));
    }
}
