//! Core data models for review-weight
//!
//! Input records (pull requests, reviews, comments, IRC messages, emails)
//! mirror the JSON shapes produced by the corpus crawlers. They are deserialized
//! leniently: crawlers changed field names over the years, so aliases and
//! string-or-object forms are accepted, and every timestamp is kept as the raw
//! string until an extractor needs it.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Parse a corpus timestamp into UTC.
///
/// Accepts RFC 3339 (`2017-03-02T10:00:00Z`), RFC 2822 (email `Date:` headers),
/// naive `YYYY-MM-DD HH:MM:SS` / `YYYY-MM-DDTHH:MM:SS` (assumed UTC), and bare
/// dates. Returns `None` for anything else; callers skip the record.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn parse_opt(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(parse_timestamp)
}

// ---------------------------------------------------------------------------
// Lenient field helpers
// ---------------------------------------------------------------------------

/// A GitHub user as it appears in crawler output: either a bare login or an
/// object with a `login` field. `null` becomes the empty string.
#[derive(Deserialize)]
#[serde(untagged)]
enum LoginField {
    Name(String),
    Object {
        #[serde(default)]
        login: Option<String>,
    },
}

fn de_login<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let field: Option<LoginField> = Option::deserialize(deserializer)?;
    Ok(match field {
        Some(LoginField::Name(s)) => s,
        Some(LoginField::Object { login }) => login.unwrap_or_default(),
        None => String::new(),
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NamedField {
    Name(String),
    Object {
        #[serde(default, alias = "filename", alias = "path")]
        name: Option<String>,
    },
}

fn de_names<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let fields: Option<Vec<NamedField>> = Option::deserialize(deserializer)?;
    Ok(fields
        .unwrap_or_default()
        .into_iter()
        .filter_map(|f| match f {
            NamedField::Name(s) => Some(s),
            NamedField::Object { name } => name,
        })
        .collect())
}

fn de_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// GitHub records
// ---------------------------------------------------------------------------

/// Formal review state as reported by GitHub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum ReviewState {
    Approved,
    ChangesRequested,
    Commented,
    #[default]
    Other,
}

impl ReviewState {
    /// Approvals and change requests are the states that carry a verdict.
    pub fn is_decisive(&self) -> bool {
        matches!(self, ReviewState::Approved | ReviewState::ChangesRequested)
    }
}

impl From<String> for ReviewState {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "approved" => ReviewState::Approved,
            "changes_requested" => ReviewState::ChangesRequested,
            "commented" => ReviewState::Commented,
            _ => ReviewState::Other,
        }
    }
}

impl std::fmt::Display for ReviewState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewState::Approved => write!(f, "approved"),
            ReviewState::ChangesRequested => write!(f, "changes_requested"),
            ReviewState::Commented => write!(f, "commented"),
            ReviewState::Other => write!(f, "other"),
        }
    }
}

/// Pull request lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum PrState {
    #[default]
    Open,
    Closed,
    Merged,
}

impl From<String> for PrState {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "merged" => PrState::Merged,
            "closed" => PrState::Closed,
            _ => PrState::Open,
        }
    }
}

/// A formal GitHub code review.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Review {
    #[serde(default, deserialize_with = "de_login", alias = "user")]
    pub author: String,
    #[serde(default)]
    pub state: ReviewState,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub submitted_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Review {
    /// Submission time, falling back to creation time.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        parse_opt(self.submitted_at.as_deref()).or_else(|| parse_opt(self.created_at.as_deref()))
    }
}

/// An issue-style comment on a pull request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default, deserialize_with = "de_login", alias = "user")]
    pub author: String,
    #[serde(default, deserialize_with = "de_text")]
    pub body: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Comment {
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        parse_opt(self.created_at.as_deref())
    }
}

/// A pull request with its reviews, comments and size metrics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    #[serde(default, deserialize_with = "de_login", alias = "user")]
    pub author: String,
    #[serde(default, deserialize_with = "de_text")]
    pub title: String,
    #[serde(default, deserialize_with = "de_text")]
    pub body: String,
    #[serde(default)]
    pub state: PrState,
    #[serde(default)]
    pub merged: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub merged_at: Option<String>,
    #[serde(default)]
    pub closed_at: Option<String>,
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
    #[serde(default, deserialize_with = "de_names", alias = "file_paths")]
    pub files: Vec<String>,
    #[serde(default, deserialize_with = "de_names")]
    pub labels: Vec<String>,
}

impl PullRequest {
    pub fn created(&self) -> Option<DateTime<Utc>> {
        parse_opt(self.created_at.as_deref())
    }

    /// When the PR's fate was decided: merge time, else close time.
    pub fn resolved(&self) -> Option<DateTime<Utc>> {
        parse_opt(self.merged_at.as_deref()).or_else(|| parse_opt(self.closed_at.as_deref()))
    }

    pub fn is_merged(&self) -> bool {
        self.merged || self.state == PrState::Merged || self.merged_at.is_some()
    }

    /// Total changed lines (additions + deletions).
    pub fn lines_changed(&self) -> u64 {
        self.additions.saturating_add(self.deletions)
    }
}

// ---------------------------------------------------------------------------
// Cross-platform records
// ---------------------------------------------------------------------------

/// Where a cross-platform message came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Irc,
    Email,
}

/// An IRC log line as stored in the IRC index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IrcMessage {
    #[serde(default, deserialize_with = "de_text", alias = "message", alias = "text")]
    pub body: String,
    #[serde(default, deserialize_with = "de_text", alias = "nick", alias = "user")]
    pub author: String,
    #[serde(default, alias = "time", alias = "date")]
    pub timestamp: Option<String>,
}

/// A mailing-list email as stored in the email index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Email {
    #[serde(default, deserialize_with = "de_text", alias = "content")]
    pub body: String,
    #[serde(default, deserialize_with = "de_text")]
    pub subject: String,
    #[serde(default, deserialize_with = "de_text", alias = "author")]
    pub from: String,
    #[serde(default, alias = "timestamp")]
    pub date: Option<String>,
}

/// An IRC message or email normalized for scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossPlatformMessage {
    pub platform: Platform,
    /// Case-folded platform-local identity (IRC nick or email sender).
    pub author: String,
    /// Other handles the same sender is known by, such as the local part of
    /// an email address whose display name became `author`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Text scored for review keywords; emails carry subject and body.
    pub text: String,
    pub timestamp: Option<DateTime<Utc>>,
}

impl From<&IrcMessage> for CrossPlatformMessage {
    fn from(msg: &IrcMessage) -> Self {
        Self {
            platform: Platform::Irc,
            author: normalize_nick(&msg.author),
            aliases: Vec::new(),
            text: msg.body.clone(),
            timestamp: parse_opt(msg.timestamp.as_deref()),
        }
    }
}

impl From<&Email> for CrossPlatformMessage {
    fn from(email: &Email) -> Self {
        let text = match (email.subject.trim().is_empty(), email.body.trim().is_empty()) {
            (true, _) => email.body.clone(),
            (false, true) => email.subject.clone(),
            (false, false) => format!("{}\n{}", email.subject, email.body),
        };
        let author = normalize_sender(&email.from);
        let aliases = sender_handle(&email.from)
            .filter(|handle| *handle != author)
            .into_iter()
            .collect();
        Self {
            platform: Platform::Email,
            author,
            aliases,
            text,
            timestamp: parse_opt(email.date.as_deref()),
        }
    }
}

/// Case-fold an IRC nick, dropping away/alt suffixes such as `sipa_` or `jonas|away`.
pub fn normalize_nick(nick: &str) -> String {
    let nick = nick.trim().trim_start_matches(['@', '+']);
    let nick = nick.split('|').next().unwrap_or(nick);
    nick.trim_end_matches(['_', '`']).to_lowercase()
}

/// Split a `From:` header into its display name and address.
fn split_sender(from: &str) -> (&str, &str) {
    let from = from.trim();
    match from.find('<') {
        Some(open) => {
            let close = from[open..].find('>').map(|c| open + c).unwrap_or(from.len());
            (from[..open].trim(), from[open + 1..close].trim())
        }
        None => ("", from),
    }
}

/// Reduce an email `From:` header to a loose identity.
///
/// `"Jane Doe" <jane@example.com>` becomes `jane doe`; a bare address becomes
/// its local part.
pub fn normalize_sender(from: &str) -> String {
    let (display, _) = split_sender(from);
    let display = display.trim_matches(['"', '\'']).trim();
    if !display.is_empty() {
        return display.to_lowercase();
    }
    sender_handle(from).unwrap_or_default()
}

/// Case-folded local part of the sender address, e.g. `laanwj` for
/// `Wladimir J. van der Laan <laanwj@gmail.com>`.
pub fn sender_handle(from: &str) -> Option<String> {
    let (_, address) = split_sender(from);
    let local = address.split('@').next().unwrap_or(address).trim();
    (!local.is_empty()).then(|| local.to_lowercase())
}
