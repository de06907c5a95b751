//! Corpus loading
//!
//! Reads pull requests, prebuilt cross-platform indices, raw IRC/email logs
//! and maintainer lists from disk. Record files may be JSON Lines or a single
//! JSON array; one bad record never sinks the batch.

use regex::Regex;
use serde::de::DeserializeOwned;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{Email, IrcMessage, PullRequest};

/// Errors that stop a file from loading at all
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported format in {}: expected a JSON array or JSON Lines, found '{found}'", path.display())]
    UnsupportedFormat { path: PathBuf, found: char },
}

/// Counts from a lenient load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub loaded: usize,
    pub skipped: usize,
}

fn read(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse records from JSON Lines or a JSON array.
///
/// Malformed records are skipped with a warning and counted; only unreadable
/// files or a broken top-level array are errors.
pub fn parse_records<T: DeserializeOwned>(
    content: &str,
    path: &Path,
) -> Result<(Vec<T>, LoadStats), LoadError> {
    let mut stats = LoadStats::default();
    let Some(first) = content.trim_start().chars().next() else {
        return Ok((Vec::new(), stats));
    };

    let mut records = Vec::new();
    match first {
        '[' => {
            let values: Vec<serde_json::Value> =
                serde_json::from_str(content).map_err(|source| LoadError::Json {
                    path: path.to_path_buf(),
                    source,
                })?;
            for (i, value) in values.into_iter().enumerate() {
                match serde_json::from_value::<T>(value) {
                    Ok(record) => records.push(record),
                    Err(e) => {
                        warn!("{}: skipping element {}: {}", path.display(), i, e);
                        stats.skipped += 1;
                    }
                }
            }
        }
        '{' => {
            for (i, line) in content.lines().enumerate() {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match serde_json::from_str::<T>(line) {
                    Ok(record) => records.push(record),
                    Err(e) => {
                        warn!("{}:{}: skipping malformed line: {}", path.display(), i + 1, e);
                        stats.skipped += 1;
                    }
                }
            }
        }
        other => {
            return Err(LoadError::UnsupportedFormat {
                path: path.to_path_buf(),
                found: other,
            })
        }
    }

    stats.loaded = records.len();
    Ok((records, stats))
}

/// Load records of any type from a JSON Lines or JSON array file.
pub fn load_records<T: DeserializeOwned>(path: &Path) -> Result<(Vec<T>, LoadStats), LoadError> {
    let content = read(path)?;
    parse_records(&content, path)
}

pub fn load_pull_requests(path: &Path) -> Result<(Vec<PullRequest>, LoadStats), LoadError> {
    let (prs, stats) = load_records::<PullRequest>(path)?;
    info!(
        "Loaded {} pull requests from {} ({} skipped)",
        stats.loaded,
        path.display(),
        stats.skipped
    );
    Ok((prs, stats))
}

/// Load a prebuilt `{ "<pr number>": [message, ...] }` index.
///
/// Messages that do not deserialize are skipped and counted; the rest of the
/// PR's list and every other PR still load.
pub fn load_index<T: DeserializeOwned>(
    path: &Path,
) -> Result<(HashMap<String, Vec<T>>, LoadStats), LoadError> {
    let content = read(path)?;
    let raw: HashMap<String, Vec<serde_json::Value>> =
        serde_json::from_str(&content).map_err(|source| LoadError::Json {
            path: path.to_path_buf(),
            source,
        })?;

    let mut stats = LoadStats::default();
    let mut index = HashMap::with_capacity(raw.len());
    for (pr, values) in raw {
        let mut messages = Vec::with_capacity(values.len());
        for (i, value) in values.into_iter().enumerate() {
            match serde_json::from_value::<T>(value) {
                Ok(msg) => messages.push(msg),
                Err(e) => {
                    warn!("{}: PR {}: skipping message {}: {}", path.display(), pr, i, e);
                    stats.skipped += 1;
                }
            }
        }
        stats.loaded += messages.len();
        index.insert(pr, messages);
    }
    info!(
        "Loaded index for {} PRs from {} ({} messages skipped)",
        index.len(),
        path.display(),
        stats.skipped
    );
    Ok((index, stats))
}

/// Load maintainer handles: one per line, `#` starts a comment.
pub fn load_maintainers(path: &Path) -> Result<Vec<String>, LoadError> {
    let content = read(path)?;
    Ok(parse_maintainers(&content))
}

pub fn parse_maintainers(content: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    content
        .lines()
        .filter_map(|line| {
            let handle = line.split('#').next().unwrap_or("").trim().to_lowercase();
            (!handle.is_empty() && seen.insert(handle.clone())).then_some(handle)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Raw message logs
// ---------------------------------------------------------------------------

static PR_REF_PATTERN: OnceLock<Regex> = OnceLock::new();

/// `#1234`, `PR 1234`, `PR#1234`, `pull/1234`, `bitcoin/bitcoin#1234`
fn pr_ref_pattern() -> &'static Regex {
    PR_REF_PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(?:\bbitcoin/bitcoin#|\bpull/|\bPR\s*#?\s*|#)(\d{1,6})\b")
            .expect("valid regex")
    })
}

/// PR numbers referenced in a text, deduplicated and sorted.
pub fn extract_pr_refs(text: &str) -> BTreeSet<u64> {
    pr_ref_pattern()
        .captures_iter(text)
        .filter_map(|c| c.get(1)?.as_str().parse::<u64>().ok())
        .filter(|n| *n > 0)
        .collect()
}

/// A raw log record that may reference pull requests.
pub trait LoggedMessage: Clone {
    /// Text searched for PR references.
    fn searchable_text(&self) -> String;

    /// Identity used to collapse duplicate records under one PR.
    fn dedup_key(&self) -> (String, Option<String>, String);
}

impl LoggedMessage for IrcMessage {
    fn searchable_text(&self) -> String {
        self.body.clone()
    }

    fn dedup_key(&self) -> (String, Option<String>, String) {
        (self.author.clone(), self.timestamp.clone(), self.body.clone())
    }
}

impl LoggedMessage for Email {
    fn searchable_text(&self) -> String {
        format!("{}\n{}", self.subject, self.body)
    }

    fn dedup_key(&self) -> (String, Option<String>, String) {
        (self.from.clone(), self.date.clone(), self.searchable_text())
    }
}

/// Group raw messages by the PRs they mention.
///
/// A message mentioning three PRs lands under all three; the same record seen
/// twice (e.g. overlapping log exports) is kept once per PR.
pub fn build_index_from_messages<T: LoggedMessage>(messages: &[T]) -> HashMap<String, Vec<T>> {
    let mut index: HashMap<String, Vec<T>> = HashMap::new();
    let mut seen: HashSet<(u64, (String, Option<String>, String))> = HashSet::new();

    for msg in messages {
        for pr in extract_pr_refs(&msg.searchable_text()) {
            if !seen.insert((pr, msg.dedup_key())) {
                continue;
            }
            index.entry(pr.to_string()).or_default().push(msg.clone());
        }
    }
    debug!(
        "Indexed {} messages across {} PRs",
        messages.len(),
        index.len()
    );
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_jsonl_skips_malformed_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prs.jsonl");
        fs::write(
            &path,
            "{\"number\": 1, \"user\": \"a\"}\n\nnot json\n{\"number\": 2}\n{\"title\": \"no number\"}\n",
        )
        .unwrap();

        let (prs, stats) = load_pull_requests(&path).unwrap();
        assert_eq!(prs.len(), 2);
        assert_eq!(prs[0].number, 1);
        assert_eq!(prs[0].author, "a");
        assert_eq!(stats, LoadStats { loaded: 2, skipped: 2 });
    }

    #[test]
    fn test_load_json_array() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prs.json");
        fs::write(&path, r#"[{"number": 7}, {"number": "bad"}, {"number": 8}]"#).unwrap();

        let (prs, stats) = load_pull_requests(&path).unwrap();
        assert_eq!(prs.iter().map(|p| p.number).collect::<Vec<_>>(), vec![7, 8]);
        assert_eq!(stats.skipped, 1);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.jsonl");
        assert!(matches!(
            load_pull_requests(&missing),
            Err(LoadError::Io { .. })
        ));

        let csv = dir.path().join("prs.csv");
        fs::write(&csv, "number,author\n1,a\n").unwrap();
        assert!(matches!(
            load_pull_requests(&csv),
            Err(LoadError::UnsupportedFormat { found: 'n', .. })
        ));

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "[{\"number\": 1},").unwrap();
        assert!(matches!(
            load_pull_requests(&broken),
            Err(LoadError::Json { .. })
        ));
    }

    #[test]
    fn test_empty_file_loads_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.jsonl");
        fs::write(&path, "  \n").unwrap();
        let (prs, stats) = load_pull_requests(&path).unwrap();
        assert!(prs.is_empty());
        assert_eq!(stats, LoadStats::default());
    }

    #[test]
    fn test_load_index() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("irc.json");
        fs::write(
            &path,
            r#"{"1234": [{"message": "reviewed #1234", "nick": "sipa", "time": "2017-01-01 10:00:00"}]}"#,
        )
        .unwrap();
        let (index, stats): (HashMap<String, Vec<IrcMessage>>, _) = load_index(&path).unwrap();
        let msgs = &index["1234"];
        assert_eq!(msgs[0].author, "sipa");
        assert_eq!(msgs[0].body, "reviewed #1234");
        assert_eq!(stats, LoadStats { loaded: 1, skipped: 0 });
    }

    #[test]
    fn test_load_index_skips_bad_messages() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("irc.json");
        fs::write(
            &path,
            r#"{
                "1": [{"body": "reviewed #1", "author": "sipa", "timestamp": "2017-01-01T00:00:00Z"}],
                "2": [
                    {"body": "ACK #2", "author": "jonas", "timestamp": 1483228800},
                    {"body": "tested #2", "author": "luke", "timestamp": "2017-01-02T00:00:00Z"}
                ]
            }"#,
        )
        .unwrap();

        let (index, stats): (HashMap<String, Vec<IrcMessage>>, _) = load_index(&path).unwrap();
        assert_eq!(index["1"].len(), 1);
        assert_eq!(index["2"].len(), 1);
        assert_eq!(index["2"][0].author, "luke");
        assert_eq!(stats, LoadStats { loaded: 2, skipped: 1 });

        // A top-level shape error still fails the file
        fs::write(&path, r#"{"1": "not a list"}"#).unwrap();
        assert!(matches!(
            load_index::<IrcMessage>(&path),
            Err(LoadError::Json { .. })
        ));
    }

    #[test]
    fn test_parse_maintainers() {
        let handles = parse_maintainers("# core\nlaanwj\n  Sipa  # key holder\n\nlaanwj\n");
        assert_eq!(handles, vec!["laanwj", "sipa"]);
    }

    #[test]
    fn test_extract_pr_refs() {
        let refs = extract_pr_refs(
            "see #1234, PR 99, pr#100, https://github.com/bitcoin/bitcoin/pull/5678 and bitcoin/bitcoin#42",
        );
        assert_eq!(refs.into_iter().collect::<Vec<_>>(), vec![42, 99, 100, 1234, 5678]);

        assert!(extract_pr_refs("color #fff and #0").is_empty());
        assert!(extract_pr_refs("#1234abc").is_empty());
        assert_eq!(extract_pr_refs("#7 and #7 again").len(), 1);
    }

    #[test]
    fn test_build_index_from_messages() {
        let msg = |body: &str, ts: &str| IrcMessage {
            body: body.into(),
            author: "wumpus".into(),
            timestamp: Some(ts.into()),
        };
        let messages = vec![
            msg("#10 and #11 both look good", "2017-01-01T00:00:00Z"),
            msg("#10 and #11 both look good", "2017-01-01T00:00:00Z"),
            msg("reviewed #10 twice: #10", "2017-01-02T00:00:00Z"),
            msg("no reference here", "2017-01-03T00:00:00Z"),
        ];
        let index = build_index_from_messages(&messages);
        assert_eq!(index.len(), 2);
        assert_eq!(index["10"].len(), 2);
        assert_eq!(index["11"].len(), 1);
    }

    #[test]
    fn test_email_index_uses_subject() {
        let emails = vec![Email {
            subject: "Re: [PR 321] wallet fix".into(),
            body: "ACK from me".into(),
            from: "a@b.c".into(),
            date: None,
        }];
        let index = build_index_from_messages(&emails);
        assert!(index.contains_key("321"));
    }
}
