//! Pull request importance tiers
//!
//! Classifies a PR as trivial / low / normal / high / critical from its title,
//! labels, touched paths and total changed lines. Total and deterministic:
//! anything that matches no rule is `normal`.
//!
//! Precedence, first match wins:
//!
//! ```text
//! critical keyword or label, or >1000 lines   -> critical
//! housekeeping and <10 lines                  -> trivial
//! housekeeping or docs-only                   -> low
//! consensus path touched                      -> critical if >100 lines, else high
//! very-large (>=500) or large (>=200)         -> high
//! small or very-small (5..50)                 -> low
//! otherwise (trivial <5, medium 50..200)      -> normal
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::ClassifierConfig;
use crate::models::PullRequest;

pub const DEFAULT_CRITICAL_KEYWORDS: &[&str] = &[
    "consensus",
    "security",
    "vulnerability",
    "cve",
    "exploit",
    "protocol",
    "wallet",
    "softfork",
    "soft fork",
    "soft-fork",
    "hardfork",
    "hard fork",
    "segwit",
    "taproot",
    "dos",
    "private key",
];

pub const DEFAULT_HOUSEKEEPING_KEYWORDS: &[&str] = &[
    "typo",
    "typos",
    "spelling",
    "doc",
    "docs",
    "documentation",
    "readme",
    "comment",
    "comments",
    "format",
    "formatting",
    "whitespace",
    "lint",
    "linter",
    "test",
    "tests",
    "qa",
    "cleanup",
    "copyright",
    "translation",
    "translations",
];

pub const DEFAULT_CONSENSUS_PATHS: &[&str] = &[
    "src/consensus/",
    "src/script/",
    "src/primitives/",
    "src/validation.",
    "src/main.",
    "src/pow.",
    "src/chain.",
    "src/versionbits.",
    "src/secp256k1/",
    "src/crypto/",
];

/// Changed-lines threshold above which a PR is critical regardless of content.
pub const CRITICAL_LINES: u64 = 1000;
/// Changed-lines threshold above which a consensus-path PR is critical.
pub const CONSENSUS_CRITICAL_LINES: u64 = 100;
/// Housekeeping PRs below this many changed lines are trivial.
pub const TRIVIAL_HOUSEKEEPING_LINES: u64 = 10;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum ImportanceTier {
    Trivial,
    Low,
    #[default]
    Normal,
    High,
    Critical,
}

impl ImportanceTier {
    pub fn all() -> &'static [ImportanceTier] {
        &[
            ImportanceTier::Trivial,
            ImportanceTier::Low,
            ImportanceTier::Normal,
            ImportanceTier::High,
            ImportanceTier::Critical,
        ]
    }
}

impl std::fmt::Display for ImportanceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportanceTier::Trivial => write!(f, "trivial"),
            ImportanceTier::Low => write!(f, "low"),
            ImportanceTier::Normal => write!(f, "normal"),
            ImportanceTier::High => write!(f, "high"),
            ImportanceTier::Critical => write!(f, "critical"),
        }
    }
}

/// Size bucket by total changed lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeBucket {
    Trivial,
    VerySmall,
    Small,
    Medium,
    Large,
    VeryLarge,
}

impl SizeBucket {
    pub fn from_lines(lines: u64) -> Self {
        match lines {
            l if l < 5 => SizeBucket::Trivial,
            l if l < 20 => SizeBucket::VerySmall,
            l if l < 50 => SizeBucket::Small,
            l if l < 200 => SizeBucket::Medium,
            l if l < 500 => SizeBucket::Large,
            _ => SizeBucket::VeryLarge,
        }
    }
}

/// What kind of file a changed path is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathKind {
    Docs,
    Tests,
    Source,
}

fn path_kind(path: &str) -> PathKind {
    let lower = path.to_lowercase();
    let file_name = lower.rsplit('/').next().unwrap_or(&lower);

    if lower.starts_with("doc/")
        || lower.contains("/doc/")
        || lower.ends_with(".md")
        || lower.ends_with(".txt")
        || lower.ends_with(".rst")
        || lower.ends_with(".adoc")
        || file_name.starts_with("readme")
        || file_name == "copying"
    {
        return PathKind::Docs;
    }

    if lower.starts_with("test/")
        || lower.starts_with("qa/")
        || lower.contains("/test/")
        || lower.contains("/qa/")
        || lower.contains("/bench/")
        || file_name.ends_with("_tests.cpp")
        || file_name.ends_with("_test.cpp")
        || file_name.ends_with("_test.py")
    {
        return PathKind::Tests;
    }

    PathKind::Source
}

fn keyword_regex(words: &[String]) -> Option<Regex> {
    let alternation = words
        .iter()
        .map(|w| w.trim())
        .filter(|w| !w.is_empty())
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("|");
    if alternation.is_empty() {
        return None;
    }
    // Keywords come from config; an invalid set just disables that signal.
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternation)).ok()
}

/// Why a PR landed in its tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub tier: ImportanceTier,
    pub size: SizeBucket,
    pub lines_changed: u64,
    pub critical_signal: bool,
    pub housekeeping: bool,
    pub docs_only: bool,
    pub touches_consensus: bool,
}

/// Importance classifier with keyword sets compiled once.
#[derive(Debug, Clone)]
pub struct PrClassifier {
    critical: Option<Regex>,
    housekeeping: Option<Regex>,
    consensus_paths: Vec<String>,
}

impl Default for PrClassifier {
    fn default() -> Self {
        Self::new(&ClassifierConfig::default())
    }
}

impl PrClassifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            critical: keyword_regex(&config.critical_keywords),
            housekeeping: keyword_regex(&config.housekeeping_keywords),
            consensus_paths: config
                .consensus_paths
                .iter()
                .map(|p| p.trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    fn matches(re: &Option<Regex>, pr: &PullRequest) -> bool {
        let Some(re) = re else {
            return false;
        };
        re.is_match(&pr.title) || pr.labels.iter().any(|l| re.is_match(l))
    }

    fn touches_consensus(&self, pr: &PullRequest) -> bool {
        pr.files.iter().any(|f| {
            let lower = f.to_lowercase();
            self.consensus_paths.iter().any(|p| lower.starts_with(p.as_str()))
        })
    }

    pub fn classify(&self, pr: &PullRequest) -> ImportanceTier {
        self.explain(pr).tier
    }

    /// Classify and report which signals fired.
    pub fn explain(&self, pr: &PullRequest) -> Classification {
        let lines = pr.lines_changed();
        let size = SizeBucket::from_lines(lines);
        let critical_signal = Self::matches(&self.critical, pr);

        let kinds: Vec<PathKind> = pr.files.iter().map(|f| path_kind(f)).collect();
        let docs_only = !kinds.is_empty() && kinds.iter().all(|k| *k == PathKind::Docs);
        let tests_only = !kinds.is_empty() && kinds.iter().all(|k| *k == PathKind::Tests);
        let housekeeping = Self::matches(&self.housekeeping, pr) || tests_only;
        let touches_consensus = self.touches_consensus(pr);

        let tier = if critical_signal || lines > CRITICAL_LINES {
            ImportanceTier::Critical
        } else if housekeeping && lines < TRIVIAL_HOUSEKEEPING_LINES {
            ImportanceTier::Trivial
        } else if housekeeping || docs_only {
            ImportanceTier::Low
        } else if touches_consensus {
            if lines > CONSENSUS_CRITICAL_LINES {
                ImportanceTier::Critical
            } else {
                ImportanceTier::High
            }
        } else {
            match size {
                SizeBucket::VeryLarge | SizeBucket::Large => ImportanceTier::High,
                SizeBucket::Small | SizeBucket::VerySmall => ImportanceTier::Low,
                SizeBucket::Trivial | SizeBucket::Medium => ImportanceTier::Normal,
            }
        };

        Classification {
            tier,
            size,
            lines_changed: lines,
            critical_signal,
            housekeeping,
            docs_only,
            touches_consensus,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pr(title: &str, files: &[&str], additions: u64, deletions: u64) -> PullRequest {
        PullRequest {
            number: 1,
            title: title.into(),
            files: files.iter().map(|f| f.to_string()).collect(),
            additions,
            deletions,
            ..Default::default()
        }
    }

    #[test]
    fn test_size_buckets() {
        assert_eq!(SizeBucket::from_lines(0), SizeBucket::Trivial);
        assert_eq!(SizeBucket::from_lines(4), SizeBucket::Trivial);
        assert_eq!(SizeBucket::from_lines(5), SizeBucket::VerySmall);
        assert_eq!(SizeBucket::from_lines(19), SizeBucket::VerySmall);
        assert_eq!(SizeBucket::from_lines(49), SizeBucket::Small);
        assert_eq!(SizeBucket::from_lines(199), SizeBucket::Medium);
        assert_eq!(SizeBucket::from_lines(499), SizeBucket::Large);
        assert_eq!(SizeBucket::from_lines(500), SizeBucket::VeryLarge);
    }

    #[test]
    fn test_empty_pr_is_normal() {
        let c = PrClassifier::default();
        assert_eq!(c.classify(&PullRequest::default()), ImportanceTier::Normal);
    }

    #[test]
    fn test_critical_keyword_outranks_everything() {
        let c = PrClassifier::default();
        assert_eq!(
            c.classify(&pr("doc: fix typo in wallet help", &["doc/release-notes.md"], 1, 1)),
            ImportanceTier::Critical
        );
        assert_eq!(
            c.classify(&pr("Fix consensus bug", &["src/net.cpp"], 2, 0)),
            ImportanceTier::Critical
        );
    }

    #[test]
    fn test_critical_label() {
        let c = PrClassifier::default();
        let mut p = pr("Refactor block storage", &["src/node/blockstorage.cpp"], 30, 10);
        p.labels = vec!["Needs review".into(), "Consensus".into()];
        assert_eq!(c.classify(&p), ImportanceTier::Critical);
    }

    #[test]
    fn test_huge_pr_is_critical() {
        let c = PrClassifier::default();
        assert_eq!(
            c.classify(&pr("Move code around", &["src/net.cpp"], 800, 201)),
            ImportanceTier::Critical
        );
        // exactly 1000 is not > 1000
        assert_eq!(
            c.classify(&pr("Move code around", &["src/net.cpp"], 500, 500)),
            ImportanceTier::High
        );
    }

    #[test]
    fn test_housekeeping_tiers() {
        let c = PrClassifier::default();
        assert_eq!(
            c.classify(&pr("Fix typo", &["src/net.cpp"], 1, 1)),
            ImportanceTier::Trivial
        );
        assert_eq!(
            c.classify(&pr("Fix typos across the codebase", &["src/net.cpp"], 40, 40)),
            ImportanceTier::Low
        );
    }

    #[test]
    fn test_test_only_changes_are_housekeeping() {
        let c = PrClassifier::default();
        let p = pr(
            "Add coverage for getblock",
            &["test/functional/rpc_blockchain.py", "src/test/util_tests.cpp"],
            300,
            10,
        );
        let explained = c.explain(&p);
        assert!(explained.housekeeping);
        assert_eq!(explained.tier, ImportanceTier::Low);
    }

    #[test]
    fn test_docs_only_is_low() {
        let c = PrClassifier::default();
        let p = pr("Release notes for 0.15", &["doc/release-notes.md", "README.md"], 120, 3);
        let explained = c.explain(&p);
        assert!(explained.docs_only);
        assert!(!explained.housekeeping);
        assert_eq!(explained.tier, ImportanceTier::Low);
    }

    #[test]
    fn test_consensus_paths() {
        let c = PrClassifier::default();
        assert_eq!(
            c.classify(&pr("Speed up sigcache", &["src/script/sigcache.cpp"], 30, 20)),
            ImportanceTier::High
        );
        assert_eq!(
            c.classify(&pr("Rework block checks", &["src/validation.cpp"], 90, 20)),
            ImportanceTier::Critical
        );
    }

    #[test]
    fn test_size_fallbacks() {
        let c = PrClassifier::default();
        assert_eq!(c.classify(&pr("net: tweak", &["src/net.cpp"], 2, 1)), ImportanceTier::Normal);
        assert_eq!(c.classify(&pr("net: tweak", &["src/net.cpp"], 10, 5)), ImportanceTier::Low);
        assert_eq!(c.classify(&pr("net: tweak", &["src/net.cpp"], 30, 10)), ImportanceTier::Low);
        assert_eq!(c.classify(&pr("net: tweak", &["src/net.cpp"], 100, 20)), ImportanceTier::Normal);
        assert_eq!(c.classify(&pr("net: tweak", &["src/net.cpp"], 250, 50)), ImportanceTier::High);
        assert_eq!(c.classify(&pr("net: tweak", &["src/net.cpp"], 600, 0)), ImportanceTier::High);
    }

    #[test]
    fn test_keywords_need_word_boundaries() {
        let c = PrClassifier::default();
        // "testing" and "documented" are not housekeeping keywords; "dosomething" is not "dos"
        let p = pr("Add dosomething helper, documented and testing-friendly", &["src/util.cpp"], 100, 0);
        let explained = c.explain(&p);
        assert!(!explained.critical_signal);
        assert!(!explained.housekeeping);
        assert_eq!(explained.tier, ImportanceTier::Normal);
    }

    #[test]
    fn test_custom_config() {
        let config = ClassifierConfig {
            critical_keywords: vec!["mempool".into()],
            housekeeping_keywords: vec![],
            consensus_paths: vec!["src/net_processing.".into()],
        };
        let c = PrClassifier::new(&config);
        assert_eq!(c.classify(&pr("mempool: limit", &["src/txmempool.cpp"], 3, 0)), ImportanceTier::Critical);
        assert_eq!(c.classify(&pr("Fix typo", &["src/net.cpp"], 1, 0)), ImportanceTier::Normal);
        assert_eq!(
            c.classify(&pr("p2p: relay", &["src/net_processing.cpp"], 20, 0)),
            ImportanceTier::High
        );
    }

    #[test]
    fn test_classification_is_deterministic() {
        let c = PrClassifier::default();
        let p = pr("Speed up sigcache", &["src/script/sigcache.cpp"], 30, 20);
        assert_eq!(c.explain(&p), c.explain(&p));
    }
}
