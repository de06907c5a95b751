//! Project-level configuration support
//!
//! Loads configuration from `review-weight.toml` or `.review-weight.json` in
//! the data directory, falling back to `~/.config/review-weight/config.toml`.
//!
//! # Configuration Format
//!
//! ```toml
//! # review-weight.toml
//!
//! [era]
//! review_cutoff = "2016-09-14"
//!
//! [thresholds]
//! substantial_review = 0.7
//! meaningful_pre_review_era = 0.3
//! meaningful = 0.5
//!
//! [maintainers]
//! handles = ["laanwj", "sipa", "fanquake"]
//!
//! [classifier]
//! consensus_paths = ["src/consensus/", "src/script/"]
//! ```

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::classifier::importance::{
    DEFAULT_CONSENSUS_PATHS, DEFAULT_CRITICAL_KEYWORDS, DEFAULT_HOUSEKEEPING_KEYWORDS,
};

/// File names searched in the data directory, in priority order.
pub const CONFIG_FILE: &str = "review-weight.toml";
pub const JSON_CONFIG_FILE: &str = ".review-weight.json";

/// Full configuration for a scoring run
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct ProjectConfig {
    /// Formal-review era boundary
    #[serde(default)]
    pub era: EraConfig,

    /// Score thresholds
    #[serde(default)]
    pub thresholds: ThresholdConfig,

    /// Known maintainers (weights cross-platform messages)
    #[serde(default)]
    pub maintainers: MaintainerConfig,

    /// Importance classifier keyword and path sets
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct EraConfig {
    /// Day GitHub's formal review feature went live. PRs opened earlier
    /// belong to the pre-review era.
    #[serde(default = "default_review_cutoff")]
    pub review_cutoff: NaiveDate,
}

impl Default for EraConfig {
    fn default() -> Self {
        Self {
            review_cutoff: default_review_cutoff(),
        }
    }
}

fn default_review_cutoff() -> NaiveDate {
    NaiveDate::from_ymd_opt(2016, 9, 14).unwrap_or_default()
}

impl EraConfig {
    /// Cutoff as midnight UTC.
    pub fn cutoff(&self) -> DateTime<Utc> {
        self.review_cutoff
            .and_hms_opt(0, 0, 0)
            .map(|naive| Utc.from_utc_datetime(&naive))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ThresholdConfig {
    /// Minimum review score for a later ACK to count as a completion signal
    #[serde(default = "default_substantial_review")]
    pub substantial_review: f64,

    /// Meaningful-review bar for PRs opened before the cutoff
    #[serde(default = "default_meaningful_pre_review_era")]
    pub meaningful_pre_review_era: f64,

    /// Meaningful-review bar for PRs opened on or after the cutoff
    #[serde(default = "default_meaningful")]
    pub meaningful: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            substantial_review: default_substantial_review(),
            meaningful_pre_review_era: default_meaningful_pre_review_era(),
            meaningful: default_meaningful(),
        }
    }
}

fn default_substantial_review() -> f64 {
    0.7
}
fn default_meaningful_pre_review_era() -> f64 {
    0.3
}
fn default_meaningful() -> f64 {
    0.5
}

impl ThresholdConfig {
    /// Replace out-of-range values with defaults. Returns the names of the
    /// fields that were reset.
    pub fn sanitize(&mut self) -> Vec<&'static str> {
        let defaults = Self::default();
        let mut reset = Vec::new();
        if !(0.0..=1.0).contains(&self.substantial_review) {
            self.substantial_review = defaults.substantial_review;
            reset.push("substantial_review");
        }
        // Meaningful bars compare against an uncapped sum, so only negatives are invalid.
        if !self.meaningful_pre_review_era.is_finite() || self.meaningful_pre_review_era < 0.0 {
            self.meaningful_pre_review_era = defaults.meaningful_pre_review_era;
            reset.push("meaningful_pre_review_era");
        }
        if !self.meaningful.is_finite() || self.meaningful < 0.0 {
            self.meaningful = defaults.meaningful;
            reset.push("meaningful");
        }
        reset
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct MaintainerConfig {
    /// Case-insensitive handles (GitHub logins or IRC nicks)
    #[serde(default = "default_maintainers")]
    pub handles: Vec<String>,
}

impl Default for MaintainerConfig {
    fn default() -> Self {
        Self {
            handles: default_maintainers(),
        }
    }
}

fn default_maintainers() -> Vec<String> {
    [
        "gavinandresen",
        "laanwj",
        "wumpus",
        "sipa",
        "jeffgarzik",
        "gmaxwell",
        "theuni",
        "jonasschnelli",
        "marcofalke",
        "maflcko",
        "fanquake",
        "meshcollider",
        "achow101",
        "hebasto",
        "glozow",
        "ryanofsky",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl MaintainerConfig {
    /// Case-folded handle set.
    pub fn handle_set(&self) -> HashSet<String> {
        self.handles
            .iter()
            .map(|h| h.trim().to_lowercase())
            .filter(|h| !h.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ClassifierConfig {
    #[serde(default = "default_critical_keywords")]
    pub critical_keywords: Vec<String>,

    #[serde(default = "default_housekeeping_keywords")]
    pub housekeeping_keywords: Vec<String>,

    /// Path prefixes whose changes can affect consensus
    #[serde(default = "default_consensus_paths")]
    pub consensus_paths: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            critical_keywords: default_critical_keywords(),
            housekeeping_keywords: default_housekeeping_keywords(),
            consensus_paths: default_consensus_paths(),
        }
    }
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_critical_keywords() -> Vec<String> {
    to_owned_list(DEFAULT_CRITICAL_KEYWORDS)
}
fn default_housekeeping_keywords() -> Vec<String> {
    to_owned_list(DEFAULT_HOUSEKEEPING_KEYWORDS)
}
fn default_consensus_paths() -> Vec<String> {
    to_owned_list(DEFAULT_CONSENSUS_PATHS)
}

impl ProjectConfig {
    /// Reset invalid values, logging each one.
    pub fn validate(&mut self) {
        for field in self.thresholds.sanitize() {
            warn!("thresholds.{} out of range, using default", field);
        }
    }

    /// Example config written by `review-weight init`.
    pub fn example_toml() -> String {
        let mut out = String::from(
            "# review-weight configuration\n\
             #\n\
             # PRs opened before `era.review_cutoff` predate GitHub's formal review\n\
             # feature: their review objects are ignored and the meaningful-review\n\
             # bar drops to `thresholds.meaningful_pre_review_era`.\n\n",
        );
        match toml::to_string_pretty(&ProjectConfig::default()) {
            Ok(body) => out.push_str(&body),
            Err(e) => warn!("Failed to render example config: {}", e),
        }
        out
    }
}

/// User-level config path (`~/.config/review-weight/config.toml`).
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("review-weight").join("config.toml"))
}

/// Load configuration for a data directory.
///
/// Searches, in order:
/// 1. `<dir>/review-weight.toml`
/// 2. `<dir>/.review-weight.json`
/// 3. the user config path
///
/// Unreadable files are logged and skipped. Returns defaults if nothing loads.
pub fn load_project_config(data_dir: &Path) -> ProjectConfig {
    let mut candidates = vec![data_dir.join(CONFIG_FILE), data_dir.join(JSON_CONFIG_FILE)];
    if let Some(user_path) = user_config_path() {
        candidates.push(user_path);
    }

    for path in candidates {
        if !path.exists() {
            continue;
        }
        match load_config_file(&path) {
            Ok(mut config) => {
                debug!("Loaded config from {}", path.display());
                config.validate();
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", path.display(), e);
            }
        }
    }

    debug!("No config found, using defaults");
    ProjectConfig::default()
}

fn load_config_file(path: &Path) -> anyhow::Result<ProjectConfig> {
    let content = std::fs::read_to_string(path)?;
    let is_json = path.extension().and_then(|e| e.to_str()) == Some("json");
    let config = if is_json {
        serde_json::from_str(&content)?
    } else {
        toml::from_str(&content)?
    };
    Ok(config)
}
