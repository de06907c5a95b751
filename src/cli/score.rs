//! Score command - weighted review counts for a PR corpus

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Instant;
use tracing::info;

use review_weight::config::ProjectConfig;
use review_weight::engine::ReviewEngine;
use review_weight::events::CrossPlatformIndex;
use review_weight::loader::{
    build_index_from_messages, load_index, load_pull_requests, load_records,
};
use review_weight::models::{Email, IrcMessage};
use review_weight::reporters::{self, OutputFormat, ScoreReport};

/// PRs scored per progress update
const CHUNK_SIZE: usize = 512;

/// Input files for a scoring run
#[derive(Debug, Clone)]
pub struct Sources {
    pub prs: PathBuf,
    pub irc: Option<PathBuf>,
    pub email: Option<PathBuf>,
    pub irc_log: Option<PathBuf>,
    pub email_log: Option<PathBuf>,
}

fn create_bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .expect("valid template")
        .progress_chars("█▓▒░  ")
}

/// Machine-readable output and batches that finish within one chunk run
/// without a bar.
fn scoring_bar(len: usize, format: OutputFormat) -> ProgressBar {
    let quiet_mode = matches!(format, OutputFormat::Json | OutputFormat::Jsonl);
    if quiet_mode || len <= CHUNK_SIZE {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len as u64);
    bar.set_style(create_bar_style());
    bar.set_message("scoring");
    bar
}

/// Assemble the cross-platform index from prebuilt indices and raw logs.
pub fn build_index(config: &ProjectConfig, sources: &Sources) -> Result<CrossPlatformIndex> {
    let mut index = CrossPlatformIndex::new(config.maintainers.handle_set());

    if let Some(path) = &sources.irc {
        let (irc, stats) = load_index::<IrcMessage>(path)
            .with_context(|| format!("Failed to load IRC index {}", path.display()))?;
        info!("Read {} indexed IRC messages ({} skipped)", stats.loaded, stats.skipped);
        index = index.with_irc(irc);
    }
    if let Some(path) = &sources.irc_log {
        let (messages, stats) = load_records::<IrcMessage>(path)
            .with_context(|| format!("Failed to load IRC log {}", path.display()))?;
        info!("Read {} IRC messages ({} skipped)", stats.loaded, stats.skipped);
        index = index.with_irc(build_index_from_messages(&messages));
    }
    if let Some(path) = &sources.email {
        let (email, stats) = load_index::<Email>(path)
            .with_context(|| format!("Failed to load email index {}", path.display()))?;
        info!("Read {} indexed emails ({} skipped)", stats.loaded, stats.skipped);
        index = index.with_email(email);
    }
    if let Some(path) = &sources.email_log {
        let (emails, stats) = load_records::<Email>(path)
            .with_context(|| format!("Failed to load email log {}", path.display()))?;
        info!("Read {} emails ({} skipped)", stats.loaded, stats.skipped);
        index = index.with_email(build_index_from_messages(&emails));
    }

    let (irc_prs, email_prs) = index.coverage();
    info!("Cross-platform index: {} PRs with IRC, {} with email", irc_prs, email_prs);
    Ok(index)
}

/// Run the score command
pub fn run(
    config: &ProjectConfig,
    sources: &Sources,
    format: &str,
    output: Option<&Path>,
) -> Result<()> {
    let format = OutputFormat::from_str(format)?;
    let start = Instant::now();

    let (prs, stats) = load_pull_requests(&sources.prs)
        .with_context(|| format!("Failed to load pull requests from {}", sources.prs.display()))?;
    let index = build_index(config, sources)?;
    let engine = ReviewEngine::new(config, index);

    let bar = scoring_bar(prs.len(), format);

    let mut results = Vec::with_capacity(prs.len());
    for chunk in prs.chunks(CHUNK_SIZE) {
        results.extend(engine.score_all(chunk));
        bar.inc(chunk.len() as u64);
    }
    bar.finish_and_clear();
    info!("Scored {} PRs in {:.2?}", results.len(), start.elapsed());

    let report = ScoreReport::new(results, stats.skipped);
    if output.is_some() {
        console::set_colors_enabled(false);
    }
    let rendered = reporters::report(&report, format)?;
    super::emit(&rendered, output)
}
