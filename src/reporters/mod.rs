//! Output reporters for review-weight results
//!
//! Supports multiple output formats:
//! - `text` - Terminal tables with colors
//! - `json` - Pretty JSON with summary and per-PR results
//! - `jsonl` - One JSON object per PR, for streaming into other tools

mod json;
mod text;

use crate::classifier::Classification;
use crate::engine::PrReviewScore;
use crate::summary::BatchSummary;
use anyhow::{anyhow, Result};
use serde::Serialize;
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Jsonl,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "jsonl" | "ndjson" => Ok(OutputFormat::Jsonl),
            _ => Err(anyhow!(
                "Unknown format '{}'. Valid formats: text, json, jsonl",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}

/// Everything a `score` run produces.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreReport {
    pub summary: BatchSummary,
    /// Records dropped while loading the PR file
    pub skipped_records: usize,
    pub results: Vec<PrReviewScore>,
}

impl ScoreReport {
    pub fn new(results: Vec<PrReviewScore>, skipped_records: usize) -> Self {
        Self {
            summary: BatchSummary::from_scores(&results),
            skipped_records,
            results,
        }
    }
}

/// One row of `classify` output.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedPr {
    pub number: u64,
    pub title: String,
    #[serde(flatten)]
    pub classification: Classification,
}

/// Render a score report in the given format
pub fn report(report: &ScoreReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(text::render(report)),
        OutputFormat::Json => json::render(report),
        OutputFormat::Jsonl => json::render_lines(&report.results),
    }
}

/// Render classifier output in the given format
pub fn report_classifications(rows: &[ClassifiedPr], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(text::render_classifications(rows)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(rows)?),
        OutputFormat::Jsonl => json::render_lines(rows),
    }
}
