//! CLI command definitions and handlers

mod classify;
mod config;
mod init;
mod score;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use review_weight::config::{load_project_config, ProjectConfig};
use review_weight::loader::load_maintainers;

/// Parse a `YYYY-MM-DD` cutoff date
fn parse_cutoff(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| format!("'{}' is not a date (expected YYYY-MM-DD)", s))
}

/// review-weight - quality-weighted review counts for pull requests
#[derive(Parser, Debug)]
#[command(name = "review-weight")]
#[command(
    version,
    about = "Quality-weighted review counts across GitHub, IRC and the mailing list",
    long_about = "review-weight scores every review-like event on a pull request (formal \
reviews, ACK comments, IRC mentions, mailing-list emails), keeps each reviewer's best \
score, and sums them into a weighted review count. PRs whose count reaches the \
threshold for their era have meaningful review.",
    after_help = "\
Examples:
  review-weight score --prs prs.jsonl                         Summary table for a PR dump
  review-weight score --prs prs.jsonl --irc irc_index.json    Include IRC mentions
  review-weight score --prs prs.jsonl --format jsonl -o out.jsonl
  review-weight classify --prs prs.jsonl                      Importance tier per PR
  review-weight init                                          Write review-weight.toml"
)]
pub struct Cli {
    /// Directory searched for review-weight.toml
    #[arg(long, global = true, default_value = ".", env = "REVIEW_WEIGHT_DATA_DIR")]
    pub data_dir: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score review quality for every PR in a corpus file
    #[command(after_help = "\
Examples:
  review-weight score --prs prs.jsonl
  review-weight score --prs prs.json --irc irc_index.json --email email_index.json
  review-weight score --prs prs.jsonl --irc-log irc.jsonl --maintainers maintainers.txt
  review-weight score --prs prs.jsonl --cutoff 2016-09-14 --format json -o report.json")]
    Score {
        /// Pull requests (JSON Lines or JSON array)
        #[arg(long)]
        prs: PathBuf,

        /// Prebuilt IRC index: {"<pr>": [messages]}
        #[arg(long)]
        irc: Option<PathBuf>,

        /// Prebuilt email index: {"<pr>": [emails]}
        #[arg(long)]
        email: Option<PathBuf>,

        /// Raw IRC messages; PR references are extracted from the text
        #[arg(long)]
        irc_log: Option<PathBuf>,

        /// Raw mailing-list emails; PR references are extracted from subject and body
        #[arg(long)]
        email_log: Option<PathBuf>,

        /// Maintainer handles, one per line (overrides config)
        #[arg(long)]
        maintainers: Option<PathBuf>,

        /// Formal-review cutoff date, YYYY-MM-DD (overrides config)
        #[arg(long, value_parser = parse_cutoff)]
        cutoff: Option<NaiveDate>,

        /// Output format: text, json, jsonl
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json", "jsonl"])]
        format: String,

        /// Output file path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Classify each PR into an importance tier
    Classify {
        /// Pull requests (JSON Lines or JSON array)
        #[arg(long)]
        prs: PathBuf,

        /// Output format: text, json, jsonl
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json", "jsonl"])]
        format: String,

        /// Output file path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Write an example review-weight.toml to the data directory
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the config file search path
    Path,
}

/// Effective config for a data directory with CLI overrides applied.
fn effective_config(
    data_dir: &Path,
    cutoff: Option<NaiveDate>,
    maintainers: Option<&Path>,
) -> Result<ProjectConfig> {
    let mut config = load_project_config(data_dir);
    if let Some(cutoff) = cutoff {
        config.era.review_cutoff = cutoff;
    }
    if let Some(path) = maintainers {
        config.maintainers.handles = load_maintainers(path)
            .with_context(|| format!("Failed to load maintainers from {}", path.display()))?;
    }
    Ok(config)
}

/// Write rendered output to a file, or stdout when no path is given.
fn emit(rendered: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => print!("{}", rendered),
    }
    Ok(())
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Score {
            prs,
            irc,
            email,
            irc_log,
            email_log,
            maintainers,
            cutoff,
            format,
            output,
        } => {
            let config = effective_config(&cli.data_dir, cutoff, maintainers.as_deref())?;
            let sources = score::Sources {
                prs,
                irc,
                email,
                irc_log,
                email_log,
            };
            score::run(&config, &sources, &format, output.as_deref())
        }

        Commands::Classify {
            prs,
            format,
            output,
        } => {
            let config = effective_config(&cli.data_dir, None, None)?;
            classify::run(&config, &prs, &format, output.as_deref())
        }

        Commands::Init { force } => init::run(&cli.data_dir, force),

        Commands::Config { action } => match action {
            ConfigAction::Show => config::show(&effective_config(&cli.data_dir, None, None)?),
            ConfigAction::Path => config::path(&cli.data_dir),
        },
    }
}
