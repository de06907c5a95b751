//! Config command - show effective settings

use anyhow::{Context, Result};
use std::path::Path;

use review_weight::config::{user_config_path, ProjectConfig, CONFIG_FILE, JSON_CONFIG_FILE};

pub fn show(config: &ProjectConfig) -> Result<()> {
    let rendered = toml::to_string_pretty(config).context("Failed to render config")?;
    print!("{}", rendered);
    Ok(())
}

/// List config locations in search order, marking the ones that exist.
pub fn path(data_dir: &Path) -> Result<()> {
    let mut candidates = vec![data_dir.join(CONFIG_FILE), data_dir.join(JSON_CONFIG_FILE)];
    candidates.extend(user_config_path());
    for candidate in candidates {
        let marker = if candidate.exists() { "*" } else { " " };
        println!("{} {}", marker, candidate.display());
    }
    Ok(())
}
