//! Init command - write an example config

use anyhow::{Context, Result};
use console::style;
use std::path::Path;

use review_weight::config::{ProjectConfig, CONFIG_FILE};

/// Run the init command
pub fn run(data_dir: &Path, force: bool) -> Result<()> {
    if !data_dir.is_dir() {
        anyhow::bail!("Data directory does not exist: {}", data_dir.display());
    }

    let config_path = data_dir.join(CONFIG_FILE);
    if config_path.exists() && !force {
        println!(
            "{} Config already exists at {} (use --force to overwrite)",
            style("✓").green(),
            style(config_path.display()).cyan()
        );
        return Ok(());
    }

    std::fs::write(&config_path, ProjectConfig::example_toml())
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!(
        "{} Created {}",
        style("✓").green(),
        style(config_path.display()).cyan()
    );
    Ok(())
}
