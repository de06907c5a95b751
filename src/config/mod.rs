//! Configuration module for review-weight
//!
//! This module handles:
//! - The formal-review era cutoff
//! - Reconciliation and meaningful-review thresholds
//! - The maintainer handle set
//! - Importance classifier keyword and path sets

mod project_config;

pub use project_config::{
    load_project_config, user_config_path, ClassifierConfig, EraConfig, MaintainerConfig,
    ProjectConfig, ThresholdConfig, CONFIG_FILE, JSON_CONFIG_FILE,
};
