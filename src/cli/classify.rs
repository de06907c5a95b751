//! Classify command - importance tier per PR

use anyhow::{Context, Result};
use std::path::Path;
use std::str::FromStr;

use review_weight::classifier::PrClassifier;
use review_weight::config::ProjectConfig;
use review_weight::loader::load_pull_requests;
use review_weight::reporters::{self, ClassifiedPr, OutputFormat};

pub fn run(config: &ProjectConfig, prs: &Path, format: &str, output: Option<&Path>) -> Result<()> {
    let format = OutputFormat::from_str(format)?;
    let (prs, _) = load_pull_requests(prs)
        .with_context(|| format!("Failed to load pull requests from {}", prs.display()))?;

    let classifier = PrClassifier::new(&config.classifier);
    let rows: Vec<ClassifiedPr> = prs
        .iter()
        .map(|pr| ClassifiedPr {
            number: pr.number,
            title: pr.title.clone(),
            classification: classifier.explain(pr),
        })
        .collect();

    if output.is_some() {
        console::set_colors_enabled(false);
    }
    let rendered = reporters::report_classifications(&rows, format)?;
    super::emit(&rendered, output)
}
