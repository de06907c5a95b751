//! JSON reporters
//!
//! `json` writes the whole report as one pretty document; `jsonl` writes one
//! compact object per line so large batches can be piped into jq.

use super::ScoreReport;
use anyhow::Result;
use serde::Serialize;

/// Render report as JSON
pub fn render(report: &ScoreReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Render each item as a compact JSON line
pub fn render_lines<T: Serialize>(items: &[T]) -> Result<String> {
    let mut out = String::new();
    for item in items {
        out.push_str(&serde_json::to_string(item)?);
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_report;

    #[test]
    fn test_json_render_valid() {
        let report = test_report();
        let json_str = render(&report).expect("render JSON");
        let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("parse JSON");
        assert_eq!(parsed["summary"]["total_prs"], 2);
        assert_eq!(parsed["skipped_records"], 3);
        let results = parsed["results"].as_array().expect("results array");
        assert_eq!(results[0]["number"], 101);
        assert_eq!(results[0]["importance"], "critical");
        assert_eq!(results[0]["reviewers"]["alice"], 1.0);
        assert_eq!(results[0]["event_counts"]["ack_comment"], 2);
    }

    #[test]
    fn test_jsonl_one_object_per_line() {
        let report = test_report();
        let out = render_lines(&report.results).expect("render JSONL");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        let second: serde_json::Value = serde_json::from_str(lines[1]).expect("parse line");
        assert_eq!(second["number"], 102);
        assert_eq!(second["review_quality"], "none");
    }
}
