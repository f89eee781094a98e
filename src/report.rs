//! Validation results and report output.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::utils::now_utc_z;

/// Severity of a validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    /// A problem that makes the asset incomplete.
    #[serde(rename = "ERROR")]
    Error,
    /// A finding worth attention but not blocking.
    #[serde(rename = "WARNING")]
    Warning,
    /// A confirmation or informational finding.
    #[serde(rename = "INFO")]
    Info,
}

impl Level {
    /// Sort rank: errors first.
    fn rank(self) -> u8 {
        match self {
            Level::Error => 0,
            Level::Warning => 1,
            Level::Info => 2,
        }
    }

    /// The serialized spelling (`ERROR`, `WARNING`, `INFO`).
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Error => "ERROR",
            Level::Warning => "WARNING",
            Level::Info => "INFO",
        }
    }
}

/// One finding produced by scanning, texture discovery, packaging, or batch
/// orchestration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Severity.
    pub level: Level,
    /// Category, e.g. `Stage`, `Layers`, `References`, `Payloads`,
    /// `Textures`, `Batch`.
    pub category: String,
    /// Human-readable message.
    pub message: String,
    /// Owning prim path; empty for layer-level findings.
    pub prim: String,
    /// The path the finding is about, usually as authored.
    pub path: String,
}

impl ValidationResult {
    /// Build a finding.
    pub fn new(
        level: Level,
        category: impl Into<String>,
        message: impl Into<String>,
        prim: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            level,
            category: category.into(),
            message: message.into(),
            prim: prim.into(),
            path: path.into(),
        }
    }

    /// Shorthand for an INFO finding.
    pub fn info(
        category: impl Into<String>,
        message: impl Into<String>,
        prim: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self::new(Level::Info, category, message, prim, path)
    }

    /// Shorthand for an ERROR finding.
    pub fn error(
        category: impl Into<String>,
        message: impl Into<String>,
        prim: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self::new(Level::Error, category, message, prim, path)
    }
}

/// Presentation ordering: severity, then category, prim, path, message.
///
/// The scan entry points keep insertion order; display layers call this to
/// impose the total order.
pub fn sort_for_display(results: &mut [ValidationResult]) {
    results.sort_by(|a, b| {
        a.level
            .rank()
            .cmp(&b.level.rank())
            .then_with(|| a.category.cmp(&b.category))
            .then_with(|| a.prim.cmp(&b.prim))
            .then_with(|| a.path.cmp(&b.path))
            .then_with(|| a.message.cmp(&b.message))
    });
}

/// Count results at a given level.
fn count_level(results: &[ValidationResult], level: Level) -> usize {
    results.iter().filter(|r| r.level == level).count()
}

#[derive(Serialize)]
struct ReportDoc<'a> {
    tool: &'a str,
    version: &'a str,
    generated_at: String,
    source_usd: &'a str,
    results: &'a [ValidationResult],
    counts: ReportCounts,
}

#[derive(Serialize)]
struct ReportCounts {
    #[serde(rename = "ERROR")]
    error: usize,
    #[serde(rename = "WARNING")]
    warning: usize,
    #[serde(rename = "INFO")]
    info: usize,
}

/// Write a scan report as UTF-8 JSON, creating parent directories as needed.
///
/// Returns the absolute path of the written report.
pub fn write_report_json<P: AsRef<Path>>(
    out_path: P,
    source_asset: &str,
    results: &[ValidationResult],
    tool_name: &str,
    version: &str,
) -> Result<String> {
    let doc = ReportDoc {
        tool: tool_name,
        version,
        generated_at: now_utc_z(),
        source_usd: source_asset,
        results,
        counts: ReportCounts {
            error: count_level(results, Level::Error),
            warning: count_level(results, Level::Warning),
            info: count_level(results, Level::Info),
        },
    };

    let out_path = out_path.as_ref();
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut text = serde_json::to_string_pretty(&doc)?;
    text.push('\n');
    std::fs::write(out_path, text)?;

    let abs = std::path::absolute(out_path)?;
    Ok(abs.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_order_puts_errors_first() {
        let mut results = vec![
            ValidationResult::info("Textures", "Texture found.", "/m", "a.png"),
            ValidationResult::error("Layers", "Missing dependency on disk.", "", "b.stage"),
            ValidationResult::info("Layers", "Dependency found.", "", "a.stage"),
        ];
        sort_for_display(&mut results);

        assert_eq!(results[0].level, Level::Error);
        assert_eq!(results[1].category, "Layers");
        assert_eq!(results[1].path, "a.stage");
        assert_eq!(results[2].category, "Textures");
    }

    #[test]
    fn report_json_counts_by_level() {
        let temp = tempfile::TempDir::new().unwrap();
        let out = temp.path().join("reports/scan.json");
        let results = vec![
            ValidationResult::info("Stage", "Stage opened successfully.", "/", "shot.stage"),
            ValidationResult::error("Textures", "Missing texture on disk.", "/m", "t.png"),
        ];

        let written =
            write_report_json(&out, "shot.stage", &results, "stagepack", "0.1.0").unwrap();
        let text = std::fs::read_to_string(written).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(doc["counts"]["ERROR"], 1);
        assert_eq!(doc["counts"]["INFO"], 1);
        assert_eq!(doc["counts"]["WARNING"], 0);
        assert_eq!(doc["results"][0]["level"], "INFO");
        assert!(doc["generated_at"].as_str().unwrap().ends_with('Z'));
    }
}
