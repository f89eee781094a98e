//! Package manifest: the persisted record of one packaging run.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::utils::now_utc_z;

use super::{CopiedFile, FileType, MissingFile};

/// File name of the manifest inside the package root.
pub const MANIFEST_NAME: &str = "manifest.json";

#[derive(Serialize)]
struct ManifestFileEntry<'a> {
    src: &'a str,
    dst: &'a str,
    #[serde(rename = "type")]
    file_type: FileType,
    size_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha256: Option<&'a str>,
}

#[derive(Serialize)]
struct ManifestCounts {
    copied: usize,
    missing: usize,
    by_type: IndexMap<&'static str, usize>,
}

#[derive(Serialize)]
struct ManifestDoc<'a> {
    tool: &'a str,
    version: &'a str,
    generated_at: String,
    source_usd: String,
    package_root: String,
    copied_files: Vec<ManifestFileEntry<'a>>,
    missing_files: &'a [MissingFile],
    counts: ManifestCounts,
}

/// Write the manifest as the final step of a packaging run.
///
/// Returns the absolute path of `manifest.json` under the package root.
pub fn write_manifest(
    package_root: &Path,
    source_asset: &Path,
    copied: &[CopiedFile],
    missing: &[MissingFile],
    tool_name: &str,
    version: &str,
) -> Result<PathBuf> {
    let count_type =
        |t: FileType| copied.iter().filter(|c| c.file_type == t).count();
    let mut by_type = IndexMap::new();
    by_type.insert("usd", count_type(FileType::Usd));
    by_type.insert("texture", count_type(FileType::Texture));
    by_type.insert("dep", count_type(FileType::Dep));

    let doc = ManifestDoc {
        tool: tool_name,
        version,
        generated_at: now_utc_z(),
        source_usd: source_asset.to_string_lossy().into_owned(),
        package_root: package_root.to_string_lossy().into_owned(),
        copied_files: copied
            .iter()
            .map(|c| ManifestFileEntry {
                src: &c.src,
                dst: &c.dst_rel,
                file_type: c.file_type,
                size_bytes: c.size_bytes,
                sha256: c.sha256.as_deref(),
            })
            .collect(),
        missing_files: missing,
        counts: ManifestCounts {
            copied: copied.len(),
            missing: missing.len(),
            by_type,
        },
    };

    let out_path = package_root.join(MANIFEST_NAME);
    let mut text = serde_json::to_string_pretty(&doc)?;
    text.push('\n');
    std::fs::write(&out_path, text)?;
    Ok(out_path)
}

/// Deserialized view of a written manifest, for consumers that audit
/// packages after the fact.
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestSummary {
    /// Tool identity stamped at packaging time.
    pub tool: String,
    /// Tool version stamped at packaging time.
    pub version: String,
    /// Generation timestamp (UTC, `Z`-suffixed).
    pub generated_at: String,
    /// The packaged source asset.
    pub source_usd: String,
    /// Absolute package root.
    pub package_root: String,
    /// Copied/missing counts.
    pub counts: ManifestSummaryCounts,
}

/// Counts block of a read-back manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestSummaryCounts {
    /// Number of copied files.
    pub copied: usize,
    /// Number of missing files.
    pub missing: usize,
    /// Copied counts keyed by file type.
    pub by_type: IndexMap<String, usize>,
}

impl ManifestSummary {
    /// Read a manifest back from disk.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
