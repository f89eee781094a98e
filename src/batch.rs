//! Batch orchestration: run the per-file entry points over a folder.
//!
//! One asset failing to open never aborts a batch; it becomes a failure
//! record and processing continues. Missing dependencies inside an asset are
//! findings, not file-level failures.

use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::inspect::scan_stage;
use crate::package::{package_stage, PackageOptions};
use crate::report::ValidationResult;
use crate::scene::Stage;
use crate::utils::{now_utc_z, paths};

/// Find all openable stage files in a directory recursively, sorted.
pub fn find_stage_files<P: AsRef<Path>>(folder: P) -> Result<Vec<PathBuf>> {
    let root = paths::normalize(folder.as_ref());
    if !root.is_dir() {
        return Err(Error::NotAFolder { path: root });
    }

    let mut files: Vec<PathBuf> = WalkDir::new(&root)
        .follow_links(true)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| {
            e.path().is_file()
                && e.path()
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("stage"))
        })
        .map(|e| e.path().to_path_buf())
        .collect();

    files.sort();
    Ok(files)
}

/// Scan every stage in a folder, returning all findings with a readable
/// header row pair per file so results stay grouped.
pub fn batch_scan<P: AsRef<Path>>(folder: P) -> Result<Vec<ValidationResult>> {
    let files = find_stage_files(folder)?;
    let mut all_results = Vec::new();

    for file in &files {
        all_results.push(ValidationResult::info(
            "Batch",
            "-".repeat(60),
            "",
            "",
        ));
        all_results.push(ValidationResult::info(
            "Batch",
            format!(
                "FILE: {}",
                file.file_name().map(|n| n.to_string_lossy()).unwrap_or_default()
            ),
            "",
            file.to_string_lossy(),
        ));

        match Stage::open(file) {
            Ok(stage) => {
                let (results, _deps) = scan_stage(&stage);
                all_results.extend(results);
            }
            Err(e) => {
                all_results.push(ValidationResult::error(
                    "Batch",
                    format!("Failed to scan: {e}"),
                    "",
                    file.to_string_lossy(),
                ));
            }
        }
    }

    Ok(all_results)
}

/// Per-file record of a batch scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanFileRecord {
    /// Absolute file path.
    pub file: String,
    /// Whether the file could be opened and scanned at all.
    pub ok: bool,
    /// ERROR findings for this file.
    pub errors: usize,
    /// WARNING findings for this file.
    pub warnings: usize,
    /// INFO findings for this file.
    pub infos: usize,
    /// Deduplicated dependencies discovered.
    pub dependencies: usize,
    /// Open/scan failure message, when `ok` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Batch-wide totals of a scan run.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ScanTotals {
    /// Files scanned successfully.
    pub files_ok: usize,
    /// Files that failed to open or scan.
    pub files_failed: usize,
    /// Total ERROR findings across files.
    pub errors: usize,
    /// Total WARNING findings across files.
    pub warnings: usize,
    /// Total INFO findings across files.
    pub infos: usize,
}

/// Summary of a batch scan over one folder.
#[derive(Debug, Clone, Serialize)]
pub struct BatchScanSummary {
    /// The scanned folder.
    pub root: String,
    /// Number of stage files discovered.
    pub file_count: usize,
    /// Batch-wide totals.
    pub totals: ScanTotals,
    /// One record per file, in discovery order.
    pub files: Vec<ScanFileRecord>,
}

/// Per-file record of a batch package run.
#[derive(Debug, Clone, Serialize)]
pub struct PackageFileRecord {
    /// Absolute source file path.
    pub file: String,
    /// Whether packaging completed for this file.
    pub ok: bool,
    /// Output subtree this file was packaged into.
    pub package_root: String,
    /// Files copied.
    pub copied: usize,
    /// Dependencies/textures recorded missing.
    pub missing: usize,
    /// Absolute manifest path, when packaging completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<String>,
    /// Failure message, when `ok` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Batch-wide totals of a package run.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct PackageTotals {
    /// Files packaged successfully.
    pub files_ok: usize,
    /// Files whose packaging failed outright.
    pub files_failed: usize,
    /// Total files copied across packages.
    pub copied: usize,
    /// Total missing entries across packages.
    pub missing: usize,
}

/// Summary of a batch package run over one folder.
#[derive(Debug, Clone, Serialize)]
pub struct BatchPackageSummary {
    /// The scanned folder.
    pub root: String,
    /// Number of stage files discovered.
    pub file_count: usize,
    /// Batch-wide totals.
    pub totals: PackageTotals,
    /// One record per file, in discovery order.
    pub files: Vec<PackageFileRecord>,
}

#[derive(Serialize)]
struct SummaryDoc<'a, T: Serialize, F: Serialize> {
    mode: &'a str,
    generated_at: String,
    root: &'a str,
    file_count: usize,
    totals: &'a T,
    files: &'a [F],
}

fn write_summary_json<T: Serialize, F: Serialize>(
    out_path: &Path,
    mode: &str,
    root: &str,
    totals: &T,
    files: &[F],
) -> Result<()> {
    let doc = SummaryDoc {
        mode,
        generated_at: now_utc_z(),
        root,
        file_count: files.len(),
        totals,
        files,
    };
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut text = serde_json::to_string_pretty(&doc)?;
    text.push('\n');
    std::fs::write(out_path, text)?;
    Ok(())
}

/// Scan every stage under `folder` and build the per-file summary.
pub fn batch_scan_summary<P: AsRef<Path>>(folder: P) -> Result<BatchScanSummary> {
    let root = paths::normalize(folder.as_ref());
    let files = find_stage_files(&root)?;

    let mut totals = ScanTotals::default();
    let mut records = Vec::with_capacity(files.len());

    for file in &files {
        let record = match Stage::open(file).map(|stage| scan_stage(&stage)) {
            Ok((results, deps)) => {
                let errors = results
                    .iter()
                    .filter(|r| r.level == crate::report::Level::Error)
                    .count();
                let warnings = results
                    .iter()
                    .filter(|r| r.level == crate::report::Level::Warning)
                    .count();
                let infos = results.len() - errors - warnings;
                totals.files_ok += 1;
                totals.errors += errors;
                totals.warnings += warnings;
                totals.infos += infos;
                ScanFileRecord {
                    file: file.to_string_lossy().into_owned(),
                    ok: true,
                    errors,
                    warnings,
                    infos,
                    dependencies: deps.len(),
                    error: None,
                }
            }
            Err(e) => {
                totals.files_failed += 1;
                ScanFileRecord {
                    file: file.to_string_lossy().into_owned(),
                    ok: false,
                    errors: 0,
                    warnings: 0,
                    infos: 0,
                    dependencies: 0,
                    error: Some(e.to_string()),
                }
            }
        };
        records.push(record);
    }

    Ok(BatchScanSummary {
        root: root.to_string_lossy().into_owned(),
        file_count: records.len(),
        totals,
        files: records,
    })
}

impl BatchScanSummary {
    /// Write the summary as UTF-8 JSON (`mode: "scan"`).
    pub fn write_json<P: AsRef<Path>>(&self, out_path: P) -> Result<()> {
        write_summary_json(out_path.as_ref(), "scan", &self.root, &self.totals, &self.files)
    }
}

/// Package every stage under `folder` into its own subtree of `output_root`,
/// mirroring the source folder structure.
pub fn batch_package_summary<P: AsRef<Path>, Q: AsRef<Path>>(
    folder: P,
    output_root: Q,
    options: &PackageOptions,
) -> Result<BatchPackageSummary> {
    let root = paths::normalize(folder.as_ref());
    let files = find_stage_files(&root)?;

    std::fs::create_dir_all(output_root.as_ref())?;
    let out_root = paths::normalize(output_root.as_ref());

    let mut totals = PackageTotals::default();
    let mut records = Vec::with_capacity(files.len());

    for file in &files {
        // Each file gets its own package subtree so independent runs never
        // collide: <out>/<relative parent>/<file stem>/.
        let relative = file.strip_prefix(&root).unwrap_or(file.as_path());
        let relative_parent = relative.parent().unwrap_or(Path::new(""));
        let stem = file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let package_root = out_root.join(relative_parent).join(&stem);

        let record = match package_stage(file, &package_root, options) {
            Ok(result) => {
                totals.files_ok += 1;
                totals.copied += result.copied.len();
                totals.missing += result.missing.len();
                PackageFileRecord {
                    file: file.to_string_lossy().into_owned(),
                    ok: true,
                    package_root: package_root.to_string_lossy().into_owned(),
                    copied: result.copied.len(),
                    missing: result.missing.len(),
                    manifest: Some(result.manifest_path.to_string_lossy().into_owned()),
                    error: None,
                }
            }
            Err(e) => {
                totals.files_failed += 1;
                PackageFileRecord {
                    file: file.to_string_lossy().into_owned(),
                    ok: false,
                    package_root: package_root.to_string_lossy().into_owned(),
                    copied: 0,
                    missing: 0,
                    manifest: None,
                    error: Some(e.to_string()),
                }
            }
        };
        records.push(record);
    }

    Ok(BatchPackageSummary {
        root: root.to_string_lossy().into_owned(),
        file_count: records.len(),
        totals,
        files: records,
    })
}

impl BatchPackageSummary {
    /// Write the summary as UTF-8 JSON (`mode: "package"`).
    pub fn write_json<P: AsRef<Path>>(&self, out_path: P) -> Result<()> {
        write_summary_json(
            out_path.as_ref(),
            "package",
            &self.root,
            &self.totals,
            &self.files,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Level;
    use crate::scene::Layer;

    fn write_stage(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        Layer::create(&path).save().unwrap();
        path
    }

    #[test]
    fn discovery_is_recursive_and_sorted() {
        let temp = tempfile::TempDir::new().unwrap();
        write_stage(temp.path(), "b.stage");
        write_stage(temp.path(), "sub/a.stage");
        std::fs::write(temp.path().join("notes.txt"), b"x").unwrap();

        let files = find_stage_files(temp.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("b.stage"));
        assert!(files[1].ends_with("sub/a.stage"));
    }

    #[test]
    fn not_a_folder_is_an_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let file = write_stage(temp.path(), "a.stage");
        assert!(matches!(
            find_stage_files(&file).unwrap_err(),
            Error::NotAFolder { .. }
        ));
    }

    #[test]
    fn one_broken_file_does_not_abort_the_batch() {
        let temp = tempfile::TempDir::new().unwrap();
        write_stage(temp.path(), "good.stage");
        std::fs::write(temp.path().join("broken.stage"), "not json").unwrap();

        let results = batch_scan(temp.path()).unwrap();
        let failures: Vec<_> = results
            .iter()
            .filter(|r| r.category == "Batch" && r.level == Level::Error)
            .collect();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].path.ends_with("broken.stage"));

        // The good file still produced its stage-open confirmation.
        assert!(results
            .iter()
            .any(|r| r.category == "Stage" && r.level == Level::Info));
    }

    #[test]
    fn scan_summary_totals_track_failures() {
        let temp = tempfile::TempDir::new().unwrap();
        write_stage(temp.path(), "good.stage");
        std::fs::write(temp.path().join("broken.stage"), "not json").unwrap();

        let summary = batch_scan_summary(temp.path()).unwrap();
        assert_eq!(summary.file_count, 2);
        assert_eq!(summary.totals.files_ok, 1);
        assert_eq!(summary.totals.files_failed, 1);

        let out = temp.path().join("summary.json");
        summary.write_json(&out).unwrap();
        let doc: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(doc["mode"], "scan");
        assert_eq!(doc["file_count"], 2);
        assert_eq!(doc["totals"]["files_failed"], 1);
        assert_eq!(doc["files"].as_array().unwrap().len(), 2);
    }
}
