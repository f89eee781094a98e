//! Packaging: materialize a self-contained, relocatable copy of an asset.
//!
//! [`package_stage`] copies the root asset and every resolved dependency and
//! texture into a structured output tree (`usd/`, `textures/`, `deps/`),
//! builds a `manifest.json`, and optionally rewrites the copied asset's
//! internal paths to be package-relative.

pub mod manifest;
pub mod rewrite;

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::inspect::{find_texture_assets, scan_stage};
use crate::scene::{self, Stage};
use crate::utils::{hashing, paths};

pub use manifest::{write_manifest, ManifestSummary, MANIFEST_NAME};
pub use rewrite::{rewrite_packaged_stage, RewriteStats};

/// Classification of a copied file inside the package tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileType {
    /// Scene-description documents; land in `usd/`.
    #[serde(rename = "usd")]
    Usd,
    /// Texture files; land in `textures/`.
    #[serde(rename = "texture")]
    Texture,
    /// Everything else a dependency resolves to; lands in `deps/`.
    #[serde(rename = "dep")]
    Dep,
}

/// One successfully copied file. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopiedFile {
    /// Absolute source path.
    pub src: String,
    /// Absolute destination path.
    pub dst: String,
    /// Destination path relative to the package root.
    pub dst_rel: String,
    /// Classification driving the destination subtree.
    pub file_type: FileType,
    /// Size of the copy on disk.
    pub size_bytes: u64,
    /// SHA256 of the copy, when hashing was requested.
    pub sha256: Option<String>,
}

/// A dependency or texture that could not be found at packaging time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingFile {
    /// Report category (`Layers`, `References`, `Payloads`, `Textures`).
    pub category: String,
    /// The path as authored (or the raw texture value).
    pub src: String,
    /// The resolved path that did not exist.
    pub resolved: String,
}

/// Source-absolute path to package-relative destination, one per run.
pub type Mapping = IndexMap<String, String>;

/// Options for one packaging run.
#[derive(Debug, Clone)]
pub struct PackageOptions {
    /// Compute SHA256 digests of copied files into the manifest.
    pub compute_hashes: bool,
    /// Rewrite the copied asset's internal paths to be package-relative.
    pub portable: bool,
    /// Tool identity stamped into the manifest.
    pub tool_name: String,
    /// Tool version stamped into the manifest.
    pub version: String,
}

impl Default for PackageOptions {
    fn default() -> Self {
        Self {
            compute_hashes: false,
            portable: false,
            tool_name: "stagepack".to_string(),
            version: "0.1.0".to_string(),
        }
    }
}

/// Everything a packaging run produced.
///
/// `rewrite` is always present as a field and populated only when portable
/// packaging was requested.
#[derive(Debug, Clone)]
pub struct PackageResult {
    /// Every file copied, in copy order.
    pub copied: Vec<CopiedFile>,
    /// Source-absolute path to package-relative destination.
    pub mapping: Mapping,
    /// Dependencies and textures that could not be found.
    pub missing: Vec<MissingFile>,
    /// Absolute path of the written `manifest.json`.
    pub manifest_path: PathBuf,
    /// Portable-rewrite statistics, when portable mode ran.
    pub rewrite: Option<RewriteStats>,
}

/// Pick a collision-free file name in `dest_dir`.
///
/// The first file keeps the bare name; later collisions get `_001`, `_002`,
/// ... suffixes in copy order.
fn choose_unique_name(dest_dir: &Path, filename: &str) -> String {
    if !dest_dir.join(filename).exists() {
        return filename.to_string();
    }

    let stem = Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string());
    let ext = Path::new(filename)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut i = 1usize;
    loop {
        let candidate = format!("{stem}_{i:03}{ext}");
        if !dest_dir.join(&candidate).exists() {
            return candidate;
        }
        i += 1;
    }
}

/// Copy `src` into `dest_dir` under a collision-free name.
fn copy_into(src: &Path, dest_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dest_dir)?;
    let name = src
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| Error::InvalidPath(src.to_string_lossy().into_owned()))?;
    let dst = dest_dir.join(choose_unique_name(dest_dir, &name));
    std::fs::copy(src, &dst)?;
    Ok(dst)
}

fn classify(path: &Path) -> FileType {
    if scene::is_scene_file(path) {
        FileType::Usd
    } else {
        FileType::Dep
    }
}

/// Package an asset and everything it depends on into `output_root`.
///
/// The root asset is copied first and seeds the mapping; a missing root is a
/// hard failure. Every other missing dependency or texture is recorded and
/// packaging continues. The manifest is written last; portable rewriting,
/// when requested, runs after the manifest using the just-built mapping.
pub fn package_stage<P: AsRef<Path>, Q: AsRef<Path>>(
    source_asset: P,
    output_root: Q,
    options: &PackageOptions,
) -> Result<PackageResult> {
    let src_path = paths::normalize(source_asset.as_ref());
    if !src_path.exists() {
        return Err(Error::PackageSourceMissing { path: src_path });
    }

    std::fs::create_dir_all(output_root.as_ref())?;
    let out_root = paths::normalize(output_root.as_ref());
    let usd_dir = out_root.join("usd");
    let tex_dir = out_root.join("textures");
    let dep_dir = out_root.join("deps");
    for dir in [&usd_dir, &tex_dir, &dep_dir] {
        std::fs::create_dir_all(dir)?;
    }

    tracing::info!(
        "Packaging {} into {}",
        src_path.display(),
        out_root.display()
    );

    let stage = Stage::open(&src_path)?;
    let (_results, deps) = scan_stage(&stage);
    let tex_hits = find_texture_assets(&stage);

    let mut copied: Vec<CopiedFile> = Vec::new();
    let mut mapping: Mapping = Mapping::new();
    let mut missing: Vec<MissingFile> = Vec::new();

    let record_copy =
        |copied: &mut Vec<CopiedFile>,
         mapping: &mut Mapping,
         src_abs: &Path,
         dst_abs: &Path,
         file_type: FileType|
         -> Result<()> {
            let dst_rel = dst_abs
                .strip_prefix(&out_root)
                .map(paths::to_posix)
                .unwrap_or_else(|_| paths::to_posix(dst_abs));
            let size_bytes = std::fs::metadata(dst_abs).map(|m| m.len()).unwrap_or(0);
            let sha256 = if options.compute_hashes && dst_abs.exists() {
                Some(hashing::sha256_file(dst_abs)?)
            } else {
                None
            };

            copied.push(CopiedFile {
                src: src_abs.to_string_lossy().into_owned(),
                dst: dst_abs.to_string_lossy().into_owned(),
                dst_rel: dst_rel.clone(),
                file_type,
                size_bytes,
                sha256,
            });
            mapping.insert(src_abs.to_string_lossy().into_owned(), dst_rel);
            Ok(())
        };

    // The root asset always goes first so it seeds the mapping.
    let packaged_root = copy_into(&src_path, &usd_dir)?;
    record_copy(
        &mut copied,
        &mut mapping,
        &src_path,
        &packaged_root,
        FileType::Usd,
    )?;

    for dep in &deps {
        if dep.resolved_path.is_empty() || paths::is_anonymous(&dep.resolved_path) {
            continue;
        }
        let abs_src = paths::normalize(&dep.resolved_path);
        if abs_src == src_path {
            continue;
        }

        if !abs_src.exists() {
            missing.push(MissingFile {
                category: dep.kind.category().to_string(),
                src: dep.asset_path.clone(),
                resolved: abs_src.to_string_lossy().into_owned(),
            });
            continue;
        }

        let file_type = classify(&abs_src);
        let target_dir = match file_type {
            FileType::Usd => &usd_dir,
            _ => &dep_dir,
        };
        let dst = copy_into(&abs_src, target_dir)?;
        record_copy(&mut copied, &mut mapping, &abs_src, &dst, file_type)?;
    }

    for hit in &tex_hits {
        if hit.resolved_path.is_empty() || paths::is_anonymous(&hit.resolved_path) {
            continue;
        }
        let abs_tex = paths::normalize(&hit.resolved_path);

        if !abs_tex.exists() {
            missing.push(MissingFile {
                category: "Textures".to_string(),
                src: hit.raw_value.clone(),
                resolved: abs_tex.to_string_lossy().into_owned(),
            });
            continue;
        }

        let dst = copy_into(&abs_tex, &tex_dir)?;
        record_copy(&mut copied, &mut mapping, &abs_tex, &dst, FileType::Texture)?;
    }

    let manifest_path = write_manifest(
        &out_root,
        &src_path,
        &copied,
        &missing,
        &options.tool_name,
        &options.version,
    )?;

    let rewrite = if options.portable {
        let stats = rewrite_packaged_stage(&packaged_root, &mapping)?;
        tracing::info!(
            "Portable rewrite: {} sublayers, {} references, {} payloads, {} textures",
            stats.sublayers,
            stats.references,
            stats.payloads,
            stats.textures
        );
        Some(stats)
    } else {
        None
    };

    tracing::info!(
        "Packaged {} files ({} missing)",
        copied.len(),
        missing.len()
    );

    Ok(PackageResult {
        copied,
        mapping,
        missing,
        manifest_path,
        rewrite,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_names_suffix_in_copy_order() {
        let temp = tempfile::TempDir::new().unwrap();
        assert_eq!(choose_unique_name(temp.path(), "chair.stage"), "chair.stage");

        std::fs::write(temp.path().join("chair.stage"), b"a").unwrap();
        assert_eq!(
            choose_unique_name(temp.path(), "chair.stage"),
            "chair_001.stage"
        );

        std::fs::write(temp.path().join("chair_001.stage"), b"b").unwrap();
        assert_eq!(
            choose_unique_name(temp.path(), "chair.stage"),
            "chair_002.stage"
        );
    }

    #[test]
    fn missing_root_is_a_hard_failure() {
        let temp = tempfile::TempDir::new().unwrap();
        let err = package_stage(
            temp.path().join("gone.stage"),
            temp.path().join("pkg"),
            &PackageOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::PackageSourceMissing { .. }));
    }
}
