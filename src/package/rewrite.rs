//! Portable path rewriting inside the packaged copy of an asset.

use std::path::Path;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::scene::{AssetValue, Layer, Stage};
use crate::utils::paths;

use super::Mapping;

/// Per-category counts of rewritten entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RewriteStats {
    /// Rewritten root-layer sublayer paths.
    pub sublayers: usize,
    /// Rewritten reference arcs.
    pub references: usize,
    /// Rewritten payload arcs.
    pub payloads: usize,
    /// Rewritten asset-typed shader input values.
    pub textures: usize,
}

/// Recover the original source location of the packaged root asset.
///
/// The root copy seeds the mapping, so the entry whose destination is the
/// packaged copy itself points back at the original source. That source
/// anchors authored-path resolution: the copy still holds pre-rewrite
/// values authored against the original source locations.
fn source_anchor(packaged: &Path, mapping: &Mapping) -> Option<std::path::PathBuf> {
    let out_root = packaged.parent()?.parent()?;
    let rel = packaged.strip_prefix(out_root).ok().map(paths::to_posix)?;
    mapping
        .iter()
        .find(|(_, dst_rel)| **dst_rel == rel)
        .map(|(src, _)| std::path::PathBuf::from(src))
        .or_else(|| mapping.keys().next().map(std::path::PathBuf::from))
}

/// Package-relative destination for an authored value, if it was packaged.
///
/// The authored value is resolved back to a source-absolute path before the
/// mapping lookup. Values that resolve to nothing in the mapping were not
/// packaged and stay untouched.
fn mapped_destination(resolver: &Layer, authored: &str, mapping: &Mapping) -> Option<String> {
    if authored.is_empty() {
        return None;
    }
    let resolved = resolver.resolve_asset_path(authored);
    let src_abs = paths::normalize(&resolved);
    mapping
        .get(src_abs.to_string_lossy().as_ref())
        .map(|rel| paths::to_posix(rel))
}

fn rewrite_sublayers(layer: &mut Layer, resolver: &Layer, mapping: &Mapping) -> usize {
    let mut changed = 0;
    let new_paths: Vec<String> = layer
        .sub_layer_paths()
        .iter()
        .map(|authored| match mapped_destination(resolver, authored, mapping) {
            Some(dst_rel) => {
                changed += 1;
                dst_rel
            }
            None => authored.clone(),
        })
        .collect();

    if changed > 0 {
        layer.set_sub_layer_paths(new_paths);
    }
    changed
}

/// Rewrite sublayer, reference, payload, and texture-input paths inside the
/// packaged copy of the root asset.
///
/// Arc qualifiers (target prim, layer offset) are preserved; mapping misses
/// leave the authored value untouched. The copy is saved back to disk even
/// when nothing changed, so a packaging run always ends with a deterministic
/// final write.
pub fn rewrite_packaged_stage<P: AsRef<Path>>(
    packaged_asset: P,
    mapping: &Mapping,
) -> Result<RewriteStats> {
    let packaged_asset = packaged_asset.as_ref();
    if !packaged_asset.exists() {
        return Err(Error::PackagedStageMissing {
            path: packaged_asset.to_path_buf(),
        });
    }

    let mut stage = Stage::open(packaged_asset)?;
    let anchor = source_anchor(packaged_asset, mapping)
        .unwrap_or_else(|| packaged_asset.to_path_buf());
    let resolver = Layer::create(anchor);

    let sublayers = rewrite_sublayers(stage.root_layer_mut(), &resolver, mapping);
    let mut stats = RewriteStats {
        sublayers,
        ..RewriteStats::default()
    };

    stage.root_layer_mut().for_each_prim_mut(|_path, prim| {
        let new_refs: Vec<_> = prim
            .references()
            .iter()
            .map(|arc| match mapped_destination(&resolver, &arc.asset_path, mapping) {
                Some(dst_rel) => {
                    stats.references += 1;
                    arc.with_asset_path(dst_rel)
                }
                None => arc.clone(),
            })
            .collect();
        prim.set_references(new_refs);

        let new_payloads: Vec<_> = prim
            .payloads()
            .iter()
            .map(|arc| match mapped_destination(&resolver, &arc.asset_path, mapping) {
                Some(dst_rel) => {
                    stats.payloads += 1;
                    arc.with_asset_path(dst_rel)
                }
                None => arc.clone(),
            })
            .collect();
        prim.set_payloads(new_payloads);

        if prim.is_shader() {
            for input in &mut prim.inputs {
                let Some(value) = input.asset_value() else {
                    continue;
                };
                let rewritten = match value {
                    AssetValue::Single(p) => {
                        match mapped_destination(&resolver, &p, mapping) {
                            Some(dst_rel) => {
                                stats.textures += 1;
                                Some(AssetValue::Single(dst_rel))
                            }
                            None => None,
                        }
                    }
                    AssetValue::List(items) => {
                        let mut any = false;
                        let new_items: Vec<String> = items
                            .into_iter()
                            .map(|p| match mapped_destination(&resolver, &p, mapping) {
                                Some(dst_rel) => {
                                    stats.textures += 1;
                                    any = true;
                                    dst_rel
                                }
                                None => p,
                            })
                            .collect();
                        any.then_some(AssetValue::List(new_items))
                    }
                };
                if let Some(new_value) = rewritten {
                    input.set_asset_value(new_value);
                }
            }
        }
    });

    // A no-op rewrite still saves, for determinism.
    stage.save()?;
    Ok(stats)
}
