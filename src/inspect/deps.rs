//! Dependency scanning across sublayers, references, and payloads.

use std::collections::HashSet;

use crate::report::ValidationResult;
use crate::scene::{Layer, Stage};
use crate::utils::paths;

use super::textures::texture_results;

/// The composition mechanism a dependency was declared through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyKind {
    /// The root layer itself or one of its sublayers.
    Layer,
    /// A prim-level reference arc.
    Reference,
    /// A prim-level payload arc.
    Payload,
}

impl DependencyKind {
    /// Report category for this kind.
    pub fn category(self) -> &'static str {
        match self {
            DependencyKind::Layer => "Layers",
            DependencyKind::Reference => "References",
            DependencyKind::Payload => "Payloads",
        }
    }
}

/// One declared dependency of the scanned stage.
///
/// Immutable once created; deduplicated by
/// `(kind, resolved_path, prim_path, asset_path)` before reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// How the dependency is composed in.
    pub kind: DependencyKind,
    /// The asset path as authored.
    pub asset_path: String,
    /// Normalized absolute path, or an `anon:` marker.
    pub resolved_path: String,
    /// Owning prim path; empty for layer-level dependencies.
    pub prim_path: String,
}

impl Dependency {
    fn identity(&self) -> (DependencyKind, &str, &str, &str) {
        (
            self.kind,
            self.resolved_path.as_str(),
            self.prim_path.as_str(),
            self.asset_path.as_str(),
        )
    }
}

/// Root-layer self entry plus one entry per declared sublayer.
fn scan_layers(root_layer: &Layer) -> Vec<Dependency> {
    let mut deps = Vec::new();

    let self_resolved = root_layer
        .real_path()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| root_layer.identifier().to_string());
    deps.push(Dependency {
        kind: DependencyKind::Layer,
        asset_path: root_layer.identifier().to_string(),
        resolved_path: self_resolved,
        prim_path: String::new(),
    });

    for authored in root_layer.sub_layer_paths() {
        deps.push(Dependency {
            kind: DependencyKind::Layer,
            asset_path: authored.clone(),
            resolved_path: root_layer.resolve_asset_path(authored),
            prim_path: String::new(),
        });
    }

    deps
}

/// One entry per non-empty reference and payload arc on every prim.
fn scan_prim_arcs(stage: &Stage) -> Vec<Dependency> {
    let root_layer = stage.root_layer();
    let mut deps = Vec::new();

    for (prim_path, prim) in stage.traverse() {
        for (kind, arcs) in [
            (DependencyKind::Reference, prim.references()),
            (DependencyKind::Payload, prim.payloads()),
        ] {
            for arc in arcs {
                if arc.asset_path.is_empty() {
                    continue;
                }
                deps.push(Dependency {
                    kind,
                    asset_path: arc.asset_path.clone(),
                    resolved_path: root_layer.resolve_asset_path(&arc.asset_path),
                    prim_path: prim_path.clone(),
                });
            }
        }
    }

    deps
}

/// Scan a stage for its declared dependencies and classify each finding.
///
/// Returns the findings in insertion order alongside the deduplicated
/// dependency list. Missing files are findings, never errors; only an
/// unreadable stage fails before this point.
pub fn scan_stage(stage: &Stage) -> (Vec<ValidationResult>, Vec<Dependency>) {
    let root_layer = stage.root_layer();

    let mut deps = scan_layers(root_layer);
    deps.extend(scan_prim_arcs(stage));

    // De-dupe by identity key, first occurrence wins.
    let mut seen = HashSet::new();
    deps.retain(|d| {
        let key = (
            d.kind,
            d.resolved_path.clone(),
            d.prim_path.clone(),
            d.asset_path.clone(),
        );
        seen.insert(key)
    });

    let mut results = Vec::new();
    results.push(ValidationResult::info(
        "Stage",
        "Stage opened successfully.",
        "/",
        root_layer
            .real_path()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|| root_layer.identifier().to_string()),
    ));

    for dep in &deps {
        let category = dep.kind.category();

        if dep.kind == DependencyKind::Layer
            && (dep.resolved_path.is_empty() || paths::is_anonymous(&dep.resolved_path))
        {
            results.push(ValidationResult::info(
                category,
                "Anonymous/in-memory layer.",
                dep.prim_path.clone(),
                dep.asset_path.clone(),
            ));
            continue;
        }

        if paths::path_exists(&dep.resolved_path) {
            results.push(ValidationResult::info(
                category,
                "Dependency found.",
                dep.prim_path.clone(),
                dep.asset_path.clone(),
            ));
        } else {
            results.push(ValidationResult::error(
                category,
                "Missing dependency on disk.",
                dep.prim_path.clone(),
                dep.asset_path.clone(),
            ));
        }
    }

    let (tex_results, _) = texture_results(stage);
    results.extend(tex_results);

    tracing::debug!(
        "Scanned {}: {} dependencies, {} results",
        root_layer.identifier(),
        deps.len(),
        results.len()
    );

    (results, deps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Level;
    use crate::scene::{CompositionArc, Layer, Prim};

    fn stage_with_ref(temp: &tempfile::TempDir, target: &str) -> Stage {
        let mut layer = Layer::create(temp.path().join("root.stage"));
        let mut world = Prim::new("World");
        world.references.push(CompositionArc::new(target));
        layer.prims_mut().push(world);
        layer.save().unwrap();
        Stage::open(temp.path().join("root.stage")).unwrap()
    }

    #[test]
    fn root_layer_reports_itself() {
        let temp = tempfile::TempDir::new().unwrap();
        Layer::create(temp.path().join("root.stage")).save().unwrap();
        let stage = Stage::open(temp.path().join("root.stage")).unwrap();

        let (results, deps) = scan_stage(&stage);
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].kind, DependencyKind::Layer);
        assert!(paths::path_exists(&deps[0].resolved_path));
        // Stage row + layer self row + "no textures" row.
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.level == Level::Info));
    }

    #[test]
    fn missing_reference_is_an_error_finding() {
        let temp = tempfile::TempDir::new().unwrap();
        let stage = stage_with_ref(&temp, "./props/gone.stage");

        let (results, deps) = scan_stage(&stage);
        let dep = deps
            .iter()
            .find(|d| d.kind == DependencyKind::Reference)
            .unwrap();
        assert_eq!(dep.prim_path, "/World");
        assert!(dep.resolved_path.ends_with("gone.stage"));

        let finding = results
            .iter()
            .find(|r| r.category == "References")
            .unwrap();
        assert_eq!(finding.level, Level::Error);
        assert_eq!(finding.path, "./props/gone.stage");
    }

    #[test]
    fn scanning_twice_is_idempotent() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("chair.stage"),
            r#"{"header": {"version": "1.0"}}"#,
        )
        .unwrap();
        let stage = stage_with_ref(&temp, "./chair.stage");

        let (results_a, deps_a) = scan_stage(&stage);
        let (results_b, deps_b) = scan_stage(&stage);
        assert_eq!(deps_a, deps_b);
        assert_eq!(results_a, results_b);
    }

    #[test]
    fn duplicate_arcs_deduplicate() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut layer = Layer::create(temp.path().join("root.stage"));
        let mut world = Prim::new("World");
        world.references.push(CompositionArc::new("./chair.stage"));
        world.references.push(CompositionArc::new("./chair.stage"));
        layer.prims_mut().push(world);
        let stage = Stage::from_layer(layer);

        let (_, deps) = scan_stage(&stage);
        let refs: Vec<_> = deps
            .iter()
            .filter(|d| d.kind == DependencyKind::Reference)
            .collect();
        assert_eq!(refs.len(), 1);
    }

    #[test]
    fn anonymous_root_layer_is_info_not_missing() {
        let mut layer = Layer::anonymous("scratch");
        layer.set_sub_layer_paths(vec!["./shading.stage".into()]);
        let stage = Stage::from_layer(layer);

        let (results, _) = scan_stage(&stage);
        let layer_rows: Vec<_> = results
            .iter()
            .filter(|r| r.category == "Layers")
            .collect();
        assert_eq!(layer_rows.len(), 2);
        assert!(layer_rows
            .iter()
            .all(|r| r.level == Level::Info && r.message.contains("Anonymous")));
    }
}
