//! Scene-graph collaborator: layers, stages, prims.
//!
//! A stage is the composed, navigable view of one scene-description asset.
//! The on-disk form is a JSON layer document (`.stage`): a header, an ordered
//! sublayer path list, and a prim tree. Prims carry composition arcs
//! (references and payloads) and, on shader prims, typed inputs whose
//! asset-typed values name texture files.
//!
//! The inspection and packaging engines consume this module through a small
//! canonical surface: [`Stage::open`], [`Stage::traverse`],
//! [`Layer::resolve_asset_path`], [`Prim::references`] / [`Prim::payloads`],
//! and [`ShaderInput::asset_value`].

pub mod layer;
pub mod prim;
pub mod stage;

pub use layer::Layer;
pub use prim::{AssetValue, CompositionArc, LayerOffset, Prim, ShaderInput};
pub use stage::{Stage, StageInfo};

/// Format id declared by layer documents written by this crate.
pub const FORMAT_ID: &str = "stage-json";

/// File extensions recognized as scene-description documents.
///
/// The first entry is the native dialect; the classic interchange extensions
/// are kept so packaged dependencies authored in them are still classified
/// as scene files.
pub const SCENE_EXTS: [&str; 5] = ["stage", "usd", "usda", "usdc", "usdz"];

/// True when the path's extension names a scene-description document.
pub fn is_scene_file<P: AsRef<std::path::Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_ascii_lowercase();
            SCENE_EXTS.contains(&ext.as_str())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_extension_check() {
        assert!(is_scene_file("shot.stage"));
        assert!(is_scene_file("props/chair.USDA"));
        assert!(!is_scene_file("tex.1001.png"));
        assert!(!is_scene_file("noext"));
    }
}
