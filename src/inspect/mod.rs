//! Stage inspection: dependency scanning and texture discovery.
//!
//! [`scan_stage`] is the per-asset entry point: it walks the three
//! composition mechanisms (sublayers, references, payloads), folds in
//! texture discovery, and returns an insertion-ordered finding list plus the
//! deduplicated dependency list.

pub mod deps;
pub mod textures;

pub use deps::{scan_stage, Dependency, DependencyKind};
pub use textures::{find_texture_assets, is_udim_pattern, texture_results, TextureHit};
