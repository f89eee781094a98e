//! # stagepack
//!
//! A library for inspecting hierarchical scene-description assets and
//! packaging them into self-contained, relocatable copies.
//!
//! ## What it does
//!
//! - **Dependency scanning** - walks sublayers, references, and payloads and
//!   reports what exists on disk and what is missing
//! - **Texture discovery** - finds asset-typed shader inputs, including UDIM
//!   tile-set expansion across all three template spellings
//! - **Packaging** - copies an asset and everything it depends on into a
//!   structured output tree with collision-safe naming and a JSON manifest
//! - **Portable rewriting** - rewrites the packaged copy's internal paths to
//!   be package-relative so the whole tree can be relocated intact
//! - **Batch orchestration** - runs scans or packaging over a whole folder
//!   and aggregates per-file summaries
//!
//! ## Quick Start
//!
//! ### Scanning a stage
//!
//! ```no_run
//! use stagepack::prelude::*;
//!
//! let stage = Stage::open("shot.stage")?;
//! let (results, deps) = scan_stage(&stage);
//! for r in &results {
//!     println!("{} [{}] {}", r.level.as_str(), r.category, r.message);
//! }
//! println!("{} dependencies", deps.len());
//! # Ok::<(), stagepack::Error>(())
//! ```
//!
//! ### Building a portable package
//!
//! ```no_run
//! use stagepack::prelude::*;
//!
//! let options = PackageOptions {
//!     compute_hashes: true,
//!     portable: true,
//!     ..PackageOptions::default()
//! };
//! let result = package_stage("shot.stage", "out/shot_pkg", &options)?;
//! println!("copied {}, missing {}", result.copied.len(), result.missing.len());
//! # Ok::<(), stagepack::Error>(())
//! ```

pub mod batch;
pub mod error;
pub mod inspect;
pub mod package;
pub mod report;
pub mod scene;
pub mod utils;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::batch::{
        batch_package_summary, batch_scan, batch_scan_summary, find_stage_files,
        BatchPackageSummary, BatchScanSummary,
    };
    pub use crate::error::{Error, Result};
    pub use crate::inspect::{
        find_texture_assets, scan_stage, texture_results, Dependency, DependencyKind, TextureHit,
    };
    pub use crate::package::{
        package_stage, rewrite_packaged_stage, CopiedFile, FileType, ManifestSummary, Mapping,
        MissingFile, PackageOptions, PackageResult, RewriteStats,
    };
    pub use crate::report::{sort_for_display, write_report_json, Level, ValidationResult};
    pub use crate::scene::{
        AssetValue, CompositionArc, Layer, LayerOffset, Prim, ShaderInput, Stage, StageInfo,
    };
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
