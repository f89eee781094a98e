//! Stage handles: the composed, navigable view of an opened asset.

use std::path::Path;

use crate::error::{Error, Result};

use super::layer::Layer;
use super::prim::Prim;

/// Read-side summary of an opened stage.
#[derive(Debug, Clone)]
pub struct StageInfo {
    /// Root layer identifier.
    pub identifier: String,
    /// Root layer on-disk path, if any.
    pub real_path: Option<String>,
    /// Declared file-format id.
    pub format: String,
    /// Sublayer paths as authored.
    pub sub_layers: Vec<String>,
    /// Default prim name, if declared.
    pub default_prim: Option<String>,
    /// Number of prims reachable by traversal.
    pub prim_count: usize,
}

/// An opened stage: a root layer plus prim traversal.
#[derive(Debug, Clone)]
pub struct Stage {
    root: Layer,
}

impl Stage {
    /// Open a stage from an asset path.
    ///
    /// A missing file or an unparseable document is a terminal open failure;
    /// everything downstream (missing dependencies, missing textures) is
    /// reported, never thrown.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::StageNotFound {
                path: path.to_path_buf(),
            });
        }

        let root = Layer::open(path)?;
        tracing::debug!("Opened stage: {}", root.identifier());
        Ok(Self { root })
    }

    /// Wrap an already-built layer (used for in-memory stages).
    pub fn from_layer(root: Layer) -> Self {
        Self { root }
    }

    /// The stage's root layer.
    pub fn root_layer(&self) -> &Layer {
        &self.root
    }

    /// Mutable access to the root layer.
    pub fn root_layer_mut(&mut self) -> &mut Layer {
        &mut self.root
    }

    /// Depth-first traversal of every prim, with full prim paths.
    pub fn traverse(&self) -> Vec<(String, &Prim)> {
        fn walk<'a>(prims: &'a [Prim], parent: &str, out: &mut Vec<(String, &'a Prim)>) {
            for prim in prims {
                let path = format!("{parent}/{}", prim.name);
                out.push((path.clone(), prim));
                walk(&prim.children, &path, out);
            }
        }

        let mut out = Vec::new();
        walk(self.root.prims(), "", &mut out);
        out
    }

    /// Number of prims reachable by traversal.
    pub fn prim_count(&self) -> usize {
        self.traverse().len()
    }

    /// Read-side summary for presentation layers.
    pub fn info(&self) -> StageInfo {
        StageInfo {
            identifier: self.root.identifier().to_string(),
            real_path: self
                .root
                .real_path()
                .map(|p| p.to_string_lossy().into_owned()),
            format: self.root.format_id().to_string(),
            sub_layers: self.root.sub_layer_paths().to_vec(),
            default_prim: self.root.default_prim().map(str::to_string),
            prim_count: self.prim_count(),
        }
    }

    /// Save the root layer back to disk.
    pub fn save(&self) -> Result<()> {
        self.root.save()
    }
}
