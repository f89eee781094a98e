//! Layer documents: the authored, on-disk form of a stage.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::utils::paths;

use super::prim::Prim;
use super::FORMAT_ID;

/// Header of a layer document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerHeader {
    /// Dialect version string.
    #[serde(default = "default_version")]
    pub version: String,
    /// Declared file-format id.
    #[serde(default = "default_format")]
    pub format: String,
    /// Name of the default prim, if declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_prim: Option<String>,
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_format() -> String {
    FORMAT_ID.to_string()
}

impl Default for LayerHeader {
    fn default() -> Self {
        Self {
            version: default_version(),
            format: default_format(),
            default_prim: None,
        }
    }
}

/// Serialized body of a layer document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayerDoc {
    /// Document header.
    #[serde(default)]
    pub header: LayerHeader,
    /// Sublayer paths, strongest last.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_layers: Vec<String>,
    /// Root prims, in authored order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prims: Vec<Prim>,
}

/// One authored layer: a document plus its identity.
///
/// File-backed layers carry an absolute on-disk path; anonymous layers carry
/// an identifier starting with the reserved `anon:` marker and no real path.
#[derive(Debug, Clone)]
pub struct Layer {
    identifier: String,
    real_path: Option<PathBuf>,
    doc: LayerDoc,
}

impl Layer {
    /// Open a layer document from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let real_path = paths::normalize(path.as_ref());
        let text = std::fs::read_to_string(&real_path)?;
        let doc: LayerDoc =
            serde_json::from_str(&text).map_err(|e| Error::StageOpenFailed {
                path: real_path.clone(),
                message: e.to_string(),
            })?;

        Ok(Self {
            identifier: real_path.to_string_lossy().into_owned(),
            real_path: Some(real_path),
            doc,
        })
    }

    /// Create an empty layer bound to an on-disk path; [`Layer::save`]
    /// writes it out.
    pub fn create<P: AsRef<Path>>(path: P) -> Self {
        let abs = std::path::absolute(path.as_ref())
            .unwrap_or_else(|_| path.as_ref().to_path_buf());
        let real_path = paths::normalize(abs);
        Self {
            identifier: real_path.to_string_lossy().into_owned(),
            real_path: Some(real_path),
            doc: LayerDoc::default(),
        }
    }

    /// Create an anonymous, in-memory layer.
    pub fn anonymous(tag: &str) -> Self {
        Self {
            identifier: format!("{}{tag}", paths::ANON_MARKER),
            real_path: None,
            doc: LayerDoc::default(),
        }
    }

    /// The layer's identifier: its absolute path, or an `anon:` marker.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The layer's on-disk path, if it has one.
    pub fn real_path(&self) -> Option<&Path> {
        self.real_path.as_deref()
    }

    /// Declared file-format id.
    pub fn format_id(&self) -> &str {
        &self.doc.header.format
    }

    /// True when this layer lives only in memory.
    pub fn is_anonymous(&self) -> bool {
        self.real_path.is_none()
    }

    /// Name of the default prim, if declared.
    pub fn default_prim(&self) -> Option<&str> {
        self.doc.header.default_prim.as_deref()
    }

    /// Sublayer paths as authored, strongest last.
    pub fn sub_layer_paths(&self) -> &[String] {
        &self.doc.sub_layers
    }

    /// Replace the sublayer path list.
    pub fn set_sub_layer_paths(&mut self, paths: Vec<String>) {
        self.doc.sub_layers = paths;
    }

    /// Root prims, in authored order.
    pub fn prims(&self) -> &[Prim] {
        &self.doc.prims
    }

    /// Mutable access to the root prims.
    pub fn prims_mut(&mut self) -> &mut Vec<Prim> {
        &mut self.doc.prims
    }

    /// Visit every prim depth-first with its full path, mutably.
    pub fn for_each_prim_mut<F>(&mut self, mut visit: F)
    where
        F: FnMut(&str, &mut Prim),
    {
        fn walk<F>(prims: &mut [Prim], parent: &str, visit: &mut F)
        where
            F: FnMut(&str, &mut Prim),
        {
            for prim in prims {
                let path = format!("{parent}/{}", prim.name);
                visit(&path, prim);
                walk(&mut prim.children, &path, visit);
            }
        }
        walk(&mut self.doc.prims, "", &mut visit);
    }

    /// Compute the absolute form of an asset path authored relative to this
    /// layer.
    ///
    /// Empty input yields empty output. Anonymous layers yield an `anon:`
    /// marker for relative input. Absolute and layer-relative paths are
    /// normalized for stable comparison; input that cannot be anchored at
    /// all comes back unchanged rather than failing.
    pub fn resolve_asset_path(&self, authored: &str) -> String {
        if authored.is_empty() {
            return String::new();
        }
        if paths::is_anonymous(authored) {
            return authored.to_string();
        }

        let authored_path = Path::new(authored);
        if authored_path.is_absolute() {
            return paths::normalize(authored_path).to_string_lossy().into_owned();
        }

        match self.real_path.as_deref().and_then(Path::parent) {
            Some(base) => paths::normalize(base.join(authored_path))
                .to_string_lossy()
                .into_owned(),
            None if self.is_anonymous() => format!("{}{authored}", paths::ANON_MARKER),
            None => authored.to_string(),
        }
    }

    /// Write the document back to its on-disk location.
    pub fn save(&self) -> Result<()> {
        let Some(path) = self.real_path.as_deref() else {
            return Err(Error::AnonymousLayerSave {
                identifier: self.identifier.clone(),
            });
        };
        let mut text = serde_json::to_string_pretty(&self.doc)?;
        text.push('\n');
        std::fs::write(path, text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_resolve_is_empty() {
        let layer = Layer::anonymous("scratch");
        assert_eq!(layer.resolve_asset_path(""), "");

        let temp = tempfile::TempDir::new().unwrap();
        Layer::create(temp.path().join("root.stage")).save().unwrap();
        let on_disk = Layer::open(temp.path().join("root.stage")).unwrap();
        assert_eq!(on_disk.resolve_asset_path(""), "");
    }

    #[test]
    fn relative_resolution_anchors_at_layer() {
        let temp = tempfile::TempDir::new().unwrap();
        let layer = Layer::create(temp.path().join("shots/seq010.stage"));

        let resolved = layer.resolve_asset_path("../props/chair.stage");
        let expected = paths::normalize(temp.path().join("props/chair.stage"));
        assert_eq!(resolved, expected.to_string_lossy());
    }

    #[test]
    fn anonymous_layer_marks_relative_paths() {
        let layer = Layer::anonymous("scratch");
        assert!(layer.identifier().starts_with("anon:"));
        assert_eq!(
            layer.resolve_asset_path("./props/chair.stage"),
            "anon:./props/chair.stage"
        );
        assert!(layer.save().is_err());
    }

    #[test]
    fn save_and_reopen_round_trip() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("root.stage");

        let mut layer = Layer::create(&path);
        layer.set_sub_layer_paths(vec!["./shading.stage".into()]);
        layer.prims_mut().push(Prim::new("World"));
        layer.save().unwrap();

        let reopened = Layer::open(&path).unwrap();
        assert_eq!(reopened.sub_layer_paths(), ["./shading.stage"]);
        assert_eq!(reopened.prims().len(), 1);
        assert_eq!(reopened.format_id(), FORMAT_ID);
    }
}
