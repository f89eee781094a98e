//! Prim tree structures: composition arcs and shader inputs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Value-type token for single asset-path shader inputs.
pub const TYPE_ASSET: &str = "asset";
/// Value-type token for asset-path-array shader inputs.
pub const TYPE_ASSET_ARRAY: &str = "asset[]";

/// A time offset/scale applied across a composition arc.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerOffset {
    /// Time offset applied to the referenced content.
    #[serde(default)]
    pub offset: f64,
    /// Time scale applied to the referenced content.
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_scale() -> f64 {
    1.0
}

impl Default for LayerOffset {
    fn default() -> Self {
        Self {
            offset: 0.0,
            scale: default_scale(),
        }
    }
}

/// One reference or payload arc: an asset path plus optional qualifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionArc {
    /// The authored asset path (possibly relative to the owning layer).
    pub asset_path: String,
    /// Optional prim path to target inside the referenced asset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_prim: Option<String>,
    /// Optional time offset/scale for the arc.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_offset: Option<LayerOffset>,
}

impl CompositionArc {
    /// Create an arc with just an asset path.
    pub fn new(asset_path: impl Into<String>) -> Self {
        Self {
            asset_path: asset_path.into(),
            target_prim: None,
            layer_offset: None,
        }
    }

    /// Copy of this arc with the asset path replaced and qualifiers kept.
    pub fn with_asset_path(&self, asset_path: impl Into<String>) -> Self {
        Self {
            asset_path: asset_path.into(),
            target_prim: self.target_prim.clone(),
            layer_offset: self.layer_offset,
        }
    }
}

/// Authored value of an asset-typed shader input.
///
/// Exactly one of a single path or a list of paths; the inspection code
/// pattern-matches on the variant instead of probing value shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum AssetValue {
    /// A single asset path.
    Single(String),
    /// An asset-array value, one path per element.
    List(Vec<String>),
}

impl AssetValue {
    /// The raw path strings carried by this value, empty entries skipped.
    pub fn paths(&self) -> Vec<&str> {
        match self {
            AssetValue::Single(p) => {
                if p.is_empty() {
                    Vec::new()
                } else {
                    vec![p.as_str()]
                }
            }
            AssetValue::List(ps) => ps
                .iter()
                .filter(|p| !p.is_empty())
                .map(String::as_str)
                .collect(),
        }
    }
}

/// Raw authored input value as it appears in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputValue {
    /// A single string value (asset path for asset-typed inputs).
    Text(String),
    /// A string-array value.
    TextList(Vec<String>),
    /// Any other JSON value (numbers, colors, ...).
    Other(Value),
}

/// A declared shader input: base name, value-type token, authored value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShaderInput {
    /// Base name of the input (without any namespace prefix).
    pub name: String,
    /// Declared value-type token, e.g. `asset`, `asset[]`, `float`.
    #[serde(rename = "type")]
    pub type_name: String,
    /// The authored value.
    pub value: InputValue,
}

impl ShaderInput {
    /// True when the declared type is asset or asset-array.
    pub fn is_asset_typed(&self) -> bool {
        self.type_name == TYPE_ASSET || self.type_name == TYPE_ASSET_ARRAY
    }

    /// The authored asset value, if this input is asset-typed and its value
    /// has a matching shape.
    pub fn asset_value(&self) -> Option<AssetValue> {
        if !self.is_asset_typed() {
            return None;
        }
        match &self.value {
            InputValue::Text(s) => Some(AssetValue::Single(s.clone())),
            InputValue::TextList(l) => Some(AssetValue::List(l.clone())),
            InputValue::Other(_) => None,
        }
    }

    /// Replace the authored value with an asset value.
    pub fn set_asset_value(&mut self, value: AssetValue) {
        self.value = match value {
            AssetValue::Single(p) => InputValue::Text(p),
            AssetValue::List(l) => InputValue::TextList(l),
        };
    }
}

/// A named node in the scene hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prim {
    /// Prim name (one path component).
    pub name: String,
    /// Optional type token, e.g. `Xform`, `Mesh`, `Shader`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// Reference arcs authored on this prim.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<CompositionArc>,
    /// Payload arcs authored on this prim.
    ///
    /// Older documents author the field as singular `payload`; the alias
    /// normalizes that spelling at load time. A document carrying both
    /// spellings on one prim fails to parse rather than silently preferring
    /// either.
    #[serde(default, alias = "payload", skip_serializing_if = "Vec::is_empty")]
    pub payloads: Vec<CompositionArc>,
    /// Declared inputs; only meaningful on shader prims.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<ShaderInput>,
    /// Child prims, in authored order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Prim>,
}

impl Prim {
    /// Create an empty prim with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: None,
            references: Vec::new(),
            payloads: Vec::new(),
            inputs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// True when this prim is a shader node.
    pub fn is_shader(&self) -> bool {
        self.type_name.as_deref() == Some("Shader")
    }

    /// Canonical accessor for reference arc items.
    pub fn references(&self) -> &[CompositionArc] {
        &self.references
    }

    /// Canonical accessor for payload arc items.
    pub fn payloads(&self) -> &[CompositionArc] {
        &self.payloads
    }

    /// Replace all reference arcs (clear + re-add).
    pub fn set_references(&mut self, arcs: Vec<CompositionArc>) {
        self.references = arcs;
    }

    /// Replace all payload arcs (clear + re-add).
    pub fn set_payloads(&mut self, arcs: Vec<CompositionArc>) {
        self.payloads = arcs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_value_extraction() {
        let single = ShaderInput {
            name: "file".into(),
            type_name: TYPE_ASSET.into(),
            value: InputValue::Text("./tex.png".into()),
        };
        assert_eq!(
            single.asset_value(),
            Some(AssetValue::Single("./tex.png".into()))
        );

        let array = ShaderInput {
            name: "files".into(),
            type_name: TYPE_ASSET_ARRAY.into(),
            value: InputValue::TextList(vec!["a.png".into(), String::new(), "b.png".into()]),
        };
        let value = array.asset_value().unwrap();
        assert_eq!(value.paths(), vec!["a.png", "b.png"]);

        let not_asset = ShaderInput {
            name: "roughness".into(),
            type_name: "float".into(),
            value: InputValue::Other(serde_json::json!(0.5)),
        };
        assert_eq!(not_asset.asset_value(), None);
    }

    #[test]
    fn payload_singular_alias() {
        let prim: Prim = serde_json::from_str(
            r#"{"name": "Env", "payload": [{"asset_path": "./env.stage"}]}"#,
        )
        .unwrap();
        assert_eq!(prim.payloads().len(), 1);
        assert_eq!(prim.payloads()[0].asset_path, "./env.stage");
    }

    #[test]
    fn payload_both_spellings_rejected() {
        let doc = r#"{
            "name": "Env",
            "payload": [{"asset_path": "./a.stage"}],
            "payloads": [{"asset_path": "./b.stage"}]
        }"#;
        assert!(serde_json::from_str::<Prim>(doc).is_err());
    }

    #[test]
    fn arc_rewrite_preserves_qualifiers() {
        let arc = CompositionArc {
            asset_path: "./chair.stage".into(),
            target_prim: Some("/Chair".into()),
            layer_offset: Some(LayerOffset {
                offset: 10.0,
                scale: 2.0,
            }),
        };
        let rewritten = arc.with_asset_path("usd/chair.stage");
        assert_eq!(rewritten.asset_path, "usd/chair.stage");
        assert_eq!(rewritten.target_prim.as_deref(), Some("/Chair"));
        assert_eq!(rewritten.layer_offset, arc.layer_offset);
    }
}
