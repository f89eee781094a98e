//! Texture discovery: asset-typed shader inputs and UDIM tile sets.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::report::ValidationResult;
use crate::scene::Stage;
use crate::utils::paths;

/// The three template spellings the UDIM convention is authored with.
const UDIM_TOKENS: [&str; 3] = ["<UDIM>", "%(UDIM)D", "$UDIM"];

/// One asset-typed shader input value.
///
/// Array-valued inputs expand to one hit per element; deduplicated by
/// `(shader_path, input_name, raw_value)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureHit {
    /// Path of the shader prim that authored the value.
    pub shader_path: String,
    /// Base name of the input.
    pub input_name: String,
    /// The raw authored path string.
    pub raw_value: String,
    /// Normalized absolute path, or the resolved UDIM pattern.
    pub resolved_path: String,
}

/// True when the raw value uses any UDIM template spelling, any case.
pub fn is_udim_pattern(raw: &str) -> bool {
    let upper = raw.to_ascii_uppercase();
    // The printf spelling is matched on its token body so the trailing `d`
    // stays case-insensitive too.
    upper.contains("<UDIM>") || upper.contains("%(UDIM)") || upper.contains("$UDIM")
}

/// Replace every UDIM token in `pattern` (any case) with `replacement`.
fn replace_udim_tokens(pattern: &str, replacement: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut rest = pattern;

    'outer: while !rest.is_empty() {
        let upper = rest.to_ascii_uppercase();
        for token in UDIM_TOKENS {
            if upper.starts_with(token) {
                out.push_str(replacement);
                rest = &rest[token.len()..];
                continue 'outer;
            }
        }
        let ch = rest.chars().next().unwrap_or_default();
        out.push(ch);
        rest = &rest[ch.len_utf8()..];
    }

    out
}

/// Files matching the UDIM pattern with its token expanded to a wildcard.
///
/// The wildcard lands in the file name, so a plain directory listing with a
/// prefix/suffix match covers it; a missing containing directory simply
/// yields no tiles.
fn udim_tile_candidates(resolved_pattern: &str) -> Vec<PathBuf> {
    let wildcarded = replace_udim_tokens(resolved_pattern, "*");
    let pattern = Path::new(&wildcarded);

    let Some(parent) = pattern.parent() else {
        return Vec::new();
    };
    let Some(name) = pattern.file_name().and_then(|n| n.to_str()) else {
        return Vec::new();
    };
    let Some((prefix, suffix)) = name.split_once('*') else {
        return Vec::new();
    };

    let Ok(entries) = std::fs::read_dir(parent) else {
        return Vec::new();
    };

    let mut tiles: Vec<PathBuf> = entries
        .filter_map(std::result::Result::ok)
        .filter(|e| {
            e.file_name()
                .to_str()
                .is_some_and(|n| {
                    n.len() >= prefix.len() + suffix.len()
                        && n.starts_with(prefix)
                        && n.ends_with(suffix)
                })
        })
        .map(|e| e.path())
        .collect();

    tiles.sort();
    tiles
}

/// Collect every asset-typed shader input value on the stage.
pub fn find_texture_assets(stage: &Stage) -> Vec<TextureHit> {
    let root_layer = stage.root_layer();
    let mut hits = Vec::new();

    for (prim_path, prim) in stage.traverse() {
        if !prim.is_shader() {
            continue;
        }

        for input in &prim.inputs {
            let Some(value) = input.asset_value() else {
                continue;
            };
            for raw in value.paths() {
                hits.push(TextureHit {
                    shader_path: prim_path.clone(),
                    input_name: input.name.clone(),
                    raw_value: raw.to_string(),
                    resolved_path: root_layer.resolve_asset_path(raw),
                });
            }
        }
    }

    // De-dupe by (shader, input, raw value), first occurrence wins.
    let mut seen = HashSet::new();
    hits.retain(|h| {
        seen.insert((
            h.shader_path.clone(),
            h.input_name.clone(),
            h.raw_value.clone(),
        ))
    });

    hits
}

/// Classify every texture hit into a finding.
///
/// A stage without any asset-typed inputs still produces a single INFO row
/// so the report reflects scan coverage.
pub fn texture_results(stage: &Stage) -> (Vec<ValidationResult>, Vec<TextureHit>) {
    let hits = find_texture_assets(stage);
    let mut results = Vec::new();

    if hits.is_empty() {
        results.push(ValidationResult::info(
            "Textures",
            "No asset-typed texture inputs found.",
            "",
            "",
        ));
        return (results, hits);
    }

    for hit in &hits {
        if is_udim_pattern(&hit.raw_value) {
            let tiles = udim_tile_candidates(&hit.resolved_path);
            if tiles.is_empty() {
                results.push(ValidationResult::error(
                    "Textures",
                    format!(
                        "Missing UDIM texture tiles. {} @ {}",
                        hit.input_name, hit.shader_path
                    ),
                    hit.shader_path.clone(),
                    hit.raw_value.clone(),
                ));
            } else {
                results.push(ValidationResult::info(
                    "Textures",
                    format!(
                        "UDIM texture set found ({} tiles). {} @ {}",
                        tiles.len(),
                        hit.input_name,
                        hit.shader_path
                    ),
                    hit.shader_path.clone(),
                    hit.raw_value.clone(),
                ));
            }
            continue;
        }

        if paths::path_exists(&hit.resolved_path) {
            results.push(ValidationResult::info(
                "Textures",
                format!("Texture found. {} @ {}", hit.input_name, hit.shader_path),
                hit.shader_path.clone(),
                hit.raw_value.clone(),
            ));
        } else {
            results.push(ValidationResult::error(
                "Textures",
                format!(
                    "Missing texture on disk. {} @ {}",
                    hit.input_name, hit.shader_path
                ),
                hit.shader_path.clone(),
                hit.raw_value.clone(),
            ));
        }
    }

    (results, hits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Level;
    use crate::scene::prim::{InputValue, ShaderInput};
    use crate::scene::{Layer, Prim, Stage};

    fn shader_stage(temp: &tempfile::TempDir, inputs: Vec<ShaderInput>) -> Stage {
        let mut layer = Layer::create(temp.path().join("root.stage"));
        let mut shader = Prim::new("Tex");
        shader.type_name = Some("Shader".into());
        shader.inputs = inputs;
        layer.prims_mut().push(shader);
        layer.save().unwrap();
        Stage::open(temp.path().join("root.stage")).unwrap()
    }

    fn asset_input(name: &str, value: &str) -> ShaderInput {
        ShaderInput {
            name: name.into(),
            type_name: "asset".into(),
            value: InputValue::Text(value.into()),
        }
    }

    #[test]
    fn udim_spellings_detected_case_insensitively() {
        for raw in [
            "tex.<UDIM>.png",
            "tex.<udim>.png",
            "tex.%(UDIM)d.png",
            "tex.%(udim)d.png",
            "tex.$UDIM.png",
            "tex.$udim.png",
        ] {
            assert!(is_udim_pattern(raw), "not detected: {raw}");
        }
        assert!(!is_udim_pattern("tex.1001.png"));
    }

    #[test]
    fn udim_token_wildcard_expansion() {
        assert_eq!(
            replace_udim_tokens("/t/tex.<udim>.png", "*"),
            "/t/tex.*.png"
        );
        assert_eq!(
            replace_udim_tokens("/t/tex.%(UDIM)d.png", "*"),
            "/t/tex.*.png"
        );
        assert_eq!(replace_udim_tokens("/t/tex.$UDIM.png", "*"), "/t/tex.*.png");
    }

    #[test]
    fn udim_tiles_counted() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join("tex.1001.png"), b"x").unwrap();
        std::fs::write(temp.path().join("tex.1002.png"), b"x").unwrap();
        let stage = shader_stage(&temp, vec![asset_input("file", "./tex.<UDIM>.png")]);

        let (results, hits) = texture_results(&stage);
        assert_eq!(hits.len(), 1);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].level, Level::Info);
        assert!(results[0].message.contains("2 tiles"));
    }

    #[test]
    fn udim_with_no_tiles_is_an_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let stage = shader_stage(&temp, vec![asset_input("file", "./tex.<UDIM>.png")]);

        let (results, _) = texture_results(&stage);
        assert_eq!(results[0].level, Level::Error);
        assert!(results[0].message.contains("Missing UDIM"));
    }

    #[test]
    fn plain_texture_existence_checked() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join("albedo.png"), b"x").unwrap();
        let stage = shader_stage(
            &temp,
            vec![
                asset_input("albedo", "./albedo.png"),
                asset_input("normal", "./normal.png"),
            ],
        );

        let (results, hits) = texture_results(&stage);
        assert_eq!(hits.len(), 2);
        assert_eq!(results[0].level, Level::Info);
        assert_eq!(results[1].level, Level::Error);
    }

    #[test]
    fn array_inputs_expand_and_dedupe() {
        let temp = tempfile::TempDir::new().unwrap();
        let input = ShaderInput {
            name: "layers".into(),
            type_name: "asset[]".into(),
            value: InputValue::TextList(vec![
                "./a.png".into(),
                "./b.png".into(),
                "./a.png".into(),
            ]),
        };
        let stage = shader_stage(&temp, vec![input]);

        let hits = find_texture_assets(&stage);
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn no_asset_inputs_yields_coverage_row() {
        let temp = tempfile::TempDir::new().unwrap();
        let stage = shader_stage(&temp, Vec::new());

        let (results, hits) = texture_results(&stage);
        assert!(hits.is_empty());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].level, Level::Info);
        assert!(results[0].message.contains("No asset-typed"));
    }

    #[test]
    fn non_shader_prims_are_skipped() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut layer = Layer::create(temp.path().join("root.stage"));
        let mut mesh = Prim::new("Geo");
        mesh.type_name = Some("Mesh".into());
        mesh.inputs.push(asset_input("file", "./tex.png"));
        layer.prims_mut().push(mesh);
        let stage = Stage::from_layer(layer);

        assert!(find_texture_assets(&stage).is_empty());
    }
}
