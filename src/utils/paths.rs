//! Path utilities: normalization, existence checks, anonymous markers.

use std::path::{Component, Path, PathBuf};

/// Prefix reserved for anonymous/in-memory layer identifiers.
pub const ANON_MARKER: &str = "anon:";

/// True when the string names an anonymous/in-memory layer.
pub fn is_anonymous(path_str: &str) -> bool {
    path_str.starts_with(ANON_MARKER)
}

/// Existence check that treats empty strings and anonymous markers as
/// non-existent without raising.
pub fn path_exists(path_str: &str) -> bool {
    if path_str.is_empty() || is_anonymous(path_str) {
        return false;
    }
    Path::new(path_str).exists()
}

/// Normalize path separators to forward slashes (for package-relative paths).
pub fn to_posix<P: AsRef<Path>>(path: P) -> String {
    path.as_ref().to_string_lossy().replace('\\', "/")
}

/// Normalize a path for stable comparison: canonical where the file exists,
/// lexically collapsed otherwise.
///
/// Missing dependencies and UDIM wildcard patterns must still normalize to a
/// stable absolute string, so canonicalization failure falls back to a
/// lexical `.`/`..` collapse instead of an error.
pub fn normalize<P: AsRef<Path>>(path: P) -> PathBuf {
    let path = path.as_ref();
    match std::fs::canonicalize(path) {
        Ok(p) => p,
        Err(_) => lexical_normalize(path),
    }
}

/// Collapse `.` and `..` components without touching the filesystem.
fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(Component::ParentDir);
                }
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_and_empty_never_exist() {
        assert!(!path_exists(""));
        assert!(!path_exists("anon:scratch"));
    }

    #[test]
    fn lexical_collapse() {
        let p = normalize("/a/b/../c/./d.stage");
        assert_eq!(p, PathBuf::from("/a/c/d.stage"));
    }

    #[test]
    fn posix_separators() {
        assert_eq!(to_posix("usd\\chair.stage"), "usd/chair.stage");
        assert_eq!(to_posix("textures/tex.png"), "textures/tex.png");
    }
}
