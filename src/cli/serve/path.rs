//! URL to filesystem path resolution.

use std::path::{Path, PathBuf};

/// Resolve URL to filesystem path, handling index.html for directories
pub fn resolve_path(url: &str, serve_root: &Path) -> Option<PathBuf> {
    let clean = normalize_url(url);

    // Reject paths with suspicious patterns early
    if clean.contains("..") {
        return None;
    }

    let local = serve_root.join(&clean);

    // Canonicalize to resolve symlinks and verify path is under serve_root
    // This prevents traversal via symlinks or encoded sequences
    let canonical = local.canonicalize().ok()?;
    let root_canonical = serve_root.canonicalize().ok()?;

    if !canonical.starts_with(&root_canonical) {
        // Path escapes serve_root - reject
        return None;
    }

    if canonical.is_file() {
        return Some(canonical);
    }

    if canonical.is_dir() {
        let index = canonical.join("index.html");
        if index.is_file() {
            return Some(index);
        }
    }

    None
}

/// Normalize URL: decode, strip query string, trim slashes
fn normalize_url(url: &str) -> String {
    use percent_encoding::percent_decode_str;
    let decoded = percent_decode_str(url)
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();

    let path = decoded.split('?').next().unwrap_or(&decoded);
    path.trim_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn site() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("dist/assets/css")).unwrap();
        fs::write(dir.path().join("dist/index.html"), "<p>").unwrap();
        fs::write(dir.path().join("dist/assets/css/main.min.css"), "a{}").unwrap();
        fs::write(dir.path().join("secret.txt"), "x").unwrap();
        dir
    }

    #[test]
    fn test_directory_falls_back_to_index() {
        let dir = site();
        let root = dir.path().join("dist");
        let index = resolve_path("/", &root).unwrap();
        assert!(index.ends_with("index.html"));
        assert_eq!(resolve_path("/index.html?v=2", &root), Some(index));
    }

    #[test]
    fn test_resolves_nested_file() {
        let dir = site();
        let root = dir.path().join("dist");
        let css = resolve_path("/assets/css/main.min.css", &root).unwrap();
        assert!(css.ends_with("main.min.css"));
        assert!(resolve_path("/assets/css/", &root).is_none());
        assert!(resolve_path("/missing.html", &root).is_none());
    }

    #[test]
    fn test_rejects_traversal() {
        let dir = site();
        let root = dir.path().join("dist");
        assert!(resolve_path("/../secret.txt", &root).is_none());
        assert!(resolve_path("/%2e%2e/secret.txt", &root).is_none());
    }
}
