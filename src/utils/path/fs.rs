//! Path normalization utilities.
//!
//! - `normalize_path` - file system paths (canonicalize + fallback)
//! - `display_relative` - forward-slash path relative to a base, for logs and URLs

use std::path::{Component, Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to lexical cleanup when the path does not exist yet:
/// - Joined with the current directory if relative
/// - `.` dropped, `..` applied to the preceding component
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        };
        clean(&absolute)
    })
}

fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

/// `path` relative to `base` with `/` separators.
///
/// Paths outside `base` are returned whole.
pub fn display_relative(path: &Path, base: &Path) -> String {
    let rel = path.strip_prefix(base).unwrap_or(path);
    rel.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_absolute() {
        let normalized = normalize_path(Path::new("/absolute/path/file.txt"));
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_normalize_path_relative() {
        let normalized = normalize_path(Path::new("relative/path/file.txt"));
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_normalize_path_cleans_missing_paths() {
        let normalized = normalize_path(Path::new("/no/such/./dir/../file.txt"));
        assert_eq!(normalized, PathBuf::from("/no/such/file.txt"));
    }

    #[test]
    fn test_display_relative() {
        let base = Path::new("/project/dist");
        assert_eq!(
            display_relative(Path::new("/project/dist/assets/css/main.min.css"), base),
            "assets/css/main.min.css"
        );
        assert_eq!(display_relative(Path::new("/elsewhere/a.css"), base), "/elsewhere/a.css");
    }
}
