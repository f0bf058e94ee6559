//! `//= include` / `//= require` directive expansion for scripts.
//!
//! ```js
//! //= include menu.js        // inlined every time
//! //= require vendor/lib     // inlined once per entry, `.js` implied
//! ```
//!
//! Targets are looked up in the including file's directory first, then in
//! each include path. A target that cannot be found fails the entry.

use crate::utils::path::normalize_path;
use regex::Regex;
use rustc_hash::FxHashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*//=\s*(include|require)\s+["']?([^"'\s]+)["']?\s*$"#)
        .expect("valid include directive regex")
});

/// Expand every directive in `source`, the contents of `entry`.
pub fn expand_includes(
    entry: &Path,
    source: &str,
    include_paths: &[PathBuf],
) -> Result<String, String> {
    let entry = normalize_path(entry);
    let mut expander = Expander {
        include_paths,
        stack: vec![entry.clone()],
        seen: FxHashSet::from_iter([entry.clone()]),
    };
    expander.expand(&entry, source)
}

struct Expander<'a> {
    include_paths: &'a [PathBuf],
    /// Files currently being expanded, for cycle detection.
    stack: Vec<PathBuf>,
    /// Every file inlined so far, for `require`.
    seen: FxHashSet<PathBuf>,
}

impl Expander<'_> {
    fn expand(&mut self, file: &Path, source: &str) -> Result<String, String> {
        let mut out = String::with_capacity(source.len());

        for line in source.split_inclusive('\n') {
            let Some(caps) = DIRECTIVE.captures(line.trim_end()) else {
                out.push_str(line);
                continue;
            };
            let (kind, target) = (&caps[1], &caps[2]);

            let resolved = self.resolve(file, target).ok_or_else(|| {
                format!("cannot find `{target}` (included from {})", file_label(file))
            })?;

            if kind == "require" && self.seen.contains(&resolved) {
                continue;
            }
            if self.stack.contains(&resolved) {
                let label = file_label(file);
                return Err(format!("circular include of `{target}` in {label}"));
            }

            let content = fs::read_to_string(&resolved)
                .map_err(|e| format!("{}: {e}", resolved.display()))?;

            self.seen.insert(resolved.clone());
            self.stack.push(resolved.clone());
            let expanded = self.expand(&resolved, &content)?;
            self.stack.pop();

            out.push_str(&expanded);
            if !expanded.ends_with('\n') {
                out.push('\n');
            }
        }

        Ok(out)
    }

    fn resolve(&self, file: &Path, target: &str) -> Option<PathBuf> {
        let mut names = vec![target.to_string()];
        if Path::new(target).extension().is_none() {
            names.push(format!("{target}.js"));
        }

        let dirs = file.parent().into_iter();
        dirs.chain(self.include_paths.iter().map(PathBuf::as_path))
            .flat_map(|dir| names.iter().map(move |name| dir.join(name)))
            .find(|candidate| candidate.is_file())
            .map(|found| normalize_path(&found))
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}
