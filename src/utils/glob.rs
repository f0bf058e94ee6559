//! Glob selection for category sources.
//!
//! Patterns are matched against paths relative to the category directory.
//! Brace alternation (`*.{htm,html,php}`) is expanded before compiling, since
//! the `glob` crate only understands `*`, `?`, `[...]` and `**`.

use glob::{MatchOptions, Pattern, PatternError};
use jwalk::WalkDir;
use std::path::{Path, PathBuf};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A set of compiled patterns, any of which may match.
#[derive(Debug, Clone)]
pub struct GlobSet {
    patterns: Vec<Pattern>,
}

impl GlobSet {
    /// Compile a pattern, expanding brace alternation first.
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        let patterns = expand_braces(pattern)
            .iter()
            .map(|p| Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Check a path relative to the category directory.
    pub fn matches(&self, relative: &Path) -> bool {
        self.patterns
            .iter()
            .any(|p| p.matches_path_with(relative, MATCH_OPTIONS))
    }

    /// Select matching files under `dir`, sorted for deterministic output.
    ///
    /// A missing directory selects nothing.
    pub fn select(&self, dir: &Path) -> Vec<PathBuf> {
        if !dir.is_dir() {
            return Vec::new();
        }

        let mut files: Vec<PathBuf> = WalkDir::new(dir)
            .sort(true)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(|e| e.path())
            .filter(|path| {
                path.strip_prefix(dir)
                    .is_ok_and(|relative| self.matches(relative))
            })
            .collect();
        files.sort();
        files
    }
}

/// Expand `{a,b}` alternation into every combination.
///
/// Nested groups are supported; unbalanced braces are kept literally.
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let Some(open) = pattern.find('{') else {
        return vec![pattern.to_string()];
    };

    let mut depth = 0usize;
    let mut close = None;
    let mut splits = Vec::new();
    for (offset, ch) in pattern[open..].char_indices() {
        let idx = open + offset;
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(idx);
                    break;
                }
            }
            ',' if depth == 1 => splits.push(idx),
            _ => {}
        }
    }

    let Some(close) = close else {
        return vec![pattern.to_string()];
    };

    let prefix = &pattern[..open];
    let suffix = &pattern[close + 1..];

    let mut bounds = vec![open];
    bounds.extend(&splits);
    bounds.push(close);

    bounds
        .windows(2)
        .flat_map(|w| {
            let alternative = &pattern[w[0] + 1..w[1]];
            expand_braces(&format!("{prefix}{alternative}{suffix}"))
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
