//! `[scripts]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [scripts]
//! pattern = "*.js"
//! include_paths = ["node_modules", "src/assets/js/components"]
//! ```
//!
//! Include paths are searched for `//= include` and `//= require` targets
//! after the including file's own directory.

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::utils::path::normalize_path;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Script pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptsConfig {
    /// Entry glob, relative to the scripts directory.
    pub pattern: String,

    /// Include search paths, relative to the project root.
    pub include_paths: Vec<PathBuf>,
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            pattern: "*.js".into(),
            include_paths: vec!["node_modules".into(), "src/assets/js/components".into()],
        }
    }
}

impl ScriptsConfig {
    pub fn normalize(&mut self, root: &Path) {
        self.include_paths = self
            .include_paths
            .iter()
            .map(|p| normalize_path(&root.join(p)))
            .collect();
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.pattern.trim().is_empty() {
            diag.error(FieldPath::new("scripts.pattern"), "pattern is empty");
        }
    }
}
