//! `[styles]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [styles]
//! pattern = "*.{sass,scss,css}"
//! compiler = ["sass", "--no-source-map", "--style=expanded"]
//! browsers = ["last 8 versions"]
//! ```
//!
//! `.css` entries skip the compiler. Files starting with `_` are partials and
//! never compiled on their own.

use crate::config::{ConfigDiagnostics, FieldPath};
use lightningcss::targets::Browsers;
use serde::{Deserialize, Serialize};

/// Stylesheet pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StylesConfig {
    /// Entry glob, relative to the styles directory.
    pub pattern: String,

    /// Sass compiler command. `--stdin` and one `--load-path` flag per include
    /// directory are appended; the entry contents are piped to stdin.
    pub compiler: Vec<String>,

    /// Browserslist queries used for prefixing.
    pub browsers: Vec<String>,
}

impl Default for StylesConfig {
    fn default() -> Self {
        Self {
            pattern: "*.{sass,scss,css}".into(),
            compiler: vec![
                "sass".into(),
                "--no-source-map".into(),
                "--style=expanded".into(),
            ],
            browsers: vec!["last 8 versions".into()],
        }
    }
}

impl StylesConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.compiler.is_empty() {
            diag.error(FieldPath::new("styles.compiler"), "compiler command is empty");
        }
        if let Err(e) = Browsers::from_browserslist(&self.browsers) {
            diag.error_with_hint(
                FieldPath::new("styles.browsers"),
                format!("invalid browserslist query: {e}"),
                "e.g. `last 8 versions` or `> 0.5%, not dead`",
            );
        }
    }
}
