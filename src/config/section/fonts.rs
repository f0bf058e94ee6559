//! `[fonts]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [fonts]
//! pattern = "**/*.{svg,eot,ttf,woff,woff2}"
//! converter = ["woff2_compress"]
//! ```
//!
//! The converter receives the `.ttf` path as its last argument and must write
//! the `.woff2` next to it.

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};

/// Font settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontsConfig {
    /// Copy glob, relative to the fonts directory.
    pub pattern: String,

    /// TTF to WOFF2 converter command.
    pub converter: Vec<String>,
}

impl Default for FontsConfig {
    fn default() -> Self {
        Self {
            pattern: "**/*.{svg,eot,ttf,woff,woff2}".into(),
            converter: vec!["woff2_compress".into()],
        }
    }
}

impl FontsConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.converter.is_empty() {
            diag.error(FieldPath::new("fonts.converter"), "converter command is empty");
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_fonts_defaults() {
        let fonts = test_parse_config("").fonts;
        assert_eq!(fonts.converter, vec!["woff2_compress"]);
        assert!(fonts.pattern.contains("woff2"));
    }
}
