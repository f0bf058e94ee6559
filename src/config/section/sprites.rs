//! `[sprites]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [sprites]
//! padding = 4
//! class_prefix = "icon-"
//! css_template = "templates/sprite.scss"      # optional
//! svg_css_template = "templates/sprite-svg.scss"  # optional
//! ```
//!
//! Without templates the built-in ones are used. A configured template that
//! does not exist fails the sprite task when it runs.

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::utils::path::normalize_path;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Sprite generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpritesConfig {
    /// Space between packed icons, in pixels.
    pub padding: u32,

    /// Prefix for generated class names.
    pub class_prefix: String,

    /// Rule template for the raster sprite stylesheet.
    pub css_template: Option<PathBuf>,

    /// Rule template for the vector sprite stylesheet.
    pub svg_css_template: Option<PathBuf>,
}

impl Default for SpritesConfig {
    fn default() -> Self {
        Self {
            padding: 4,
            class_prefix: "icon-".into(),
            css_template: None,
            svg_css_template: None,
        }
    }
}

impl SpritesConfig {
    pub fn normalize(&mut self, root: &Path) {
        for template in [&mut self.css_template, &mut self.svg_css_template] {
            if let Some(path) = template.take() {
                *template = Some(normalize_path(&root.join(path)));
            }
        }
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.class_prefix.contains(char::is_whitespace) {
            diag.error(
                FieldPath::new("sprites.class_prefix"),
                "class prefix must not contain whitespace",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_sprites_defaults() {
        let sprites = test_parse_config("").sprites;
        assert_eq!(sprites.padding, 4);
        assert!(sprites.css_template.is_none());
    }

    #[test]
    fn test_sprites_template_normalized() {
        let mut sprites = test_parse_config("[sprites]\ncss_template = \"tpl/sprite.scss\"").sprites;
        sprites.normalize(Path::new("/project"));
        assert_eq!(
            sprites.css_template,
            Some(PathBuf::from("/project/tpl/sprite.scss"))
        );
    }
}
