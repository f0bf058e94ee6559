//! Sprite generation tasks.
//!
//! Both variants read icons from a reserved directory under the images root
//! and write two files into the generated-artifact directory:
//!
//! | Task         | Inputs           | Outputs                        |
//! |--------------|------------------|--------------------------------|
//! | `sprite`     | `img/png/*.png`  | `sprite.png`, `_sprite.scss`   |
//! | `svg-sprite` | `img/svg/*.svg`  | `sprite.svg`, `_sprite-svg.scss` |
//!
//! The stylesheet fragment is imported by the style task through its load
//! path; the image is copied into the output tree by the images task.

mod pack;
mod raster;
mod vector;

pub(super) use raster::run as run_raster;
pub(super) use vector::run as run_vector;

use super::{Outputs, TransformError};
use crate::embed::{Template, TemplateSource, TemplateVars};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// `assets/img` relative to `assets/css`.
const IMAGE_URL_BASE: &str = "../img";

/// Files a sprite task produces in the generated directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteOutputs {
    pub image: PathBuf,
    pub stylesheet: PathBuf,
}

impl SpriteOutputs {
    fn new(generated: &Path, image: &str, stylesheet: &str) -> Self {
        Self {
            image: generated.join(image),
            stylesheet: generated.join(stylesheet),
        }
    }

    /// Sprite URL as seen from a compiled stylesheet in `assets/css`.
    fn image_url(&self) -> String {
        let file = self
            .image
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!("{IMAGE_URL_BASE}/{file}")
    }

    /// Stage both files and write them together.
    fn write(&self, image: Vec<u8>, stylesheet: String) -> Result<usize, TransformError> {
        let mut outputs = Outputs::new();
        outputs.push(self.image.clone(), image);
        outputs.push(self.stylesheet.clone(), stylesheet);
        outputs.write()
    }
}

/// Load the configured rule template, or fall back to the built-in one.
fn rule_template<V>(
    custom: Option<&Path>,
    builtin: Template<V>,
) -> Result<TemplateSource<V>, TransformError> {
    let Some(path) = custom else {
        return Ok(TemplateSource::Builtin(builtin));
    };
    match fs::read_to_string(path) {
        Ok(content) => Ok(TemplateSource::Custom(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(TransformError::config(format!(
            "sprite template `{}` does not exist",
            path.display()
        ))),
        Err(e) => Err(TransformError::io(path, e)),
    }
}

/// Render one rule per icon, separated by blank lines.
fn render_rules<V: TemplateVars>(template: &TemplateSource<V>, rules: &[V]) -> String {
    rules
        .iter()
        .map(|vars| template.render(vars).trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n\n")
        + "\n"
}

/// Icon name from its file stem.
fn icon_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::sprite::{RASTER_RULE, RasterRuleVars};
    use tempfile::TempDir;

    #[test]
    fn test_image_url() {
        let outputs = SpriteOutputs::new(Path::new("/p/gen"), "sprite.png", "_sprite.scss");
        assert_eq!(outputs.image_url(), "../img/sprite.png");
        assert_eq!(outputs.stylesheet, PathBuf::from("/p/gen/_sprite.scss"));
    }

    #[test]
    fn test_missing_template_is_config_error() {
        let err = rule_template(Some(Path::new("/nonexistent/sprite.scss")), RASTER_RULE)
            .unwrap_err();
        assert_eq!(err.transform, "config");
        assert!(err.message.contains("/nonexistent/sprite.scss"));
    }

    #[test]
    fn test_custom_template_loaded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rule.scss");
        fs::write(&path, "%__NAME__ { left: __X__px }").unwrap();

        let template = rule_template(Some(&path), RASTER_RULE).unwrap();
        let vars = RasterRuleVars {
            name: "icon-a".into(),
            x: 3,
            y: 0,
            width: 1,
            height: 1,
            image: String::new(),
            total_width: 1,
            total_height: 1,
        };
        assert_eq!(render_rules(&template, &[vars]), "%icon-a { left: 3px }\n");
    }
}
