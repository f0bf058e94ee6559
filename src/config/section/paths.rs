//! `[paths]` section configuration.
//!
//! Fixed source/output convention of the project. Category directories are
//! relative to `source`; `output` and `cache` are relative to the project root.
//!
//! # Example
//!
//! ```toml
//! [paths]
//! source = "src"
//! output = "dist"
//! markup = "*.{htm,html,php}"
//! styles = "assets/sass"
//! scripts = "assets/js"
//! images = "assets/img"
//! fonts = "assets/fonts"
//! generated = "assets/generated"
//! cache = ".assetflow/cache"
//! ```
//!
//! `generated` is the intermediate artifact directory: sprite tasks write
//! there, the style compiler reads it as a load path, and the image task
//! copies image files from it into the output tree.

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::core::Category;
use crate::utils::glob::GlobSet;
use crate::utils::path::normalize_path;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// Output subdirectory for compiled stylesheets.
pub const CSS_OUTPUT: &str = "assets/css";
/// Output subdirectory for scripts.
pub const JS_OUTPUT: &str = "assets/js";
/// Output subdirectory for images.
pub const IMG_OUTPUT: &str = "assets/img";
/// Output subdirectory for fonts.
pub const FONTS_OUTPUT: &str = "assets/fonts";

/// Sprite input subdirectories reserved under the images directory.
pub const RASTER_SPRITE_DIR: &str = "png";
pub const VECTOR_SPRITE_DIR: &str = "svg";

/// Source and output layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Source root.
    pub source: PathBuf,
    /// Output root, disjoint from `source`.
    pub output: PathBuf,
    /// Markup glob, relative to `source`.
    pub markup: String,
    pub styles: PathBuf,
    pub scripts: PathBuf,
    pub images: PathBuf,
    pub fonts: PathBuf,
    /// Intermediate artifacts written by sprite tasks.
    pub generated: PathBuf,
    /// Persistent transform cache.
    pub cache: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source: "src".into(),
            output: "dist".into(),
            markup: "*.{htm,html,php}".into(),
            styles: "assets/sass".into(),
            scripts: "assets/js".into(),
            images: "assets/img".into(),
            fonts: "assets/fonts".into(),
            generated: "assets/generated".into(),
            cache: ".assetflow/cache".into(),
        }
    }
}

impl PathsConfig {
    /// Resolve every directory to an absolute path.
    pub fn normalize(&mut self, root: &Path) {
        self.source = normalize_path(&root.join(&self.source));
        self.output = normalize_path(&root.join(&self.output));
        self.cache = normalize_path(&root.join(&self.cache));

        let source = self.source.clone();
        for dir in [
            &mut self.styles,
            &mut self.scripts,
            &mut self.images,
            &mut self.fonts,
            &mut self.generated,
        ] {
            *dir = normalize_path(&source.join(&*dir));
        }
    }

    /// Category directories must stay under the source root.
    pub fn validate_relative(&self, diag: &mut ConfigDiagnostics) {
        let categories = [
            ("paths.styles", &self.styles),
            ("paths.scripts", &self.scripts),
            ("paths.images", &self.images),
            ("paths.fonts", &self.fonts),
            ("paths.generated", &self.generated),
        ];
        for (field, dir) in categories {
            if !is_plain_relative(dir) {
                diag.error_with_hint(
                    FieldPath::new(field),
                    format!("`{}` must resolve under the source root", dir.display()),
                    "use a relative path without `..`",
                );
            }
        }
        if !is_plain_relative(Path::new(&self.markup)) {
            diag.error(
                FieldPath::new("paths.markup"),
                "markup glob must be relative to the source root",
            );
        }
    }

    /// Validate the normalized layout against the project `root`.
    ///
    /// Clean deletes `output`, `generated` and `cache` recursively, so none of
    /// them may contain sources or the project itself.
    pub fn validate(&self, root: &Path, diag: &mut ConfigDiagnostics) {
        if overlaps(&self.output, &self.source) {
            diag.error_with_hint(
                FieldPath::new("paths.output"),
                format!(
                    "output `{}` overlaps source `{}`",
                    self.output.display(),
                    self.source.display()
                ),
                "keep the output root outside the source root",
            );
        }

        let swallowed = std::iter::once(self.source.as_path())
            .chain(Category::ALL.into_iter().filter_map(|c| self.category_dir(c)))
            .find(|dir| dir.starts_with(&self.generated));
        if let Some(dir) = swallowed {
            diag.error_with_hint(
                FieldPath::new("paths.generated"),
                format!(
                    "generated `{}` contains `{}`, which Clean would delete",
                    self.generated.display(),
                    dir.display()
                ),
                "point it at a dedicated directory such as `assets/generated`",
            );
        }

        let clashes = [
            ("source", self.source.as_path()),
            ("output", self.output.as_path()),
        ]
        .into_iter()
        .find(|(_, dir)| overlaps(&self.cache, dir));
        if let Some((name, dir)) = clashes {
            diag.error_with_hint(
                FieldPath::new("paths.cache"),
                format!(
                    "cache `{}` overlaps {name} `{}`",
                    self.cache.display(),
                    dir.display()
                ),
                "keep the cache in its own directory such as `.assetflow/cache`",
            );
        } else if root.starts_with(&self.cache) {
            diag.error_with_hint(
                FieldPath::new("paths.cache"),
                format!("cache `{}` contains the project root", self.cache.display()),
                "keep the cache in its own directory such as `.assetflow/cache`",
            );
        }
    }

    /// Directory of a category. Markup is a glob over `source` instead.
    pub fn category_dir(&self, category: Category) -> Option<&Path> {
        match category {
            Category::Markup => None,
            Category::Styles => Some(&self.styles),
            Category::Scripts => Some(&self.scripts),
            Category::Images => Some(&self.images),
            Category::Fonts => Some(&self.fonts),
        }
    }

    /// Markup glob compiled against `source`.
    pub fn markup_glob(&self) -> Result<GlobSet, glob::PatternError> {
        GlobSet::new(&self.markup)
    }

    pub fn css_output(&self) -> PathBuf {
        self.output.join(CSS_OUTPUT)
    }

    pub fn js_output(&self) -> PathBuf {
        self.output.join(JS_OUTPUT)
    }

    pub fn img_output(&self) -> PathBuf {
        self.output.join(IMG_OUTPUT)
    }

    pub fn fonts_output(&self) -> PathBuf {
        self.output.join(FONTS_OUTPUT)
    }

    /// Raster sprite inputs (`<images>/png`).
    pub fn raster_sprite_dir(&self) -> PathBuf {
        self.images.join(RASTER_SPRITE_DIR)
    }

    /// Vector sprite inputs (`<images>/svg`).
    pub fn vector_sprite_dir(&self) -> PathBuf {
        self.images.join(VECTOR_SPRITE_DIR)
    }
}

/// One path equals or contains the other.
fn overlaps(a: &Path, b: &Path) -> bool {
    a.starts_with(b) || b.starts_with(a)
}

fn is_plain_relative(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
