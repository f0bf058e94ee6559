//! `[images]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [images]
//! pattern = "**/*.*"
//! jpeg_quality = 70
//! cache = true
//! ```
//!
//! The sprite input directories (`png/`, `svg/`) are never copied as-is.

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};

/// Image optimization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    /// Glob, relative to the images directory.
    pub pattern: String,

    /// JPEG re-encode quality (1-100).
    pub jpeg_quality: u8,

    /// Reuse optimized output for unchanged inputs.
    pub cache: bool,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            pattern: "**/*.*".into(),
            jpeg_quality: 70,
            cache: true,
        }
    }
}

impl ImagesConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if !(1..=100).contains(&self.jpeg_quality) {
            diag.error(
                FieldPath::new("images.jpeg_quality"),
                format!("must be between 1 and 100, got {}", self.jpeg_quality),
            );
        }
    }
}
