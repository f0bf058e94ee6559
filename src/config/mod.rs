//! Pipeline configuration management for `assetflow.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── paths      # [paths]
//! │   ├── serve      # [serve]
//! │   ├── styles     # [styles]
//! │   ├── scripts    # [scripts]
//! │   ├── images     # [images]
//! │   ├── sprites    # [sprites]
//! │   └── fonts      # [fonts]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, ConfigDiagnostics
//! │   └── field      # FieldPath
//! └── mod.rs         # PipelineConfig (this file)
//! ```
//!
//! The configuration is built once in `main` and then passed by reference
//! into every task. There is no global handle.

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{
    DEFAULT_WS_PORT, FontsConfig, ImagesConfig, PathsConfig, ScriptsConfig, ServeConfig,
    SpritesConfig, StylesConfig,
};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::{cli::Cli, debug, log, utils::path::normalize_path};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Default config file name, searched upward from the working directory.
pub const CONFIG_FILE: &str = "assetflow.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing assetflow.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Source and output layout
    #[serde(default)]
    pub paths: PathsConfig,

    /// Development server settings
    #[serde(default)]
    pub serve: ServeConfig,

    /// Stylesheet pipeline
    #[serde(default)]
    pub styles: StylesConfig,

    /// Script pipeline
    #[serde(default)]
    pub scripts: ScriptsConfig,

    /// Image optimization
    #[serde(default)]
    pub images: ImagesConfig,

    /// Raster and vector sprites
    #[serde(default)]
    pub sprites: SpritesConfig,

    /// Font conversion and copying
    #[serde(default)]
    pub fonts: FontsConfig,
}

impl PipelineConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd to find the config file. Without a config
    /// file the conventional layout is used, rooted at cwd.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let (mut config, config_path) = match find_config_file(&cli.config) {
            Some(path) => (Self::from_path(&path)?, path),
            None => {
                debug!("config"; "{} not found, using defaults", cli.config.display());
                (Self::default(), cwd.join(&cli.config))
            }
        };

        config.validate_paths()?;

        let root = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or(cwd);
        config.config_path = config_path;
        config.finalize(&root);
        config.apply_cli_options(cli);
        config.validate()?;

        Ok(config)
    }

    /// Build a configuration for a project root.
    ///
    /// Reads `<root>/assetflow.toml` when present, defaults otherwise.
    #[cfg(test)]
    pub fn for_root(root: &Path) -> Result<Self> {
        let config_path = root.join(CONFIG_FILE);
        let mut config = if config_path.exists() {
            Self::from_path(&config_path)?
        } else {
            Self::default()
        };

        config.validate_paths()?;
        config.config_path = config_path;
        config.finalize(root);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Get path relative to the project root, for display.
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }

    /// Apply CLI overrides that live in the config.
    fn apply_cli_options(&mut self, cli: &Cli) {
        if let Some(port) = cli.port() {
            self.serve.port = port;
        }
        if let Some(interface) = cli.interface() {
            self.serve.interface = interface;
        }
    }

    // ========================================================================
    // path normalization
    // ========================================================================

    fn finalize(&mut self, root: &Path) {
        let root = normalize_path(root);
        self.paths.normalize(&root);
        self.scripts.normalize(&root);
        self.sprites.normalize(&root);
        self.config_path = normalize_path(&self.config_path);
        self.root = root;
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Pre-validate paths before normalization.
    ///
    /// Category directories must stay relative to the source root, which
    /// cannot be checked once they are joined into absolute paths.
    fn validate_paths(&self) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();
        self.paths.validate_relative(&mut diag);
        diag.into_result().map_err(ConfigError::Diagnostics)
    }

    /// Validate the finalized configuration.
    ///
    /// Collects all validation errors and returns them at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();

        self.paths.validate(&self.root, &mut diag);
        self.styles.validate(&mut diag);
        self.scripts.validate(&mut diag);
        self.images.validate(&mut diag);
        self.sprites.validate(&mut diag);
        self.fonts.validate(&mut diag);

        diag.into_result().map_err(ConfigError::Diagnostics)
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config and panic on unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> PipelineConfig {
    let (parsed, ignored) = PipelineConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

/// Build a finalized config rooted at `root` with optional TOML overrides.
#[cfg(test)]
pub fn test_config_at(root: &Path, content: &str) -> PipelineConfig {
    fs::write(root.join(CONFIG_FILE), content).unwrap();
    PipelineConfig::for_root(root).unwrap()
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_from_str_invalid_toml() {
        let result = PipelineConfig::parse_with_ignored("[paths\nsource = \"src\"");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[paths]\nsource = \"web\"\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = PipelineConfig::parse_with_ignored(content).unwrap();

        assert_eq!(config.paths.source, PathBuf::from("web"));
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_no_unknown_fields() {
        let (_, ignored) = PipelineConfig::parse_with_ignored("[serve]\nport = 8080").unwrap();
        assert!(ignored.is_empty());
    }

    #[test]
    fn test_for_root_without_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = PipelineConfig::for_root(dir.path()).unwrap();

        let root = normalize_path(dir.path());
        assert_eq!(config.get_root(), root);
        assert_eq!(config.paths.source, root.join("src"));
        assert_eq!(config.paths.output, root.join("dist"));
        assert_eq!(config.paths.styles, root.join("src/assets/sass"));
    }

    #[test]
    fn test_for_root_reads_file() {
        let dir = TempDir::new().unwrap();
        let config = test_config_at(dir.path(), "[paths]\noutput = \"public\"");
        assert_eq!(config.paths.output, normalize_path(dir.path()).join("public"));
    }

    #[test]
    fn test_output_inside_source_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "[paths]\noutput = \"src/dist\"").unwrap();
        let err = PipelineConfig::for_root(dir.path()).unwrap_err();
        assert!(err.to_string().contains("config validation failed"));
    }

    #[test]
    fn test_generated_at_source_root_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "[paths]\ngenerated = \".\"").unwrap();
        let err = PipelineConfig::for_root(dir.path()).unwrap_err();
        assert!(err.to_string().contains("paths.generated"));
    }

    #[test]
    fn test_cache_at_project_root_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "[paths]\ncache = \".\"").unwrap();
        let err = PipelineConfig::for_root(dir.path()).unwrap_err();
        assert!(err.to_string().contains("paths.cache"));
    }

    #[test]
    fn test_root_relative() {
        let dir = TempDir::new().unwrap();
        let config = PipelineConfig::for_root(dir.path()).unwrap();
        let rel = config.root_relative(config.paths.styles.join("main.sass"));
        assert_eq!(rel, PathBuf::from("src/assets/sass/main.sass"));
    }
}
