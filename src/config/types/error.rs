//! Configuration error types.

use super::FieldPath;
use owo_colors::OwoColorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Why `assetflow.toml` could not be turned into a [`PipelineConfig`].
///
/// [`PipelineConfig`]: crate::config::PipelineConfig
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read `{}`", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("invalid TOML")]
    Toml(#[from] toml::de::Error),

    // no #[from]: the diagnostics already print everything, a source would repeat it
    #[error("{0}")]
    Diagnostics(ConfigDiagnostics),
}

/// One rejected field.
#[derive(Debug, Clone)]
struct Problem {
    field: FieldPath,
    message: String,
    hint: Option<String>,
}

/// Validation problems collected across every section before failing.
///
/// ```text
/// config validation failed (2 problems)
///   `paths.generated` resolves to the source root
///     hint: point it at a dedicated subdirectory such as `assets/generated`
///   `images.jpeg_quality` must be between 1 and 100
/// ```
#[derive(Debug, Default)]
pub struct ConfigDiagnostics {
    problems: Vec<Problem>,
}

impl ConfigDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, field: FieldPath, message: impl Into<String>) {
        self.push(field, message.into(), None);
    }

    pub fn error_with_hint(
        &mut self,
        field: FieldPath,
        message: impl Into<String>,
        hint: impl Into<String>,
    ) {
        self.push(field, message.into(), Some(hint.into()));
    }

    fn push(&mut self, field: FieldPath, message: String, hint: Option<String>) {
        self.problems.push(Problem {
            field,
            message,
            hint,
        });
    }

    /// `Err(self)` when anything was rejected.
    pub fn into_result(self) -> Result<(), Self> {
        if self.problems.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

#[cfg(test)]
impl ConfigDiagnostics {
    pub fn has_errors(&self) -> bool {
        !self.problems.is_empty()
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    /// Rejected field paths, in insertion order.
    pub fn fields(&self) -> Vec<&'static str> {
        self.problems.iter().map(|p| p.field.as_str()).collect()
    }
}

impl fmt::Display for ConfigDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.problems.len();
        let noun = if count == 1 { "problem" } else { "problems" };
        write!(
            f,
            "{} ({count} {noun})",
            "config validation failed".red().bold()
        )?;
        for problem in &self.problems {
            write!(f, "\n  {} {}", problem.field, problem.message)?;
            if let Some(hint) = &problem.hint {
                write!(f, "\n    {} {hint}", "hint:".yellow())?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ConfigDiagnostics {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_io_error_names_file() {
        let err = ConfigError::Io(
            PathBuf::from("assetflow.toml"),
            Error::new(ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "cannot read `assetflow.toml`");
    }

    #[test]
    fn test_diagnostics_collects_all_errors() {
        let mut diag = ConfigDiagnostics::new();
        assert!(!diag.has_errors());

        diag.error(FieldPath::new("paths.output"), "overlaps the source root");
        diag.error_with_hint(
            FieldPath::new("styles.browsers"),
            "unknown browser query",
            "use browserslist syntax such as `> 1%`",
        );

        assert_eq!(diag.len(), 2);
        assert_eq!(diag.fields(), ["paths.output", "styles.browsers"]);
        let display = diag.to_string();
        assert!(display.contains("2 problems"));
        assert!(display.contains("overlaps the source root"));
        assert!(display.contains("hint:"));
        assert!(diag.into_result().is_err());
    }

    #[test]
    fn test_empty_diagnostics_is_ok() {
        assert!(ConfigDiagnostics::new().into_result().is_ok());
    }
}
