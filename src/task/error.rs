//! Task failure type.

use std::io;
use std::path::Path;
use thiserror::Error;

/// A failed transform step, named after the step that produced it.
///
/// Displayed to users as `Error in <transform>` followed by the message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Error in {transform}: {message}")]
pub struct TransformError {
    /// Step name (`sass`, `prefix`, `include`, `fs`, `config`, ...)
    pub transform: String,
    pub message: String,
}

impl TransformError {
    pub fn new(transform: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            transform: transform.into(),
            message: message.into(),
        }
    }

    /// Filesystem failure with path context.
    pub fn io(path: &Path, err: io::Error) -> Self {
        Self::new("fs", format!("{}: {err}", path.display()))
    }

    /// Invalid configuration detected when the task is invoked.
    pub fn config(message: impl Into<String>) -> Self {
        Self::new("config", message)
    }

    /// Headline shown in logs and the browser overlay.
    pub fn title(&self) -> String {
        format!("Error in {}", self.transform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = TransformError::new("sass", "main.sass: expected \"{\"");
        assert_eq!(err.title(), "Error in sass");
        assert_eq!(err.to_string(), "Error in sass: main.sass: expected \"{\"");
    }

    #[test]
    fn test_io_context() {
        let err = TransformError::io(
            Path::new("/dist/a.css"),
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.transform, "fs");
        assert!(err.message.starts_with("/dist/a.css"));
    }
}
