//! Deferred output writing.
//!
//! Tasks stage every result in memory and write only once all inputs have
//! been transformed, so a failing run leaves the previous output untouched.

use super::TransformError;
use std::fs;
use std::path::PathBuf;

/// Files staged for writing.
#[derive(Debug, Default)]
pub struct Outputs {
    files: Vec<(PathBuf, Vec<u8>)>,
}

impl Outputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: PathBuf, contents: impl Into<Vec<u8>>) {
        self.files.push((path, contents.into()));
    }

    /// Write every staged file, creating parent directories.
    pub fn write(self) -> Result<usize, TransformError> {
        let count = self.files.len();
        for (path, contents) in self.files {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|e| TransformError::io(parent, e))?;
            }
            fs::write(&path, contents).map_err(|e| TransformError::io(&path, e))?;
        }
        Ok(count)
    }
}
