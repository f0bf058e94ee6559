//! Clean task.
//!
//! Removes, in order: the output root, the generated-artifact directory,
//! stylesheets generated next to fonts, and the transform cache. Missing
//! paths are skipped so repeated runs succeed.

use super::TransformError;
use crate::cache::TransformCache;
use crate::config::PipelineConfig;
use crate::log;
use crate::utils::glob::GlobSet;
use crate::utils::path::display_relative;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Stylesheets written by `fontgen`, relative to the fonts directory.
const FONT_STYLESHEETS: &str = "**/*.css";

/// Delete every generated path, returning what was removed.
pub fn clean(
    config: &PipelineConfig,
    cache: &TransformCache,
) -> Result<Vec<PathBuf>, TransformError> {
    let paths = &config.paths;
    let mut deleted = Vec::new();

    for dir in [&paths.output, &paths.generated] {
        if remove(dir)? {
            deleted.push(dir.clone());
        }
    }

    let stylesheets = GlobSet::new(FONT_STYLESHEETS)
        .map_err(|e| TransformError::config(e.to_string()))?
        .select(&paths.fonts);
    for css in stylesheets {
        if remove(&css)? {
            deleted.push(css);
        }
    }

    let cache_dir = cache.dir().unwrap_or(paths.cache.as_path());
    let cache_existed = cache_dir.exists();
    cache.clear().map_err(|e| TransformError::io(cache_dir, e))?;
    if remove(&paths.cache)? || cache_existed {
        deleted.push(paths.cache.clone());
    }

    if !deleted.is_empty() {
        let root = config.get_root();
        let listing: Vec<_> = deleted.iter().map(|p| display_relative(p, root)).collect();
        log!("clean"; "Deleted files and folders:\n{}", listing.join("\n"));
    }
    Ok(deleted)
}

/// Remove a file or directory tree. `Ok(false)` when it did not exist.
fn remove(path: &Path) -> Result<bool, TransformError> {
    let result = match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => Err(e),
    };
    match result {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(TransformError::io(path, e)),
    }
}
