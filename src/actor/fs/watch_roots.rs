use std::path::PathBuf;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;

use crate::config::PathsConfig;
use crate::core::Category;

/// Watch-root consistency manager.
///
/// Responsibility:
/// - Attach existing roots at startup
/// - Re-attach roots that were removed and recreated
pub(super) struct WatchRoots {
    desired: Vec<(PathBuf, RecursiveMode)>,
    attached: FxHashSet<PathBuf>,
}

impl WatchRoots {
    /// Source root for markup, every category root recursively.
    pub(super) fn for_paths(paths: &PathsConfig) -> Self {
        let source_mode = if paths.markup.contains('/') {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };

        let mut desired = vec![(paths.source.clone(), source_mode)];
        for dir in Category::ALL
            .into_iter()
            .filter_map(|category| paths.category_dir(category))
        {
            desired.push((dir.to_path_buf(), RecursiveMode::Recursive));
        }
        Self::new(desired)
    }

    pub(super) fn new(desired: Vec<(PathBuf, RecursiveMode)>) -> Self {
        Self {
            desired,
            attached: FxHashSet::default(),
        }
    }

    pub(super) fn attach_existing(
        &mut self,
        watcher: &mut RecommendedWatcher,
    ) -> notify::Result<()> {
        for (path, mode) in &self.desired {
            if !path.exists() {
                continue;
            }
            watcher.watch(path, *mode)?;
            self.attached.insert(path.clone());
        }

        Ok(())
    }

    pub(super) fn maintain(&mut self, watcher: &mut RecommendedWatcher) {
        // Drop stale handles for roots that no longer exist.
        self.attached.retain(|path| path.exists());

        for (path, mode) in &self.desired {
            if self.attached.contains(path) || !path.exists() {
                continue;
            }

            if watcher.watch(path, *mode).is_ok() {
                self.attached.insert(path.clone());
                crate::debug!("watch"; "re-attached watch: {}", path.display());
            }
        }
    }

    #[cfg(test)]
    pub(super) fn desired(&self) -> impl Iterator<Item = &PathBuf> {
        self.desired.iter().map(|(path, _)| path)
    }
}
