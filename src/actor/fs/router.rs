//! Changed path → tasks to rerun.

use std::collections::BTreeSet;
use std::path::Path;

use crate::config::PipelineConfig;
use crate::core::{Category, TaskName};
use crate::utils::glob::GlobSet;

/// Tasks affected by a change to `path`.
///
/// Sprite inputs rerun their generator plus both consumers of the generated
/// directory. Changes inside the generated directory itself are ignored:
/// they are produced by the generators and would otherwise rebuild twice.
pub(super) fn route(path: &Path, config: &PipelineConfig, markup: &GlobSet) -> &'static [TaskName] {
    let paths = &config.paths;
    let category = Category::ALL.into_iter().find(|&category| {
        paths
            .category_dir(category)
            .is_some_and(|dir| path.starts_with(dir))
    });

    if path.starts_with(&paths.generated) {
        &[]
    } else if path.starts_with(paths.raster_sprite_dir()) {
        &[TaskName::Sprite, TaskName::Styles, TaskName::Images]
    } else if path.starts_with(paths.vector_sprite_dir()) {
        &[TaskName::SvgSprite, TaskName::Styles, TaskName::Images]
    } else if let Some(category) = category {
        category.tasks()
    } else if path
        .strip_prefix(&paths.source)
        .is_ok_and(|relative| markup.matches(relative))
    {
        &[TaskName::Markup]
    } else {
        &[]
    }
}

/// Route a batch of changed paths, one entry per task.
///
/// `TaskName` ordering puts the generators first.
pub(super) fn route_all<'a>(
    paths: impl IntoIterator<Item = &'a Path>,
    config: &PipelineConfig,
    markup: &GlobSet,
) -> Vec<TaskName> {
    let mut tasks = BTreeSet::new();
    for path in paths {
        let routed = route(path, config, markup);
        if routed.is_empty() {
            crate::debug!("watch"; "ignored: {}", path.display());
        }
        tasks.extend(routed.iter().copied());
    }
    tasks.into_iter().collect()
}
