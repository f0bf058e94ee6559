//! Transform tasks.
//!
//! One task per asset category plus the two sprite generators:
//!
//! | Task         | Reads                      | Writes                        |
//! |--------------|----------------------------|-------------------------------|
//! | `markup`     | `src/*.{htm,html,php}`     | `dist/`                       |
//! | `styles`     | `assets/sass/*.{sass,...}` | `dist/assets/css/*.min.css`   |
//! | `scripts`    | `assets/js/*.js`           | `dist/assets/js/*.min.js`     |
//! | `images`     | `assets/img/**`, generated | `dist/assets/img/`            |
//! | `sprite`     | `assets/img/png/*.png`     | generated `sprite.png` + scss |
//! | `svg-sprite` | `assets/img/svg/*.svg`     | generated `sprite.svg` + scss |
//! | `fontgen`    | `assets/fonts/**/*.ttf`    | `.woff2` + `.css` beside font |
//! | `fonts`      | `assets/fonts/**`          | `dist/assets/fonts/`          |
//!
//! Every task stages its results in memory ([`Outputs`]) and writes only
//! after all inputs succeeded. [`run_isolated`] is the single place where a
//! task failure becomes a report instead of an error.

mod chain;
mod clean;
mod error;
mod fonts;
mod images;
mod include;
mod markup;
mod output;
mod scripts;
mod sprite;
mod styles;

pub use chain::{Asset, Rename, Transform, TransformChain};
pub use clean::clean;
pub use error::TransformError;
pub use output::Outputs;

use crate::cache::TransformCache;
use crate::config::PipelineConfig;
use crate::core::{BuildMode, TaskName};
use crate::debug;
use crate::logger::report_error;
use crate::reload::{HotReloadMessage, ReloadSink};
use crate::utils::glob::GlobSet;
use std::path::{Path, PathBuf};

/// Everything a task needs, borrowed for the duration of one run.
#[derive(Clone, Copy)]
pub struct TaskContext<'a> {
    pub config: &'a PipelineConfig,
    pub mode: BuildMode,
    pub cache: &'a TransformCache,
    /// Live reload channel, attached in develop mode only.
    pub reload: Option<&'a dyn ReloadSink>,
}

impl<'a> TaskContext<'a> {
    pub fn new(config: &'a PipelineConfig, mode: BuildMode, cache: &'a TransformCache) -> Self {
        Self {
            config,
            mode,
            cache,
            reload: None,
        }
    }

    pub fn with_reload(mut self, sink: &'a dyn ReloadSink) -> Self {
        self.reload = Some(sink);
        self
    }

    fn notify(&self, message: HotReloadMessage) {
        if let Some(sink) = self.reload {
            sink.notify(message);
        }
    }

    /// Source files in `dir` matching `pattern`, sorted.
    ///
    /// A missing category directory selects nothing; a missing source root
    /// means the project layout is wrong.
    fn select(&self, dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, TransformError> {
        let glob = GlobSet::new(pattern)
            .map_err(|e| TransformError::config(format!("invalid glob `{pattern}`: {e}")))?;

        let source = &self.config.paths.source;
        if !source.is_dir() {
            return Err(TransformError::config(format!(
                "source root `{}` does not exist",
                source.display()
            )));
        }
        Ok(glob.select(dir))
    }
}

/// Summary of a successful task run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskReport {
    pub task: TaskName,
    /// Files written (or converted, for `fontgen`).
    pub written: usize,
}

impl TaskReport {
    pub const fn new(task: TaskName, written: usize) -> Self {
        Self { task, written }
    }
}

/// Result of an isolated run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Done(TaskReport),
    Failed {
        task: TaskName,
        error: TransformError,
    },
}

impl TaskOutcome {
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Done(_))
    }

    pub const fn task(&self) -> TaskName {
        match self {
            Self::Done(report) => report.task,
            Self::Failed { task, .. } => *task,
        }
    }
}

/// Run one task, propagating its error.
pub fn run_task(task: TaskName, ctx: &TaskContext<'_>) -> Result<TaskReport, TransformError> {
    match task {
        TaskName::Markup => markup::run(ctx),
        TaskName::Styles => styles::run(ctx),
        TaskName::Scripts => scripts::run(ctx),
        TaskName::Images => images::run(ctx),
        TaskName::Sprite => sprite::run_raster(ctx),
        TaskName::SvgSprite => sprite::run_vector(ctx),
        TaskName::FontConvert => fonts::run_convert(ctx),
        TaskName::Fonts => fonts::run_copy(ctx),
    }
}

/// Run one task, reporting a failure instead of returning it.
///
/// Siblings running in parallel are unaffected by the failure.
pub fn run_isolated(task: TaskName, ctx: &TaskContext<'_>) -> TaskOutcome {
    match run_task(task, ctx) {
        Ok(report) => {
            debug!(task.name(); "{} file(s) written", report.written);
            TaskOutcome::Done(report)
        }
        Err(error) => {
            report_error(&error.title(), &error.message);
            TaskOutcome::Failed { task, error }
        }
    }
}

/// Whether the generator behind `task` has any input.
pub fn has_inputs(task: TaskName, config: &PipelineConfig) -> bool {
    let dir = match task {
        TaskName::Sprite => config.paths.raster_sprite_dir(),
        TaskName::SvgSprite => config.paths.vector_sprite_dir(),
        _ => return true,
    };
    dir.is_dir()
}

/// Shared fixtures for task tests.
#[cfg(test)]
pub(crate) mod testing {
    use crate::config::{PipelineConfig, test_config_at};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    /// Temporary project with an empty `src/` root.
    pub struct Project {
        pub dir: TempDir,
        pub config: PipelineConfig,
    }

    impl Project {
        pub fn new() -> Self {
            Self::with_config("")
        }

        pub fn with_config(toml: &str) -> Self {
            let dir = TempDir::new().unwrap();
            fs::create_dir_all(dir.path().join("src")).unwrap();
            let config = test_config_at(dir.path(), toml);
            Self { dir, config }
        }

        /// Write a file relative to the project root.
        pub fn write(&self, rel: &str, contents: impl AsRef<[u8]>) {
            let path = self.dir.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, contents).unwrap();
        }

        pub fn read(&self, rel: &str) -> Vec<u8> {
            fs::read(self.dir.path().join(rel)).unwrap()
        }

        pub fn read_string(&self, rel: &str) -> String {
            fs::read_to_string(self.dir.path().join(rel)).unwrap()
        }

        pub fn exists(&self, rel: &str) -> bool {
            self.dir.path().join(rel).exists()
        }

        pub fn root(&self) -> &Path {
            self.dir.path()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::Project;
    use super::*;

    #[test]
    fn test_missing_source_root_is_config_error() {
        let project = Project::new();
        std::fs::remove_dir_all(project.root().join("src")).unwrap();

        let cache = TransformCache::in_memory();
        let ctx = TaskContext::new(&project.config, BuildMode::Development, &cache);
        let err = run_task(TaskName::Markup, &ctx).unwrap_err();
        assert_eq!(err.transform, "config");
    }

    #[test]
    fn test_invalid_glob_is_config_error() {
        let project = Project::with_config("[scripts]\npattern = \"[*.js\"");
        let cache = TransformCache::in_memory();
        let ctx = TaskContext::new(&project.config, BuildMode::Development, &cache);

        let outcome = run_isolated(TaskName::Scripts, &ctx);
        match outcome {
            TaskOutcome::Failed { task, error } => {
                assert_eq!(task, TaskName::Scripts);
                assert_eq!(error.title(), "Error in config");
            }
            TaskOutcome::Done(_) => panic!("expected failure"),
        }
    }

    #[test]
    fn test_missing_category_dir_selects_nothing() {
        let project = Project::new();
        let cache = TransformCache::in_memory();
        let ctx = TaskContext::new(&project.config, BuildMode::Production, &cache);

        for task in [TaskName::Markup, TaskName::Scripts, TaskName::Images, TaskName::Fonts] {
            let report = run_task(task, &ctx).unwrap();
            assert_eq!(report.written, 0, "{task}");
        }
    }

    #[test]
    fn test_has_inputs() {
        let project = Project::new();
        assert!(!has_inputs(TaskName::Sprite, &project.config));
        project.write("src/assets/img/png/a.png", b"");
        assert!(has_inputs(TaskName::Sprite, &project.config));
        assert!(has_inputs(TaskName::Styles, &project.config));
    }
}
