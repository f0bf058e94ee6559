//! Build orchestration.
//!
//! Build pipeline phases:
//! - **Clean** - Remove outputs, generated artifacts and caches (aborts on error)
//! - **Generate** - Sprite generators whose input folders exist
//! - **Parallel** - Markup, styles, scripts, images and fonts on the rayon pool
//!
//! A failed task never cancels its siblings; `build` turns any failure into a
//! non-zero exit after everything ran.

use crate::cache::{IMAGE_CACHE_DIR, TransformCache};
use crate::config::PipelineConfig;
use crate::core::{BuildMode, TaskName};
use crate::log;
use crate::logger::{ProgressLine, set_watch_mode};
use crate::task::{TaskContext, TaskOutcome, clean, has_inputs, run_isolated};
use anyhow::{Result, bail};
use parking_lot::Mutex;
use rayon::prelude::*;
use std::sync::Arc;
use std::time::Instant;

/// Open the persistent transform cache of a project.
pub fn open_cache(config: &PipelineConfig) -> TransformCache {
    TransformCache::open(&config.paths.cache.join(IMAGE_CACHE_DIR))
}

/// Clean, then run every task once.
pub fn build(config: &PipelineConfig, mode: BuildMode) -> Result<()> {
    let cache = open_cache(config);
    let outcomes = run_pipeline(config, mode, &cache)?;
    ensure_success(&outcomes)
}

/// Build, then watch and serve until Ctrl+C.
///
/// Failures of the initial build are reported but do not stop the server.
pub fn develop(config: PipelineConfig, mode: BuildMode) -> Result<()> {
    let config = Arc::new(config);
    let cache = Arc::new(open_cache(&config));

    run_pipeline(&config, mode, &cache)?;

    let server = crate::cli::serve::bind_server(&config)?;
    set_watch_mode(true);
    server.run(config, cache, mode)
}

/// Run one task on its own, without a prior clean.
pub fn run_single(config: &PipelineConfig, mode: BuildMode, task: TaskName) -> Result<()> {
    let cache = open_cache(config);
    let ctx = TaskContext::new(config, mode, &cache);

    let started = Instant::now();
    let outcome = run_isolated(task, &ctx);
    if let TaskOutcome::Done(report) = &outcome {
        log!(task.name(); "{} file(s) in {:.2}s", report.written, started.elapsed().as_secs_f64());
    }
    ensure_success(&[outcome])
}

/// Delete every generated path.
pub fn clean_only(config: &PipelineConfig) -> Result<()> {
    let cache = open_cache(config);
    clean(config, &cache)?;
    Ok(())
}

/// Clean, generate, then run the parallel phase.
fn run_pipeline(
    config: &PipelineConfig,
    mode: BuildMode,
    cache: &TransformCache,
) -> Result<Vec<TaskOutcome>> {
    let started = Instant::now();
    clean(config, cache)?;

    let ctx = TaskContext::new(config, mode, cache);
    let generators: Vec<TaskName> = TaskName::GENERATORS
        .into_iter()
        .filter(|&task| has_inputs(task, config))
        .collect();

    let progress = ProgressLine::new(&[
        ("generate", generators.len()),
        ("tasks", TaskName::PARALLEL.len()),
    ]);

    // Generators finish before any consumer of the generated directory starts
    let mut outcomes: Vec<TaskOutcome> = generators
        .par_iter()
        .map(|&task| {
            let outcome = run_isolated(task, &ctx);
            progress.inc("generate");
            outcome
        })
        .collect();

    let parallel = Mutex::new(Vec::with_capacity(TaskName::PARALLEL.len()));
    rayon::scope(|s| {
        for task in TaskName::PARALLEL {
            let (ctx, progress, parallel) = (&ctx, &progress, &parallel);
            s.spawn(move |_| {
                let outcome = run_isolated(task, ctx);
                progress.inc("tasks");
                parallel.lock().push(outcome);
            });
        }
    });
    progress.finish();

    let mut parallel = parallel.into_inner();
    parallel.sort_by_key(TaskOutcome::task);
    outcomes.extend(parallel);

    let written: usize = outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            TaskOutcome::Done(report) => Some(report.written),
            TaskOutcome::Failed { .. } => None,
        })
        .sum();
    log!(
        "build";
        "{} {} file(s) in {:.2}s",
        mode,
        written,
        started.elapsed().as_secs_f64()
    );
    Ok(outcomes)
}

/// Turn task failures into an error for the exit code.
fn ensure_success(outcomes: &[TaskOutcome]) -> Result<()> {
    let failed: Vec<&str> = outcomes
        .iter()
        .filter(|outcome| !outcome.is_ok())
        .map(|outcome| outcome.task().name())
        .collect();
    if failed.is_empty() {
        Ok(())
    } else {
        bail!("failed: {}", failed.join(", "))
    }
}
