//! Task Actor - Watch Rebuilds
//!
//! Receives deduplicated task batches from the FsActor and runs them on a
//! blocking thread. Per batch it emits at most one page reload and keeps the
//! browser error overlay in sync:
//!
//! ```text
//! FsActor --Run([...])--> TaskActor --reload/error/clear_error--> WsActor
//! ```
//!
//! Styles and images stream their own `css`/`assets` messages from inside
//! the task through the same sink.

use std::sync::Arc;

use rayon::prelude::*;
use tokio::sync::mpsc;

use super::messages::TaskMsg;
use crate::cache::TransformCache;
use crate::config::PipelineConfig;
use crate::core::{BuildMode, TaskName};
use crate::logger::status_success;
use crate::reload::{HotReloadMessage, ReloadSink};
use crate::task::{TaskContext, TaskOutcome, run_isolated};

/// Executes one task for a watch rebuild.
pub trait TaskRunner: Send + Sync + 'static {
    fn run(&self, task: TaskName, sink: &dyn ReloadSink) -> TaskOutcome;
}

/// Runs the real transform tasks.
pub struct PipelineRunner {
    config: Arc<PipelineConfig>,
    cache: Arc<TransformCache>,
    mode: BuildMode,
}

impl PipelineRunner {
    pub fn new(config: Arc<PipelineConfig>, cache: Arc<TransformCache>, mode: BuildMode) -> Self {
        Self {
            config,
            cache,
            mode,
        }
    }
}

impl TaskRunner for PipelineRunner {
    fn run(&self, task: TaskName, sink: &dyn ReloadSink) -> TaskOutcome {
        let ctx = TaskContext::new(&self.config, self.mode, &self.cache).with_reload(sink);
        run_isolated(task, &ctx)
    }
}

/// Task Actor - serializes watch rebuilds
pub struct TaskActor<R: TaskRunner> {
    rx: mpsc::Receiver<TaskMsg>,
    runner: Arc<R>,
    sink: Arc<dyn ReloadSink>,
    /// Last batch failed; the next clean batch clears the overlay
    had_error: bool,
}

impl<R: TaskRunner> TaskActor<R> {
    pub fn new(rx: mpsc::Receiver<TaskMsg>, runner: R, sink: Arc<dyn ReloadSink>) -> Self {
        Self {
            rx,
            runner: Arc::new(runner),
            sink,
            had_error: false,
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            match msg {
                TaskMsg::Run(tasks) => {
                    let runner = Arc::clone(&self.runner);
                    let sink = Arc::clone(&self.sink);
                    let had_error = self.had_error;

                    // Tasks block on IO and external compilers
                    let result = tokio::task::spawn_blocking(move || {
                        run_batch(&*runner, &*sink, &tasks, had_error)
                    })
                    .await;

                    match result {
                        Ok(failed) => self.had_error = failed,
                        Err(e) => crate::log!("watch"; "rebuild panicked: {}", e),
                    }
                }
                TaskMsg::Shutdown => {
                    crate::debug!("watch"; "task actor shutting down");
                    break;
                }
            }
        }
    }
}

/// Run one batch: generators first, then the rest in parallel.
///
/// Returns whether any task failed.
pub(crate) fn run_batch(
    runner: &dyn TaskRunner,
    sink: &dyn ReloadSink,
    tasks: &[TaskName],
    had_error: bool,
) -> bool {
    let (generators, consumers): (Vec<TaskName>, Vec<TaskName>) = tasks
        .iter()
        .copied()
        .partition(|task| TaskName::GENERATORS.contains(task));

    let mut outcomes: Vec<TaskOutcome> = generators
        .iter()
        .map(|&task| runner.run(task, sink))
        .collect();
    outcomes.extend(
        consumers
            .par_iter()
            .map(|&task| runner.run(task, sink))
            .collect::<Vec<_>>(),
    );

    let failure = outcomes.iter().find_map(|outcome| match outcome {
        TaskOutcome::Failed { error, .. } => Some(error),
        TaskOutcome::Done(_) => None,
    });
    if let Some(error) = failure {
        // Details were already reported by `run_isolated`
        sink.notify(HotReloadMessage::error(error.title(), error.message.clone()));
        return true;
    }

    if had_error {
        sink.notify(HotReloadMessage::ClearError);
    }

    let reloading: Vec<&str> = outcomes
        .iter()
        .map(TaskOutcome::task)
        .filter(|task| task.reloads_page())
        .map(TaskName::name)
        .collect();
    if !reloading.is_empty() {
        sink.notify(HotReloadMessage::reload_with_reason(reloading.join(", ")));
    }

    let names: Vec<&str> = tasks.iter().map(|task| task.name()).collect();
    status_success(&format!("rebuilt {}", names.join(", ")));
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reload::RecordingSink;
    use crate::task::{TaskReport, TransformError};
    use crate::task::testing::Project;
    use parking_lot::Mutex;
    use std::time::Duration;

    /// Records runs; fails the tasks it was told to fail.
    #[derive(Default)]
    struct RecordingRunner {
        runs: Mutex<Vec<TaskName>>,
        failing: Vec<TaskName>,
    }

    impl TaskRunner for RecordingRunner {
        fn run(&self, task: TaskName, _sink: &dyn ReloadSink) -> TaskOutcome {
            self.runs.lock().push(task);
            if self.failing.contains(&task) {
                TaskOutcome::Failed {
                    task,
                    error: TransformError::new("sass", "expected \"{\""),
                }
            } else {
                TaskOutcome::Done(TaskReport::new(task, 1))
            }
        }
    }

    fn reloads(messages: &[HotReloadMessage]) -> usize {
        messages
            .iter()
            .filter(|m| matches!(m, HotReloadMessage::Reload { .. }))
            .count()
    }

    #[test]
    fn test_scripts_change_reloads_once() {
        let runner = RecordingRunner::default();
        let sink = RecordingSink::new();

        let failed = run_batch(&runner, &sink, &[TaskName::Scripts], false);
        assert!(!failed);
        assert_eq!(*runner.runs.lock(), vec![TaskName::Scripts]);
        assert_eq!(
            sink.take(),
            vec![HotReloadMessage::reload_with_reason("scripts")]
        );
    }

    #[test]
    fn test_styles_only_batch_does_not_reload() {
        let runner = RecordingRunner::default();
        let sink = RecordingSink::new();

        run_batch(&runner, &sink, &[TaskName::Styles, TaskName::Images], false);
        assert_eq!(reloads(&sink.take()), 0);
    }

    #[test]
    fn test_generators_run_before_consumers() {
        let runner = RecordingRunner::default();
        let sink = RecordingSink::new();

        let batch = [TaskName::Sprite, TaskName::Styles, TaskName::Images];
        run_batch(&runner, &sink, &batch, false);

        let runs = runner.runs.lock();
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0], TaskName::Sprite);
    }

    #[test]
    fn test_failure_reports_error_without_reload() {
        let runner = RecordingRunner {
            failing: vec![TaskName::Styles],
            ..Default::default()
        };
        let sink = RecordingSink::new();

        let failed = run_batch(&runner, &sink, &[TaskName::Markup, TaskName::Styles], false);
        assert!(failed);

        let messages = sink.take();
        assert_eq!(reloads(&messages), 0);
        assert_eq!(
            messages,
            vec![HotReloadMessage::error("Error in sass", "expected \"{\"")]
        );
    }

    #[test]
    fn test_recovery_clears_overlay() {
        let runner = RecordingRunner::default();
        let sink = RecordingSink::new();

        run_batch(&runner, &sink, &[TaskName::Styles], true);
        assert_eq!(sink.take(), vec![HotReloadMessage::ClearError]);
    }

    #[tokio::test]
    async fn test_actor_runs_batches_in_order() {
        let (tx, rx) = mpsc::channel(4);
        let sink = Arc::new(RecordingSink::new());
        let runner = RecordingRunner {
            failing: vec![TaskName::Styles],
            ..Default::default()
        };
        let actor = TaskActor::new(rx, runner, Arc::clone(&sink) as Arc<dyn ReloadSink>);
        let runner = Arc::clone(&actor.runner);

        tx.send(TaskMsg::Run(vec![TaskName::Styles])).await.unwrap();
        tx.send(TaskMsg::Run(vec![TaskName::Scripts])).await.unwrap();
        tx.send(TaskMsg::Shutdown).await.unwrap();
        tokio::time::timeout(Duration::from_secs(10), actor.run())
            .await
            .unwrap();

        assert_eq!(*runner.runs.lock(), vec![TaskName::Styles, TaskName::Scripts]);
        let messages = sink.take();
        assert!(matches!(messages[0], HotReloadMessage::Error { .. }));
        assert_eq!(messages[1], HotReloadMessage::ClearError);
        assert_eq!(reloads(&messages), 1);
    }

    #[test]
    fn test_pipeline_runner_streams_css() {
        let project = Project::new();
        project.write("src/assets/sass/main.css", "a { color: red }");
        let runner = PipelineRunner::new(
            Arc::new(project.config.clone()),
            Arc::new(TransformCache::in_memory()),
            BuildMode::Development,
        );
        let sink = RecordingSink::new();

        let outcome = runner.run(TaskName::Styles, &sink);
        assert!(outcome.is_ok(), "{outcome:?}");
        assert!(
            sink.take()
                .contains(&HotReloadMessage::css("assets/css/main.min.css"))
        );
    }
}
