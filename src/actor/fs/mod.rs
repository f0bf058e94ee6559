//! FileSystem Actor
//!
//! Watches the source tree and sends debounced task batches to the TaskActor.
//! The watcher is created by `Coordinator::run`, after the initial build has
//! finished, so edits made during that build are not picked up.
//!
//! ```text
//! Watcher → Debouncer (pure timing) → Router (path → tasks) → TaskMsg::Run
//! ```

use std::sync::Arc;

use notify::RecommendedWatcher;
use tokio::sync::mpsc;

use super::messages::TaskMsg;
use crate::config::PipelineConfig;
use crate::utils::glob::GlobSet;

// Pure timing and deduplication.
mod debouncer;
// Changed path → affected tasks.
mod router;
// Shared fs event types.
mod types;
// Watch root attach/re-attach lifecycle.
mod watch_roots;


use debouncer::Debouncer;
use router::route_all;
use watch_roots::WatchRoots;

/// FileSystem Actor - watches for file changes
pub struct FsActor {
    /// Channel to receive notify events (sync -> async bridge)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle (must be kept alive)
    watcher: RecommendedWatcher,
    /// Watch-root consistency layer (attach/re-attach root directories)
    watch_roots: WatchRoots,
    /// Channel to send batches to TaskActor
    task_tx: mpsc::Sender<TaskMsg>,
    /// Debouncer state
    debouncer: Debouncer,
    /// Markup glob, compiled once
    markup: GlobSet,
    config: Arc<PipelineConfig>,
}

impl FsActor {
    /// Create a new FsActor; the watcher starts immediately.
    pub fn new(task_tx: mpsc::Sender<TaskMsg>, config: Arc<PipelineConfig>) -> anyhow::Result<Self> {
        let markup = config.paths.markup_glob()?;

        // Create sync channel for notify (it doesn't support async)
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;

        // Missing roots are re-attached once they appear
        let mut watch_roots = WatchRoots::for_paths(&config.paths);
        watch_roots.attach_existing(&mut watcher)?;

        Ok(Self {
            notify_rx,
            watcher,
            watch_roots,
            task_tx,
            debouncer: Debouncer::new(),
            markup,
            config,
        })
    }

    /// Run the actor event loop
    pub async fn run(self) {
        let Self {
            notify_rx,
            mut watcher,
            mut watch_roots,
            task_tx,
            mut debouncer,
            markup,
            config,
        } = self;

        let (async_tx, mut async_rx) = tokio::sync::mpsc::channel::<notify::Event>(64);

        // Spawn a thread to poll notify events and send to async channel
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break; // Receiver dropped
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        loop {
            tokio::select! {
                biased;
                Some(event) = async_rx.recv() => debouncer.add_event(&event),
                _ = tokio::time::sleep(debouncer.sleep_duration()) => {
                    watch_roots.maintain(&mut watcher);
                    let Some(changes) = debouncer.take_if_ready() else {
                        continue;
                    };

                    let tasks = route_all(changes.keys().map(|p| p.as_path()), &config, &markup);
                    if tasks.is_empty() {
                        continue;
                    }
                    crate::debug!("watch"; "{} change(s) -> {:?}", changes.len(), tasks);
                    if task_tx.send(TaskMsg::Run(tasks)).await.is_err() {
                        break; // TaskActor shut down
                    }
                }
            }
        }
    }
}
