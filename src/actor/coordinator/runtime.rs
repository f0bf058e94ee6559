use std::time::Duration;

use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use crate::actor::fs::FsActor;
use crate::actor::messages::{TaskMsg, WsMsg};
use crate::actor::task::{TaskActor, TaskRunner};
use crate::actor::ws::WsActor;

/// Time a running rebuild gets to finish after Ctrl+C.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

/// Run all actors concurrently until shutdown.
pub(super) async fn run_actors<R: TaskRunner>(
    fs: FsActor,
    task: TaskActor<R>,
    ws: WsActor,
    task_tx: mpsc::Sender<TaskMsg>,
    ws_tx: mpsc::Sender<WsMsg>,
    shutdown_rx: Option<Receiver<()>>,
) {
    let fs_handle = tokio::spawn(async move { fs.run().await });
    let task_handle = tokio::spawn(async move { task.run().await });
    let ws_handle = tokio::spawn(async move { ws.run().await });

    if let Some(rx) = shutdown_rx {
        loop {
            if rx.try_recv().is_ok() {
                crate::debug!("actor"; "shutdown signal received");
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    } else {
        tokio::select! {
            _ = fs_handle => {}
            _ = ws_handle => {}
        }
    }

    crate::debug!("actor"; "sending shutdown");
    let _ = task_tx.send(TaskMsg::Shutdown).await;
    let _ = tokio::time::timeout(SHUTDOWN_GRACE, task_handle).await;
    let _ = ws_tx.send(WsMsg::Shutdown).await;
}
