//! Actor Coordinator - Wires up the Watch and Live Reload Actor System
//!
//! The Coordinator is a thin orchestrator that:
//! - Creates communication channels
//! - Starts the WebSocket listener
//! - Wires up actors and runs them until shutdown

mod runtime;

use std::net::IpAddr;
use std::sync::Arc;

use anyhow::Result;
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use super::fs::FsActor;
use super::messages::{TaskMsg, WsMsg};
use super::task::{PipelineRunner, TaskActor};
use super::ws::{WsActor, WsSink};
use crate::cache::TransformCache;
use crate::config::PipelineConfig;
use crate::core::BuildMode;

const CHANNEL_BUFFER: usize = 32;

/// Coordinator - wires up and runs the actor system.
pub struct Coordinator {
    config: Arc<PipelineConfig>,
    cache: Arc<TransformCache>,
    mode: BuildMode,
    ws_addr: Option<(IpAddr, u16)>,
    shutdown_rx: Option<Receiver<()>>,
}

impl Coordinator {
    pub fn new(config: Arc<PipelineConfig>, cache: Arc<TransformCache>, mode: BuildMode) -> Self {
        Self {
            config,
            cache,
            mode,
            ws_addr: None,
            shutdown_rx: None,
        }
    }

    /// Listen for live reload clients on `interface:port` (or the next free port).
    pub fn with_ws(mut self, interface: IpAddr, port: u16) -> Self {
        self.ws_addr = Some((interface, port));
        self
    }

    /// Set shutdown signal receiver.
    pub fn with_shutdown_signal(mut self, rx: Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Run the actor system.
    pub async fn run(mut self) -> Result<()> {
        let (task_tx, task_rx) = mpsc::channel::<TaskMsg>(CHANNEL_BUFFER);
        let (ws_tx, ws_rx) = mpsc::channel::<WsMsg>(CHANNEL_BUFFER);

        if let Some((interface, port)) = self.ws_addr {
            match crate::reload::server::start_ws_server_with_channel(interface, port, ws_tx.clone()) {
                Ok(actual_port) => {
                    crate::debug!("hotreload"; "ws://{}:{}", interface, actual_port);
                    crate::cli::serve::set_actual_ws_port(actual_port);
                }
                Err(e) => {
                    crate::log!("actor"; "websocket server failed: {}", e);
                }
            }
        }

        let fs_actor = FsActor::new(task_tx.clone(), Arc::clone(&self.config))
            .map_err(|e| anyhow::anyhow!("watcher failed: {}", e))?;

        let runner = PipelineRunner::new(Arc::clone(&self.config), Arc::clone(&self.cache), self.mode);
        let task_actor = TaskActor::new(task_rx, runner, Arc::new(WsSink::new(ws_tx.clone())));
        let ws_actor = WsActor::new(ws_rx);

        crate::debug!("actor"; "start");
        let shutdown_rx = self.shutdown_rx.take();
        runtime::run_actors(fs_actor, task_actor, ws_actor, task_tx, ws_tx, shutdown_rx).await;

        crate::debug!("actor"; "stopped");
        Ok(())
    }
}
