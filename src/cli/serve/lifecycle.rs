//! Server lifecycle management.

use crate::actor::Coordinator;
use crate::cache::TransformCache;
use crate::config::PipelineConfig;
use crate::core::BuildMode;
use crate::log;
use crate::reload::server::MAX_PORT_RETRIES;
use anyhow::Result;
use crossbeam::channel::Receiver;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tiny_http::Server;

/// Bind to the specified interface and port, trying the next ports when busy.
pub fn bind_with_retry(interface: IpAddr, base_port: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;

    for offset in 0..=MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow::anyhow!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        MAX_PORT_RETRIES + 1,
        base_port,
        base_port.saturating_add(MAX_PORT_RETRIES),
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

/// Spawn the actor system for file watching and live reload.
pub fn spawn_actors(
    config: Arc<PipelineConfig>,
    cache: Arc<TransformCache>,
    mode: BuildMode,
    shutdown_rx: Receiver<()>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        if let Err(e) = run_actor_system(config, cache, mode, shutdown_rx) {
            log!("actor"; "error: {:#}", e);
        }
    })
}

fn run_actor_system(
    config: Arc<PipelineConfig>,
    cache: Arc<TransformCache>,
    mode: BuildMode,
    shutdown_rx: Receiver<()>,
) -> Result<()> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?;

    let serve = &config.serve;
    let coordinator = Coordinator::new(Arc::clone(&config), cache, mode)
        .with_ws(serve.interface, serve.ws_port)
        .with_shutdown_signal(shutdown_rx);
    rt.block_on(coordinator.run())
}

/// Wait for actor system to shutdown gracefully (max 2 seconds).
pub fn wait_for_shutdown(handle: JoinHandle<()>) {
    for _ in 0..40 {
        if handle.is_finished() {
            let _ = handle.join();
            return;
        }
        thread::sleep(Duration::from_millis(50));
    }
}
