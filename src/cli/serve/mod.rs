//! Development server with live reload support.
//!
//! Serves the output root over HTTP. HTML responses get the live reload
//! client injected; the client connects to the WebSocket listener started by
//! the actor [`Coordinator`](crate::actor::Coordinator).

mod lifecycle;
mod path;
mod response;

use crate::cache::TransformCache;
use crate::config::{DEFAULT_WS_PORT, PipelineConfig};
use crate::core::BuildMode;
use crate::log;
use anyhow::Result;
use crossbeam::channel;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};
use tiny_http::{Request, Server};

/// Worker threads answering HTTP requests.
const REQUEST_THREADS: usize = 4;

/// Actual WebSocket port (may differ from the configured one if it was in use)
/// Updated by coordinator after WebSocket server binds successfully
static ACTUAL_WS_PORT: AtomicU16 = AtomicU16::new(DEFAULT_WS_PORT);

/// Update the actual WebSocket port (called by coordinator after binding)
pub fn set_actual_ws_port(port: u16) {
    ACTUAL_WS_PORT.store(port, Ordering::Relaxed);
}

fn get_actual_ws_port() -> u16 {
    ACTUAL_WS_PORT.load(Ordering::Relaxed)
}

/// Bound server ready to accept requests
pub struct BoundServer {
    server: Arc<Server>,
    shutdown_rx: channel::Receiver<()>,
}

/// Bind the HTTP server without starting the request loop
pub fn bind_server(config: &PipelineConfig) -> Result<BoundServer> {
    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);
    set_actual_ws_port(config.serve.ws_port);

    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    crate::core::register_server(Arc::clone(&server), shutdown_tx);

    log!("serve"; "Local: http://{}", addr);

    Ok(BoundServer {
        server,
        shutdown_rx,
    })
}

impl BoundServer {
    /// Start watching and serving until Ctrl+C (blocking).
    pub fn run(
        self,
        config: Arc<PipelineConfig>,
        cache: Arc<TransformCache>,
        mode: BuildMode,
    ) -> Result<()> {
        let actor_handle =
            lifecycle::spawn_actors(Arc::clone(&config), cache, mode, self.shutdown_rx);
        let result = run_request_loop(&self.server, &config.paths.output);
        lifecycle::wait_for_shutdown(actor_handle);
        result
    }
}

fn run_request_loop(server: &Server, root: &Path) -> Result<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(REQUEST_THREADS)
        .thread_name(|i| format!("serve-{i}"))
        .build()?;

    for request in server.incoming_requests() {
        let root = root.to_path_buf();
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &root) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}

/// Handle a single HTTP request
fn handle_request(request: Request, root: &Path) -> Result<()> {
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    let ws_port = get_actual_ws_port();
    match path::resolve_path(request.url(), root) {
        Some(path) => response::respond_file(request, &path, ws_port),
        None => response::respond_not_found(request, root, ws_port),
    }
}
