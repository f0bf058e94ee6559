//! Ctrl+C handling for `develop`.
//!
//! Until the dev server registers itself Ctrl+C exits at once. Afterwards it
//! sets the shutdown flag polled by the server and reload loops, unblocks the
//! HTTP server and signals the actors.

use crossbeam::channel::Sender;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use tiny_http::Server;

static SHUTDOWN: AtomicBool = AtomicBool::new(false);
static RUNNING: OnceLock<Running> = OnceLock::new();

/// What a graceful shutdown has to stop.
struct Running {
    server: Arc<Server>,
    actors: Sender<()>,
}

pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        SHUTDOWN.store(true, Ordering::SeqCst);
        let Some(running) = RUNNING.get() else {
            std::process::exit(130);
        };
        crate::log!("serve"; "shutting down...");
        let _ = running.actors.send(());
        running.server.unblock();
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {e}"))
}

/// Switch Ctrl+C to graceful shutdown. Only the first registration counts.
pub fn register_server(server: Arc<Server>, actors: Sender<()>) {
    let _ = RUNNING.set(Running { server, actors });
}

pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}
