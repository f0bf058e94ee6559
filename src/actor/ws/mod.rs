//! WebSocket Actor - Live Reload Broadcast
//!
//! This actor is responsible for:
//! - Managing WebSocket client connections
//! - Broadcasting messages to all connected clients
//! - Replaying the last build error to clients that connect late
//!
//! # Architecture
//!
//! ```text
//! TaskActor --[WsSink]--> WsActor --[broadcast]--> Clients
//! ```

mod client_io;
mod delivery;

use std::net::TcpStream;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tungstenite::WebSocket;

use super::messages::WsMsg;
use crate::reload::{HotReloadMessage, ReloadSink};

/// WebSocket Actor - manages client connections and broadcasts
pub struct WsActor {
    /// Channel to receive messages
    rx: mpsc::Receiver<WsMsg>,
    /// Connected clients (shared for broadcast + read threads)
    clients: Arc<Mutex<Vec<WebSocket<TcpStream>>>>,
    /// Error overlay shown to clients that connect while a build is broken
    pending_error: Option<HotReloadMessage>,
}

impl WsActor {
    /// Create a new WsActor
    pub fn new(rx: mpsc::Receiver<WsMsg>) -> Self {
        Self {
            rx,
            clients: Arc::new(Mutex::new(Vec::new())),
            pending_error: None,
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        // Background thread notices clients that went away between broadcasts
        let clients_for_reader = Arc::clone(&self.clients);
        std::thread::spawn(move || {
            Self::client_reader_loop(clients_for_reader);
        });

        while let Some(msg) = self.rx.recv().await {
            match msg {
                WsMsg::Notify(message) => {
                    self.remember(&message);
                    crate::debug!("ws"; "sending {}", message.to_json());
                    self.broadcast(&message);
                }

                WsMsg::AddClient(stream) => {
                    self.add_client(stream);
                }

                WsMsg::Shutdown => {
                    crate::debug!("ws"; "shutting down");
                    let mut clients = self.clients.lock();
                    for mut ws in clients.drain(..) {
                        let _ = ws.close(None);
                    }
                    break;
                }
            }
        }
    }

    /// Track the error overlay state for late clients.
    fn remember(&mut self, message: &HotReloadMessage) {
        match message {
            HotReloadMessage::Error { .. } => self.pending_error = Some(message.clone()),
            HotReloadMessage::ClearError => self.pending_error = None,
            _ => {}
        }
    }
}

/// Sink handed to tasks: forwards notifications into the actor's channel.
///
/// Tasks run on blocking threads, where `blocking_send` is allowed.
#[derive(Clone)]
pub struct WsSink {
    tx: mpsc::Sender<WsMsg>,
}

impl WsSink {
    pub fn new(tx: mpsc::Sender<WsMsg>) -> Self {
        Self { tx }
    }
}

impl ReloadSink for WsSink {
    fn notify(&self, message: HotReloadMessage) {
        if self.tx.blocking_send(WsMsg::Notify(message)).is_err() {
            crate::debug!("ws"; "actor stopped, dropping notification");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_error_tracking() {
        let (_tx, rx) = mpsc::channel(1);
        let mut actor = WsActor::new(rx);

        let error = HotReloadMessage::error("Error in sass", "expected \"{\"");
        actor.remember(&error);
        assert_eq!(actor.pending_error, Some(error));

        actor.remember(&HotReloadMessage::Assets);
        assert!(actor.pending_error.is_some());

        actor.remember(&HotReloadMessage::ClearError);
        assert!(actor.pending_error.is_none());
    }

    #[test]
    fn test_sink_forwards_to_channel() {
        let (tx, mut rx) = mpsc::channel(4);
        let sink = WsSink::new(tx);

        std::thread::spawn(move || sink.notify(HotReloadMessage::Assets))
            .join()
            .unwrap();

        match rx.try_recv() {
            Ok(WsMsg::Notify(message)) => assert_eq!(message, HotReloadMessage::Assets),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
