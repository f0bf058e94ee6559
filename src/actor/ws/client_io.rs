use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use crate::core::is_shutdown;
use crate::reload::HotReloadMessage;

use super::WsActor;

const READ_POLL: Duration = Duration::from_millis(100);

impl WsActor {
    /// Add a new client connection
    pub(super) fn add_client(&self, stream: TcpStream) {
        // Keep blocking mode during handshake, switch to non-blocking after
        let mut ws = match tungstenite::accept(stream) {
            Ok(ws) => ws,
            Err(e) => {
                crate::log!("ws"; "handshake failed: {}", e);
                return;
            }
        };

        if let Err(e) = send(&mut ws, &HotReloadMessage::connected()) {
            crate::log!("ws"; "failed to send connected message: {}", e);
            return;
        }

        // Late client: show the overlay of the still-broken build
        if let Some(ref error) = self.pending_error {
            match send(&mut ws, error) {
                Ok(()) => crate::debug!("ws"; "sent pending error to new client"),
                Err(e) => crate::log!("ws"; "failed to send pending error: {}", e),
            }
        }

        let _ = ws.get_ref().set_nonblocking(true);

        let mut clients = self.clients.lock();
        crate::debug!("ws"; "client connected (total: {})", clients.len() + 1);
        clients.push(ws);
    }

    /// Background thread to drop closed clients (non-blocking poll)
    pub(super) fn client_reader_loop(clients: Arc<Mutex<Vec<WebSocket<TcpStream>>>>) {
        while !is_shutdown() {
            std::thread::sleep(READ_POLL);

            let mut clients = clients.lock();
            let before = clients.len();
            // The client never sends anything meaningful; reads only detect closes
            clients.retain_mut(|ws| match ws.read() {
                Ok(Message::Close(_)) => false,
                Ok(_) => true,
                Err(tungstenite::Error::Io(ref e)) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    true
                }
                Err(_) => false,
            });

            if clients.len() < before {
                crate::debug!("ws"; "{} client(s) disconnected", before - clients.len());
            }
        }
    }
}

/// Send one message as a text frame.
pub(super) fn send(
    ws: &mut WebSocket<TcpStream>,
    message: &HotReloadMessage,
) -> tungstenite::Result<()> {
    ws.send(Message::Text(message.to_json().into()))
}
