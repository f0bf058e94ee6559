use crate::reload::HotReloadMessage;

use super::WsActor;
use super::client_io::send;

impl WsActor {
    /// Broadcast a message to all connected clients
    pub(super) fn broadcast(&self, message: &HotReloadMessage) {
        let mut clients = self.clients.lock();
        let count = clients.len();

        if count == 0 {
            crate::debug!("ws"; "no clients connected");
            return;
        }

        clients.retain_mut(|ws| match send(ws, message) {
            Ok(()) => true,
            Err(e) => {
                crate::debug!("ws"; "client disconnected: {}", e);
                false
            }
        });
        crate::debug!("ws"; "broadcast to {} clients", count);
    }
}
