//! Actor Message Definitions
//!
//! Message types for inter-actor communication.
//!
//! ```text
//! FsActor --Run--> TaskActor --Notify--> WsActor
//! ```

use std::net::TcpStream;

use crate::core::TaskName;
use crate::reload::HotReloadMessage;

// =============================================================================
// TaskActor Messages
// =============================================================================

/// Messages to Task Actor
#[derive(Debug)]
pub enum TaskMsg {
    /// Run a deduplicated batch of tasks, sorted so generators come first
    Run(Vec<TaskName>),
    /// Shutdown
    Shutdown,
}

// =============================================================================
// WsActor Messages
// =============================================================================

/// Messages to WebSocket Actor
#[derive(Debug)]
pub enum WsMsg {
    /// Broadcast a live reload message to every client
    Notify(HotReloadMessage),
    /// Add client (handshake is performed by the actor)
    AddClient(TcpStream),
    /// Shutdown
    Shutdown,
}
