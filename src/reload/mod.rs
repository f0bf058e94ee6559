//! Reload Module
//!
//! Provides WebSocket-based live reload for development.
//!
//! # Architecture
//!
//! ```text
//! FsActor -> TaskActor -> WsActor -> Browser
//!  (watch)    (tasks)   (broadcast)
//! ```
//!
//! Tasks that stream their results (styles, images) push messages through a
//! [`ReloadSink`] while they run; the task actor sends page reloads and error
//! overlays once a batch has finished.
//!
//! # Modules
//!
//! - `message` - Hot reload message types (reload, css, assets, error)
//! - `server` - WebSocket acceptor feeding clients to the actor system
//! - `sink` - Notification seam used by tasks

pub mod message;
pub mod server;
mod sink;

pub use message::HotReloadMessage;
#[cfg(test)]
pub use sink::RecordingSink;
pub use sink::ReloadSink;
