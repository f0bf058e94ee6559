//! Actor System for Watch Mode
//!
//! Message-passing concurrency for `develop`:
//!
//! ```text
//! FsActor --> TaskActor --> WsActor
//! (watch)     (rebuild)     (broadcast)
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Message types for inter-actor communication
//! - `fs` - File system watcher with debouncing and path routing
//! - `task` - Runs rebuild batches and decides on page reloads
//! - `ws` - WebSocket broadcast
//! - `coordinator` - Wires up and runs actors

pub mod coordinator;
pub mod fs;
pub mod messages;
pub mod task;
pub mod ws;

pub use coordinator::Coordinator;
