//! Shared helpers: external commands, globbing, MIME detection, paths.

pub mod exec;
pub mod glob;
pub mod mime;
pub mod path;
