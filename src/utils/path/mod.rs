//! Filesystem path helpers.

pub mod fs;

pub use fs::{display_relative, normalize_path};
