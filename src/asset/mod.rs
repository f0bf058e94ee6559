//! In-memory asset transforms backed by lightningcss and oxc.
//!
//! - [`css`]: prefixing and media query grouping
//! - [`minify`]: CSS and JavaScript minification

pub mod css;
pub mod minify;
