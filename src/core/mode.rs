//! Build mode selection.

use clap::ValueEnum;
use std::fmt;

/// Whether outputs are optimized for shipping or for local iteration.
///
/// Chosen once per invocation and threaded into every task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum BuildMode {
    /// Readable stylesheets, no size report.
    #[default]
    Development,
    /// Minified stylesheets with a size report.
    Production,
}

impl BuildMode {
    /// Whether stylesheets are minified.
    #[inline]
    pub const fn minify(self) -> bool {
        matches!(self, Self::Production)
    }

    /// Whether minification reports original vs minified sizes.
    #[inline]
    pub const fn report_sizes(self) -> bool {
        matches!(self, Self::Production)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
