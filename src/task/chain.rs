//! Ordered transform steps applied to one file at a time.
//!
//! A chain is fixed when the task builds it; steps never reorder. Each step
//! sees the output of the previous one, and the first failing step ends the
//! chain with an error named after that step.

use super::TransformError;
use std::fs;
use std::path::{Path, PathBuf};

/// One file moving through a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Absolute source path (fixed, used for relative lookups).
    pub source: PathBuf,
    /// Output name relative to the task's destination directory.
    pub name: PathBuf,
    pub contents: Vec<u8>,
}

impl Asset {
    /// Read `source`, naming it relative to `base`.
    pub fn read(source: &Path, base: &Path) -> Result<Self, TransformError> {
        let contents = fs::read(source).map_err(|e| TransformError::io(source, e))?;
        let name = source.strip_prefix(base).unwrap_or(source).to_path_buf();
        Ok(Self {
            source: source.to_path_buf(),
            name,
            contents,
        })
    }

    /// Contents as UTF-8 text.
    pub fn text(&self) -> Result<&str, String> {
        std::str::from_utf8(&self.contents).map_err(|e| format!("not valid UTF-8: {e}"))
    }

    /// Replace the contents with transformed text.
    pub fn with_text(mut self, text: String) -> Self {
        self.contents = text.into_bytes();
        self
    }

    pub fn extension(&self) -> Option<&str> {
        self.name.extension().and_then(|e| e.to_str())
    }

    /// Output name with `/` separators.
    pub fn display_name(&self) -> String {
        self.name.to_string_lossy().replace('\\', "/")
    }
}

/// A single in-memory transform.
pub trait Transform: Send + Sync {
    /// Name used in `Error in <name>` reports.
    fn name(&self) -> &'static str;

    fn apply(&self, asset: Asset) -> Result<Asset, String>;
}

/// Ordered list of transforms.
#[derive(Default)]
pub struct TransformChain<'a> {
    steps: Vec<Box<dyn Transform + 'a>>,
}

impl<'a> TransformChain<'a> {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Append a step.
    pub fn then(mut self, step: impl Transform + 'a) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Step names in application order.
    #[cfg(test)]
    pub fn names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run `asset` through every step.
    ///
    /// Error messages are prefixed with the file they concern.
    pub fn apply(&self, mut asset: Asset) -> Result<Asset, TransformError> {
        for step in &self.steps {
            let file = asset.display_name();
            asset = step
                .apply(asset)
                .map_err(|message| TransformError::new(step.name(), format!("{file}: {message}")))?;
        }
        Ok(asset)
    }
}

/// Renames `<stem>.<ext>` to `<stem><suffix>.<extension>`.
pub struct Rename {
    pub suffix: &'static str,
    pub extension: &'static str,
}

impl Rename {
    /// `main.scss` -> `main.min.css`
    pub const fn min(extension: &'static str) -> Self {
        Self {
            suffix: ".min",
            extension,
        }
    }
}

impl Transform for Rename {
    fn name(&self) -> &'static str {
        "rename"
    }

    fn apply(&self, mut asset: Asset) -> Result<Asset, String> {
        let stem = asset
            .name
            .file_stem()
            .ok_or("file has no name")?
            .to_string_lossy()
            .into_owned();
        asset
            .name
            .set_file_name(format!("{stem}{}.{}", self.suffix, self.extension));
        Ok(asset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Upper;

    impl Transform for Upper {
        fn name(&self) -> &'static str {
            "upper"
        }

        fn apply(&self, asset: Asset) -> Result<Asset, String> {
            let text = asset.text()?.to_uppercase();
            Ok(asset.with_text(text))
        }
    }

    struct Fail;

    impl Transform for Fail {
        fn name(&self) -> &'static str {
            "fail"
        }

        fn apply(&self, _: Asset) -> Result<Asset, String> {
            Err("boom".into())
        }
    }

    fn asset(name: &str, text: &str) -> Asset {
        Asset {
            source: PathBuf::from("/src").join(name),
            name: PathBuf::from(name),
            contents: text.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_chain_applies_in_order() {
        let chain = TransformChain::new().then(Upper).then(Rename::min("css"));
        assert_eq!(chain.names(), vec!["upper", "rename"]);

        let out = chain.apply(asset("main.scss", "a{}")).unwrap();
        assert_eq!(out.name, PathBuf::from("main.min.css"));
        assert_eq!(out.contents, b"A{}");
    }

    #[test]
    fn test_failing_step_names_itself_and_file() {
        let chain = TransformChain::new().then(Rename::min("js")).then(Fail).then(Upper);
        let err = chain.apply(asset("app.js", "x")).unwrap_err();
        assert_eq!(err.transform, "fail");
        assert_eq!(err.message, "app.min.js: boom");
    }

    #[test]
    fn test_empty_chain_is_copy() {
        let out = TransformChain::new().apply(asset("index.html", "<p>")).unwrap();
        assert_eq!(out, asset("index.html", "<p>"));
    }

    #[test]
    fn test_rename_keeps_directory() {
        let out = Rename::min("css")
            .apply(asset("nested/site.sass", ""))
            .unwrap();
        assert_eq!(out.name, PathBuf::from("nested/site.min.css"));
    }
}
