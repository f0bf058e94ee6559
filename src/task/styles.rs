//! Styles task.
//!
//! ```text
//! sass -> prefix -> media-queries -> minify | beautify -> rename (*.min.css)
//! ```
//!
//! Partials (`_name.sass`) are only reachable through imports. Plain `.css`
//! entries skip the compiler. The generated-artifact directory is passed to
//! the compiler as a load path so sprite fragments can be imported.

use super::{
    Asset, Outputs, Rename, TaskContext, TaskReport, Transform, TransformChain, TransformError,
};
use crate::asset::css::{beautify_css, group_media_queries, prefix_css, targets_for};
use crate::asset::minify::minify_css;
use crate::config::section::paths::CSS_OUTPUT;
use crate::core::TaskName;
use crate::log;
use crate::reload::HotReloadMessage;
use crate::utils::exec::{Cmd, FilterRule};
use lightningcss::targets::Targets;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Sass prints deprecation notices on stderr even for successful runs.
const SASS_FILTER: FilterRule = FilterRule::new(&["Deprecation", "More info"]);

pub(super) fn run(ctx: &TaskContext<'_>) -> Result<TaskReport, TransformError> {
    let paths = &ctx.config.paths;
    let entries: Vec<PathBuf> = ctx
        .select(&paths.styles, &ctx.config.styles.pattern)?
        .into_iter()
        .filter(|path| !is_partial(path))
        .collect();

    let chain = chain(ctx)?;
    let assets = entries
        .par_iter()
        .map(|source| chain.apply(Asset::read(source, &paths.styles)?))
        .collect::<Result<Vec<_>, _>>()?;

    let css_dir = paths.css_output();
    let mut outputs = Outputs::new();
    let mut streamed = Vec::with_capacity(assets.len());
    for asset in assets {
        streamed.push(format!("{CSS_OUTPUT}/{}", asset.display_name()));
        outputs.push(css_dir.join(&asset.name), asset.contents);
    }
    let written = outputs.write()?;

    for path in streamed {
        ctx.notify(HotReloadMessage::css(path));
    }
    Ok(TaskReport::new(TaskName::Styles, written))
}

/// Build the stylesheet chain for the context's mode.
pub(super) fn chain<'a>(ctx: &TaskContext<'a>) -> Result<TransformChain<'a>, TransformError> {
    let styles = &ctx.config.styles;
    let targets = targets_for(&styles.browsers)
        .map_err(|e| TransformError::config(format!("styles.browsers: {e}")))?;

    let generated = &ctx.config.paths.generated;
    let load_paths = if generated.is_dir() {
        vec![generated.clone()]
    } else {
        Vec::new()
    };

    let chain = TransformChain::new()
        .then(Sass {
            command: &styles.compiler,
            load_paths,
        })
        .then(Prefix { targets })
        .then(GroupMediaQueries);

    let chain = if ctx.mode.minify() {
        chain.then(Minify {
            targets,
            report: ctx.mode.report_sizes(),
        })
    } else {
        chain.then(Beautify)
    };

    Ok(chain.then(Rename::min("css")))
}

fn is_partial(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('_'))
}

// ============================================================================
// steps
// ============================================================================

/// External Sass compiler reading the entry from stdin.
struct Sass<'a> {
    command: &'a [String],
    load_paths: Vec<PathBuf>,
}

impl Transform for Sass<'_> {
    fn name(&self) -> &'static str {
        "sass"
    }

    fn apply(&self, mut asset: Asset) -> Result<Asset, String> {
        let indented = match asset.extension() {
            Some("css") => return Ok(asset),
            Some("sass") => true,
            _ => false,
        };

        let mut cmd = Cmd::from_slice(self.command).arg("--stdin");
        if indented {
            cmd = cmd.arg("--indented");
        }
        let dirs = asset.source.parent().into_iter();
        for dir in dirs.chain(self.load_paths.iter().map(PathBuf::as_path)) {
            cmd = cmd.arg("--load-path").arg(dir);
        }

        let output = cmd
            .stdin(&asset.contents)
            .filter(&SASS_FILTER)
            .run()
            .map_err(|e| format!("{e:#}"))?;
        let css = String::from_utf8(output.stdout).map_err(|e| e.to_string())?;

        asset.name.set_extension("css");
        Ok(asset.with_text(css))
    }
}

/// Vendor prefixes for the configured browsers.
struct Prefix {
    targets: Targets,
}

impl Transform for Prefix {
    fn name(&self) -> &'static str {
        "prefix"
    }

    fn apply(&self, asset: Asset) -> Result<Asset, String> {
        let css = prefix_css(asset.text()?, &asset.display_name(), self.targets)?;
        Ok(asset.with_text(css))
    }
}

struct GroupMediaQueries;

impl Transform for GroupMediaQueries {
    fn name(&self) -> &'static str {
        "media-queries"
    }

    fn apply(&self, asset: Asset) -> Result<Asset, String> {
        let css = group_media_queries(asset.text()?, &asset.display_name())?;
        Ok(asset.with_text(css))
    }
}

/// Production minification with an optional size report.
struct Minify {
    targets: Targets,
    report: bool,
}

impl Transform for Minify {
    fn name(&self) -> &'static str {
        "minify"
    }

    fn apply(&self, asset: Asset) -> Result<Asset, String> {
        let name = asset.display_name();
        let original = asset.contents.len();
        let css = minify_css(asset.text()?, &name, self.targets)?;
        if self.report {
            log!("styles"; "{name}: {} -> {}", format_size(original), format_size(css.len()));
        }
        Ok(asset.with_text(css))
    }
}

struct Beautify;

impl Transform for Beautify {
    fn name(&self) -> &'static str {
        "beautify"
    }

    fn apply(&self, asset: Asset) -> Result<Asset, String> {
        let css = beautify_css(asset.text()?, &asset.display_name())?;
        Ok(asset.with_text(css))
    }
}

#[allow(clippy::cast_precision_loss)]
fn format_size(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else {
        format!("{:.2} KiB", bytes as f64 / 1024.0)
    }
}
