//! Scripts task.
//!
//! ```text
//! include -> minify -> rename (*.min.js)
//! ```

use super::include::expand_includes;
use super::{
    Asset, Outputs, Rename, TaskContext, TaskReport, Transform, TransformChain, TransformError,
};
use crate::asset::minify::minify_js;
use crate::core::TaskName;
use rayon::prelude::*;
use std::path::PathBuf;

pub(super) fn run(ctx: &TaskContext<'_>) -> Result<TaskReport, TransformError> {
    let paths = &ctx.config.paths;
    let entries = ctx.select(&paths.scripts, &ctx.config.scripts.pattern)?;

    let chain = chain(ctx);
    let assets = entries
        .par_iter()
        .map(|source| chain.apply(Asset::read(source, &paths.scripts)?))
        .collect::<Result<Vec<_>, _>>()?;

    let js_dir = paths.js_output();
    let mut outputs = Outputs::new();
    for asset in assets {
        outputs.push(js_dir.join(&asset.name), asset.contents);
    }

    let written = outputs.write()?;
    Ok(TaskReport::new(TaskName::Scripts, written))
}

pub(super) fn chain<'a>(ctx: &TaskContext<'a>) -> TransformChain<'a> {
    TransformChain::new()
        .then(Include {
            include_paths: &ctx.config.scripts.include_paths,
        })
        .then(Minify)
        .then(Rename::min("js"))
}

struct Include<'a> {
    include_paths: &'a [PathBuf],
}

impl Transform for Include<'_> {
    fn name(&self) -> &'static str {
        "include"
    }

    fn apply(&self, asset: Asset) -> Result<Asset, String> {
        let expanded = expand_includes(&asset.source, asset.text()?, self.include_paths)?;
        Ok(asset.with_text(expanded))
    }
}

struct Minify;

impl Transform for Minify {
    fn name(&self) -> &'static str {
        "uglify"
    }

    fn apply(&self, asset: Asset) -> Result<Asset, String> {
        let code = minify_js(asset.text()?)?;
        Ok(asset.with_text(code))
    }
}
