//! Images task.
//!
//! Optimizes everything under the images directory except the sprite input
//! folders, plus the image files found in the generated-artifact directory.
//! Optimized bytes are memoized in the [`TransformCache`] by source path and
//! a hash of the content plus the optimizer settings.

use super::{Asset, Outputs, TaskContext, TaskReport, Transform, TransformChain, TransformError};
use crate::cache::{ContentHash, TransformCache};
use crate::config::PipelineConfig;
use crate::config::section::paths::{RASTER_SPRITE_DIR, VECTOR_SPRITE_DIR};
use crate::core::TaskName;
use crate::image::Optimizer;
use crate::reload::HotReloadMessage;
use rayon::prelude::*;
use std::path::{Component, Path, PathBuf};

/// Generated files that belong in the image output.
const GENERATED_IMAGES: &str = "*.{png,jpg,jpeg,gif,svg,webp}";

pub(super) fn run(ctx: &TaskContext<'_>) -> Result<TaskReport, TransformError> {
    let paths = &ctx.config.paths;

    let mut inputs: Vec<(PathBuf, &Path)> = ctx
        .select(&paths.images, &ctx.config.images.pattern)?
        .into_iter()
        .filter(|path| !is_sprite_input(path, &paths.images))
        .map(|path| (path, paths.images.as_path()))
        .collect();
    inputs.extend(
        ctx.select(&paths.generated, GENERATED_IMAGES)?
            .into_iter()
            .map(|path| (path, paths.generated.as_path())),
    );

    let chain = chain(ctx);
    let assets = inputs
        .par_iter()
        .map(|(source, base)| chain.apply(Asset::read(source, base)?))
        .collect::<Result<Vec<_>, _>>()?;

    let img_dir = paths.img_output();
    let mut outputs = Outputs::new();
    for asset in assets {
        outputs.push(img_dir.join(&asset.name), asset.contents);
    }
    let written = outputs.write()?;

    let cache_dir = ctx.cache.dir().unwrap_or(paths.cache.as_path());
    ctx.cache
        .persist()
        .map_err(|e| TransformError::io(cache_dir, e))?;

    if written > 0 {
        ctx.notify(HotReloadMessage::Assets);
    }
    Ok(TaskReport::new(TaskName::Images, written))
}

pub(super) fn chain<'a>(ctx: &TaskContext<'a>) -> TransformChain<'a> {
    let images = &ctx.config.images;
    TransformChain::new().then(Optimize {
        jpeg_quality: images.jpeg_quality,
        cache: images.cache.then_some(ctx.cache),
        config: ctx.config,
    })
}

/// `png/` and `svg/` directly under the images root feed the sprite tasks.
fn is_sprite_input(path: &Path, images: &Path) -> bool {
    let Ok(rel) = path.strip_prefix(images) else {
        return false;
    };
    match rel.components().next() {
        Some(Component::Normal(first)) if rel.components().count() > 1 => {
            first == RASTER_SPRITE_DIR || first == VECTOR_SPRITE_DIR
        }
        _ => false,
    }
}

struct Optimize<'a> {
    jpeg_quality: u8,
    cache: Option<&'a TransformCache>,
    config: &'a PipelineConfig,
}

impl Transform for Optimize<'_> {
    fn name(&self) -> &'static str {
        "imagemin"
    }

    fn apply(&self, mut asset: Asset) -> Result<Asset, String> {
        let ext = asset.extension().unwrap_or_default();
        let optimizer = Optimizer::for_extension(ext, self.jpeg_quality);
        if !optimizer.is_cacheable() {
            return Ok(asset);
        }

        let Some(cache) = self.cache else {
            asset.contents = optimizer.optimize(&asset.contents)?;
            return Ok(asset);
        };

        let key = self.config.root_relative(&asset.source);
        let hash = ContentHash::tagged(&optimizer.settings(), &asset.contents);
        if let Some(hit) = cache.get(&key, hash) {
            asset.contents = (*hit).clone();
            return Ok(asset);
        }

        let optimized = optimizer.optimize(&asset.contents)?;
        cache.insert(key, hash, optimized.clone());
        asset.contents = optimized;
        Ok(asset)
    }
}
