//! Raster sprite: packs `png/*.png` into one image plus a rule per icon.

use super::pack::{Layout, pack};
use super::{SpriteOutputs, icon_stem, render_rules, rule_template};
use crate::core::TaskName;
use crate::debug;
use crate::embed::sprite::{RASTER_RULE, RasterRuleVars};
use crate::image::raster::encode_png;
use crate::task::{TaskContext, TaskReport, TransformError};
use image::{DynamicImage, RgbaImage, imageops};
use rayon::prelude::*;
use std::fs;
use std::path::Path;

const TRANSFORM: &str = "spritesmith";

struct Icon {
    stem: String,
    image: RgbaImage,
}

impl Icon {
    fn load(path: &Path) -> Result<Self, TransformError> {
        let bytes = fs::read(path).map_err(|e| TransformError::io(path, e))?;
        let stem = icon_stem(path);
        let image = image::load_from_memory(&bytes)
            .map_err(|e| TransformError::new(TRANSFORM, format!("{stem}.png: {e}")))?
            .to_rgba8();
        Ok(Self { stem, image })
    }
}

pub fn run(ctx: &TaskContext<'_>) -> Result<TaskReport, TransformError> {
    let sprites = &ctx.config.sprites;
    let template = rule_template(sprites.css_template.as_deref(), RASTER_RULE)?;

    let dir = ctx.config.paths.raster_sprite_dir();
    let sources = ctx.select(&dir, "*.png")?;
    let icons = sources
        .par_iter()
        .map(|path| Icon::load(path))
        .collect::<Result<Vec<_>, _>>()?;

    let sizes: Vec<_> = icons.iter().map(|i| i.image.dimensions()).collect();
    let Some(layout) = pack(&sizes, sprites.padding) else {
        debug!("sprite"; "no icons in {}", dir.display());
        return Ok(TaskReport::new(TaskName::Sprite, 0));
    };

    let outputs = SpriteOutputs::new(&ctx.config.paths.generated, "sprite.png", "_sprite.scss");
    let rules = rules(&icons, &layout, &sprites.class_prefix, &outputs.image_url());

    let (image, stylesheet) = rayon::join(
        || compose(&icons, &layout),
        || render_rules(&template, &rules),
    );
    let image = image.map_err(|e| TransformError::new(TRANSFORM, format!("sprite.png: {e}")))?;

    let written = outputs.write(image, stylesheet)?;
    debug!("sprite"; "{} icons packed into {}x{}", icons.len(), layout.width, layout.height);
    Ok(TaskReport::new(TaskName::Sprite, written))
}

fn rules(icons: &[Icon], layout: &Layout, prefix: &str, image: &str) -> Vec<RasterRuleVars> {
    icons
        .iter()
        .zip(&layout.placements)
        .map(|(icon, placement)| RasterRuleVars {
            name: format!("{prefix}{}", icon.stem),
            x: placement.x,
            y: placement.y,
            width: icon.image.width(),
            height: icon.image.height(),
            image: image.to_string(),
            total_width: layout.width,
            total_height: layout.height,
        })
        .collect()
}

fn compose(icons: &[Icon], layout: &Layout) -> Result<Vec<u8>, String> {
    let mut canvas = RgbaImage::new(layout.width, layout.height);
    for (icon, placement) in icons.iter().zip(&layout.placements) {
        imageops::replace(
            &mut canvas,
            &icon.image,
            i64::from(placement.x),
            i64::from(placement.y),
        );
    }
    encode_png(&DynamicImage::ImageRgba8(canvas))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::TransformCache;
    use crate::core::BuildMode;
    use crate::task::testing::Project;
    use image::Rgba;

    fn icon_png(size: u32, color: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(size, size, Rgba(color));
        encode_png(&DynamicImage::ImageRgba8(img)).unwrap()
    }

    fn run_in(project: &Project) -> Result<TaskReport, TransformError> {
        let cache = TransformCache::in_memory();
        let ctx = TaskContext::new(&project.config, BuildMode::Production, &cache);
        run(&ctx)
    }

    #[test]
    fn test_two_icons() {
        let project = Project::new();
        project.write("src/assets/img/png/icon-a.png", icon_png(16, [255, 0, 0, 255]));
        project.write("src/assets/img/png/icon-b.png", icon_png(16, [0, 0, 255, 255]));

        let report = run_in(&project).unwrap();
        assert_eq!(report.written, 2);

        let sprite = image::load_from_memory(&project.read("src/assets/generated/sprite.png"))
            .unwrap()
            .to_rgba8();
        assert!(sprite.width() >= 32);
        assert_eq!(sprite.dimensions(), (36, 16));
        assert_eq!(sprite.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
        assert_eq!(sprite.get_pixel(20, 0), &Rgba([0, 0, 255, 255]));
        assert_eq!(sprite.get_pixel(17, 0)[3], 0);

        let scss = project.read_string("src/assets/generated/_sprite.scss");
        let positions: Vec<_> = scss
            .lines()
            .filter_map(|l| l.trim().strip_prefix("background-position: "))
            .collect();
        assert_eq!(positions, vec!["0 0;", "-20px 0;"]);
        assert!(scss.contains(".icon-icon-a {"));
        assert!(scss.contains(r#"url("../img/sprite.png")"#));
    }

    #[test]
    fn test_no_icons_writes_nothing() {
        let project = Project::new();
        project.write("src/assets/img/png/readme.txt", "not an icon");

        let report = run_in(&project).unwrap();
        assert_eq!(report.written, 0);
        assert!(!project.exists("src/assets/generated/sprite.png"));
    }

    #[test]
    fn test_custom_template() {
        let project = Project::with_config("[sprites]\ncss_template = \"tpl/sprite.scss\"\nclass_prefix = \"i-\"");
        project.write("tpl/sprite.scss", "@mixin __NAME__ { background-position: __X__ __Y__; }");
        project.write("src/assets/img/png/home.png", icon_png(8, [0, 0, 0, 255]));

        run_in(&project).unwrap();
        assert_eq!(
            project.read_string("src/assets/generated/_sprite.scss"),
            "@mixin i-home { background-position: 0 0; }\n"
        );
    }

    #[test]
    fn test_missing_custom_template() {
        let project = Project::with_config("[sprites]\ncss_template = \"tpl/missing.scss\"");
        project.write("src/assets/img/png/home.png", icon_png(8, [0, 0, 0, 255]));

        let err = run_in(&project).unwrap_err();
        assert_eq!(err.title(), "Error in config");
        assert!(!project.exists("src/assets/generated/sprite.png"));
    }

    #[test]
    fn test_corrupt_icon() {
        let project = Project::new();
        project.write("src/assets/img/png/bad.png", b"not a png");

        let err = run_in(&project).unwrap_err();
        assert_eq!(err.transform, "spritesmith");
        assert!(err.message.starts_with("bad.png:"));
    }
}
