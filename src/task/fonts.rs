//! Font tasks.
//!
//! - `fontgen`: converts every `.ttf` under the fonts directory to `.woff2`
//!   with the configured converter and writes a `@font-face` stylesheet next
//!   to it. Both land in the fonts *source* tree and are removed by Clean.
//!   Glyphs are not subset; the converter keeps the full character set.
//! - `fonts`: copies font files into `assets/fonts`.

use super::{Asset, Outputs, TaskContext, TaskReport, TransformChain, TransformError};
use crate::core::TaskName;
use crate::embed::fonts::{FontFaceVars, font_face_css};
use crate::utils::exec::{Cmd, FilterRule};
use crate::utils::path::display_relative;
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const CONVERT: &str = "ttf2woff2";

/// Converters print one progress line per file.
const CONVERTER_FILTER: FilterRule = FilterRule::new(&["Processing", "Compressed"]);

pub(super) fn run_convert(ctx: &TaskContext<'_>) -> Result<TaskReport, TransformError> {
    let fonts_dir = &ctx.config.paths.fonts;
    let sources = ctx.select(fonts_dir, "**/*.ttf")?;
    let converter = &ctx.config.fonts.converter;

    let stylesheets = sources
        .par_iter()
        .map(|ttf| convert(converter, ttf, fonts_dir))
        .collect::<Result<Vec<_>, _>>()?;

    let mut outputs = Outputs::new();
    for (path, css) in stylesheets {
        outputs.push(path, css);
    }
    outputs.write()?;
    Ok(TaskReport::new(TaskName::FontConvert, sources.len()))
}

/// Run the converter on one font, returning its stylesheet.
fn convert(
    converter: &[String],
    ttf: &Path,
    fonts_dir: &Path,
) -> Result<(PathBuf, String), TransformError> {
    let name = display_relative(ttf, fonts_dir);
    let woff2 = ttf.with_extension("woff2");
    // a leftover from an earlier run must not pass for fresh output
    match fs::remove_file(&woff2) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => {
            return Err(TransformError::io(&woff2, e));
        }
        _ => {}
    }

    Cmd::from_slice(converter)
        .arg(ttf)
        .filter(&CONVERTER_FILTER)
        .run()
        .map_err(|e| TransformError::new(CONVERT, format!("{name}: {e:#}")))?;

    if !woff2.is_file() {
        return Err(TransformError::new(
            CONVERT,
            format!("{name}: converter did not write {}", display_relative(&woff2, fonts_dir)),
        ));
    }

    let stem = ttf
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let css = font_face_css(&FontFaceVars {
        family: &stem,
        file: &stem,
    });
    Ok((ttf.with_extension("css"), css))
}

pub(super) fn run_copy(ctx: &TaskContext<'_>) -> Result<TaskReport, TransformError> {
    let paths = &ctx.config.paths;
    let sources = ctx.select(&paths.fonts, &ctx.config.fonts.pattern)?;

    let chain = TransformChain::new();
    let fonts_dir = paths.fonts_output();
    let mut outputs = Outputs::new();
    for source in &sources {
        let asset = chain.apply(Asset::read(source, &paths.fonts)?)?;
        outputs.push(fonts_dir.join(&asset.name), asset.contents);
    }

    let written = outputs.write()?;
    Ok(TaskReport::new(TaskName::Fonts, written))
}
