//! Vector sprite: folds `svg/*.svg` into `<symbol>` elements of one document.
//!
//! Presentation attributes (`fill`, `stroke`, `style`) are dropped so icons
//! inherit their color from CSS. Each root `<svg>` is replaced by a
//! `<symbol id="<stem>">` carrying the icon's `viewBox`; prefixed namespace
//! declarations of the icon roots move to the sprite root.

use super::{SpriteOutputs, icon_stem, render_rules, rule_template};
use crate::core::TaskName;
use crate::debug;
use crate::embed::sprite::{VECTOR_RULE, VectorRuleVars};
use crate::task::{TaskContext, TaskReport, TransformError};
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

const TRANSFORM: &str = "svg-sprite";

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

const STRIPPED_ATTRIBUTES: [&[u8]; 3] = [b"fill", b"stroke", b"style"];

/// One icon converted to a symbol.
#[derive(Debug, Clone, PartialEq)]
struct Symbol {
    id: String,
    view_box: String,
    width: f64,
    height: f64,
    /// `xmlns:<prefix>` declarations of the icon's root, as (prefix, uri).
    namespaces: Vec<(String, String)>,
    /// Serialized children of the icon's root element.
    body: String,
}

impl Symbol {
    fn load(path: &Path) -> Result<Self, TransformError> {
        let source = fs::read_to_string(path).map_err(|e| TransformError::io(path, e))?;
        let id = icon_stem(path);
        symbolize(&id, &source)
            .map_err(|e| TransformError::new(TRANSFORM, format!("{id}.svg: {e}")))
    }

    fn to_xml(&self) -> String {
        format!(
            r#"<symbol id="{}" viewBox="{}">{}</symbol>"#,
            escape(self.id.as_str()),
            escape(self.view_box.as_str()),
            self.body
        )
    }
}

pub fn run(ctx: &TaskContext<'_>) -> Result<TaskReport, TransformError> {
    let sprites = &ctx.config.sprites;
    let template = rule_template(sprites.svg_css_template.as_deref(), VECTOR_RULE)?;

    let dir = ctx.config.paths.vector_sprite_dir();
    let sources = ctx.select(&dir, "*.svg")?;
    if sources.is_empty() {
        debug!("svg-sprite"; "no icons in {}", dir.display());
        return Ok(TaskReport::new(TaskName::SvgSprite, 0));
    }

    let symbols = sources
        .par_iter()
        .map(|path| Symbol::load(path))
        .collect::<Result<Vec<_>, _>>()?;

    let generated = &ctx.config.paths.generated;
    let outputs = SpriteOutputs::new(generated, "sprite.svg", "_sprite-svg.scss");
    let image_url = outputs.image_url();

    let (document, stylesheet) = rayon::join(
        || document(&symbols),
        || {
            let rules: Vec<_> = symbols
                .iter()
                .map(|symbol| VectorRuleVars {
                    name: format!("{}{}", sprites.class_prefix, symbol.id),
                    id: symbol.id.clone(),
                    width: symbol.width,
                    height: symbol.height,
                    image: image_url.clone(),
                })
                .collect();
            render_rules(&template, &rules)
        },
    );

    let written = outputs.write(document.into_bytes(), stylesheet)?;
    Ok(TaskReport::new(TaskName::SvgSprite, written))
}

fn document(symbols: &[Symbol]) -> String {
    // first declaration of a prefix wins
    let mut namespaces = BTreeMap::new();
    for (prefix, uri) in symbols.iter().flat_map(|s| &s.namespaces) {
        namespaces.entry(prefix.as_str()).or_insert(uri.as_str());
    }
    if symbols.iter().any(|s| s.body.contains("xlink:")) {
        namespaces.entry("xlink").or_insert(XLINK_NS);
    }

    let mut out = format!(r#"<svg xmlns="{SVG_NS}""#);
    for (prefix, uri) in namespaces {
        out.push_str(&format!(r#" xmlns:{prefix}="{}""#, escape(uri)));
    }
    out.push_str(r#" style="display:none" aria-hidden="true">"#);
    for symbol in symbols {
        out.push_str(&symbol.to_xml());
    }
    out.push_str("</svg>\n");
    out
}

/// Convert one icon document into a symbol.
fn symbolize(id: &str, source: &str) -> Result<Symbol, String> {
    // escaped `>` is valid XML but needlessly verbose inside symbols
    let source = source.replace("&gt;", ">");

    let mut reader = Reader::from_str(&source);
    reader.config_mut().trim_text(true);
    let mut writer = Writer::new(Vec::new());

    let mut depth = 0usize;
    let mut view_box = None;
    let mut namespaces = Vec::new();
    loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("{e} at byte {}", reader.error_position()))?;
        match event {
            Event::Start(e) => {
                if depth == 0 {
                    view_box = Some(root_view_box(&reader, &e)?);
                    namespaces = root_namespaces(&reader, &e)?;
                } else {
                    write(&mut writer, Event::Start(strip_paint(&e)?))?;
                }
                depth += 1;
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                if depth > 0 {
                    write(&mut writer, Event::End(e))?;
                }
            }
            Event::Empty(e) => {
                if depth == 0 {
                    view_box = Some(root_view_box(&reader, &e)?);
                    namespaces = root_namespaces(&reader, &e)?;
                } else {
                    write(&mut writer, Event::Empty(strip_paint(&e)?))?;
                }
            }
            Event::Decl(_) | Event::Comment(_) | Event::DocType(_) | Event::PI(_) => {}
            Event::Eof => break,
            other => {
                if depth > 0 {
                    write(&mut writer, other)?;
                }
            }
        }
    }

    let view_box = view_box.ok_or("no root element")?;
    let (width, height) = view_box_size(&view_box)?;
    let body = String::from_utf8(writer.into_inner()).map_err(|e| e.to_string())?;
    Ok(Symbol {
        id: id.to_string(),
        view_box,
        width,
        height,
        namespaces,
        body,
    })
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), String> {
    writer.write_event(event).map_err(|e| e.to_string())
}

/// Copy of `element` without presentation attributes.
fn strip_paint(element: &BytesStart<'_>) -> Result<BytesStart<'static>, String> {
    let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
    let mut stripped = BytesStart::new(name);
    for attr in element.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        if STRIPPED_ATTRIBUTES.iter().any(|name| *name == attr.key.as_ref()) {
            continue;
        }
        stripped.push_attribute(attr);
    }
    Ok(stripped)
}

/// `viewBox` of the root `<svg>`, derived from `width`/`height` when absent.
fn root_view_box(reader: &Reader<&[u8]>, root: &BytesStart<'_>) -> Result<String, String> {
    if root.name().as_ref() != b"svg" {
        return Err("root element is not <svg>".into());
    }
    let attribute = |name: &str| -> Result<Option<String>, String> {
        let Some(attr) = root.try_get_attribute(name).map_err(|e| e.to_string())? else {
            return Ok(None);
        };
        attr.decode_and_unescape_value(reader.decoder())
            .map(|v| Some(v.trim().to_string()))
            .map_err(|e| e.to_string())
    };

    if let Some(view_box) = attribute("viewBox")? {
        return Ok(view_box);
    }
    match (attribute("width")?, attribute("height")?) {
        (Some(w), Some(h)) => Ok(format!(
            "0 0 {} {}",
            w.trim_end_matches("px"),
            h.trim_end_matches("px")
        )),
        _ => Err("<svg> has neither viewBox nor width and height".into()),
    }
}

/// Prefixed namespace declarations on the root element.
fn root_namespaces(
    reader: &Reader<&[u8]>,
    root: &BytesStart<'_>,
) -> Result<Vec<(String, String)>, String> {
    let mut namespaces = Vec::new();
    for attr in root.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        let Some(prefix) = attr.key.as_ref().strip_prefix(b"xmlns:") else {
            continue;
        };
        let uri = attr
            .decode_and_unescape_value(reader.decoder())
            .map_err(|e| e.to_string())?;
        namespaces.push((String::from_utf8_lossy(prefix).into_owned(), uri.into_owned()));
    }
    Ok(namespaces)
}

fn view_box_size(view_box: &str) -> Result<(f64, f64), String> {
    let parts: Vec<f64> = view_box
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect::<Result<_, _>>()
        .map_err(|_| format!("invalid viewBox `{view_box}`"))?;
    match parts.as_slice() {
        [_, _, w, h] => Ok((*w, *h)),
        _ => Err(format!("invalid viewBox `{view_box}`")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::TransformCache;
    use crate::core::BuildMode;
    use crate::task::testing::Project;

    const STAR: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<!-- exported -->
<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 12" fill="#000">
  <g style="opacity:.5" id="layer">
    <path d="M0 0h24v12z" fill="red" stroke="blue"/>
  </g>
  <text>a &gt; b</text>
</svg>
"##;

    fn run_in(project: &Project) -> Result<TaskReport, TransformError> {
        let cache = TransformCache::in_memory();
        let ctx = TaskContext::new(&project.config, BuildMode::Development, &cache);
        run(&ctx)
    }

    #[test]
    fn test_symbolize_strips_paint() {
        let symbol = symbolize("star", STAR).unwrap();
        assert_eq!(symbol.view_box, "0 0 24 12");
        assert_eq!((symbol.width, symbol.height), (24.0, 12.0));
        assert!(!symbol.body.contains("fill="));
        assert!(!symbol.body.contains("stroke="));
        assert!(!symbol.body.contains("style="));
        assert!(symbol.body.contains(r#"<g id="layer">"#));
        assert!(symbol.body.contains(r#"<path d="M0 0h24v12z"/>"#));
        assert!(symbol.body.contains("a > b"));
        assert!(!symbol.body.contains("<svg"));
        assert!(!symbol.body.contains("exported"));
    }

    #[test]
    fn test_view_box_from_size() {
        let symbol = symbolize("dot", r#"<svg width="10px" height="8"><circle r="1"/></svg>"#)
            .unwrap();
        assert_eq!(symbol.view_box, "0 0 10 8");
    }

    #[test]
    fn test_invalid_icons() {
        assert!(symbolize("x", "<svg viewBox=\"0 0 1 1\"><g></svg>").is_err());
        assert!(symbolize("x", "<div/>").is_err());
        assert!(symbolize("x", "<svg><g/></svg>").is_err());
        assert!(symbolize("x", "").is_err());
    }

    #[test]
    fn test_sprite_document() {
        let project = Project::new();
        project.write("src/assets/img/svg/star.svg", STAR);
        project.write(
            "src/assets/img/svg/dot.svg",
            r#"<svg viewBox="0 0 8 8"><circle cx="4" cy="4" r="4" fill="red"/></svg>"#,
        );

        let report = run_in(&project).unwrap();
        assert_eq!(report.written, 2);

        let svg = project.read_string("src/assets/generated/sprite.svg");
        assert!(svg.starts_with(
            r#"<svg xmlns="http://www.w3.org/2000/svg" style="display:none" aria-hidden="true">"#
        ));
        assert!(svg.contains(r#"<symbol id="dot" viewBox="0 0 8 8"><circle cx="4" cy="4" r="4"/></symbol>"#));
        assert!(svg.contains(r#"<symbol id="star" viewBox="0 0 24 12">"#));
        assert_eq!(svg.matches("<svg").count(), 1);

        let scss = project.read_string("src/assets/generated/_sprite-svg.scss");
        assert_eq!(scss.matches(" {").count(), 2);
        assert!(scss.contains(".icon-star {"));
        assert!(scss.contains("width: 24px;"));
    }

    #[test]
    fn test_sprite_declares_icon_namespaces() {
        let project = Project::new();
        project.write(
            "src/assets/img/svg/link.svg",
            r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" viewBox="0 0 4 4"><defs><path id="p" d="M0 0h4"/></defs><use xlink:href="#p"/></svg>"##,
        );
        project.write(
            "src/assets/img/svg/bare.svg",
            r##"<svg viewBox="0 0 4 4"><use xlink:href="#q"/></svg>"##,
        );

        run_in(&project).unwrap();
        let svg = project.read_string("src/assets/generated/sprite.svg");
        assert!(svg.starts_with(
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" style="display:none""#
        ));
        assert_eq!(svg.matches("xmlns:xlink=").count(), 1);
        assert!(svg.contains(r##"<use xlink:href="#p"/>"##));
    }

    #[test]
    fn test_broken_icon_names_file() {
        let project = Project::new();
        project.write("src/assets/img/svg/bad.svg", "<svg><path></svg>");

        let err = run_in(&project).unwrap_err();
        assert_eq!(err.title(), "Error in svg-sprite");
        assert!(err.message.starts_with("bad.svg:"));
        assert!(!project.exists("src/assets/generated/sprite.svg"));
    }

    #[test]
    fn test_no_icons() {
        let project = Project::new();
        assert_eq!(run_in(&project).unwrap().written, 0);
    }
}
