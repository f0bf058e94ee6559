//! SVG minification as a single XML event pass.
//!
//! Drops comments, processing instructions, the XML declaration, `<metadata>`
//! and editor namespaces (Inkscape, Sodipodi, Sketch, Affinity), plus
//! whitespace between elements. Every other element and attribute is written
//! back as it was read.

use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};

/// Namespace prefixes written by editors and ignored by renderers.
const EDITOR_PREFIXES: [&[u8]; 7] = [
    b"inkscape",
    b"sodipodi",
    b"sketch",
    b"serif",
    b"rdf",
    b"cc",
    b"dc",
];

/// Elements whose whitespace-only text is content.
const TEXT_ELEMENTS: [&[u8]; 5] = [b"text", b"tspan", b"textPath", b"title", b"desc"];

pub fn minify_svg(content: &[u8]) -> Result<Vec<u8>, String> {
    let mut reader = Reader::from_reader(content);
    let mut writer = Writer::new(Vec::with_capacity(content.len()));

    let mut depth = 0usize;
    let mut seen_root = false;
    // open elements inside a dropped subtree, and open text elements
    let mut skip = 0usize;
    let mut text = 0usize;
    loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("{e} at byte {}", reader.error_position()))?;
        match event {
            Event::Start(e) => {
                depth += 1;
                seen_root = true;
                if skip > 0 || is_dropped(&e) {
                    skip += 1;
                    continue;
                }
                if is_text_element(&e) {
                    text += 1;
                }
                write(&mut writer, Event::Start(strip_editor_attributes(&e)?))?;
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                if skip > 0 {
                    skip -= 1;
                    continue;
                }
                if TEXT_ELEMENTS.contains(&e.name().as_ref()) {
                    text = text.saturating_sub(1);
                }
                write(&mut writer, Event::End(e))?;
            }
            Event::Empty(e) => {
                seen_root = true;
                if skip > 0 || is_dropped(&e) {
                    continue;
                }
                write(&mut writer, Event::Empty(strip_editor_attributes(&e)?))?;
            }
            Event::Text(e) => {
                let blank = e.iter().all(u8::is_ascii_whitespace);
                if skip == 0 && !(blank && text == 0) {
                    write(&mut writer, Event::Text(e))?;
                }
            }
            Event::Comment(_) | Event::PI(_) | Event::Decl(_) => {}
            Event::Eof => break,
            other => {
                if skip == 0 {
                    write(&mut writer, other)?;
                }
            }
        }
    }

    if !seen_root {
        return Err("no root element".into());
    }
    if depth != 0 {
        return Err(format!("{depth} unclosed element(s)"));
    }
    Ok(writer.into_inner())
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), String> {
    writer.write_event(event).map_err(|e| e.to_string())
}

fn is_dropped(element: &BytesStart<'_>) -> bool {
    let name = element.name();
    name.as_ref() == b"metadata"
        || name
            .prefix()
            .is_some_and(|prefix| EDITOR_PREFIXES.contains(&prefix.as_ref()))
}

fn is_text_element(element: &BytesStart<'_>) -> bool {
    TEXT_ELEMENTS.contains(&element.name().as_ref())
}

/// `prefix:name` attributes and `xmlns:prefix` declarations of editor namespaces.
fn is_editor_attribute(key: &[u8]) -> bool {
    let Some(colon) = key.iter().position(|&b| b == b':') else {
        return false;
    };
    let (prefix, local) = (&key[..colon], &key[colon + 1..]);
    let prefix = if prefix == b"xmlns" { local } else { prefix };
    EDITOR_PREFIXES.contains(&prefix)
}

fn strip_editor_attributes(element: &BytesStart<'_>) -> Result<BytesStart<'static>, String> {
    let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
    let mut stripped = BytesStart::new(name);
    for attr in element.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        if !is_editor_attribute(attr.key.as_ref()) {
            stripped.push_attribute(attr);
        }
    }
    Ok(stripped)
}
