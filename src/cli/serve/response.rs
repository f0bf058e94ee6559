//! HTTP response handlers.

use crate::embed::serve::{HOTRELOAD_JS, HotreloadVars};
use crate::utils::mime::{self, types};
use anyhow::{Context, Result};
use std::{fs, path::Path};
use tiny_http::{Header, Method, Request, Response, StatusCode};

/// Respond with a file from the output root, injecting the live reload client into HTML.
pub fn respond_file(request: Request, path: &Path, ws_port: u16) -> Result<()> {
    let content_type = mime::from_path(path);

    if is_head_request(&request) {
        return send_head(request, 200, content_type);
    }

    let body = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let body = if mime::is_html(content_type) {
        inject_hotreload(body, ws_port)
    } else {
        body
    };

    send_body(request, 200, content_type, body)
}

/// Respond with 404 (`404.html` from the output root when present).
pub fn respond_not_found(request: Request, root: &Path, ws_port: u16) -> Result<()> {
    let custom_404 = root.join("404.html");

    if is_head_request(&request) {
        return send_head(request, 404, types::PLAIN);
    }

    if let Ok(body) = fs::read(&custom_404) {
        return send_body(request, 404, types::HTML, inject_hotreload(body, ws_port));
    }

    send_body(request, 404, types::PLAIN, b"404 Not Found".to_vec())
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    send_body(request, 503, types::PLAIN, b"503 Service Unavailable".to_vec())
}

/// Insert the live reload client before the last `</body>`, or append it.
pub fn inject_hotreload(mut content: Vec<u8>, ws_port: u16) -> Vec<u8> {
    const PATTERN: &[u8] = b"</body>";

    let script = format!(
        "<script>{}</script>",
        HOTRELOAD_JS.render(&HotreloadVars { ws_port })
    );

    match content
        .windows(PATTERN.len())
        .rposition(|w| w.eq_ignore_ascii_case(PATTERN))
    {
        Some(pos) => {
            content.splice(pos..pos, script.into_bytes());
        }
        None => content.extend_from_slice(script.as_bytes()),
    }
    content
}

fn is_head_request(request: &Request) -> bool {
    request.method() == &Method::Head
}

fn send_head(request: Request, status: u16, content_type: &'static str) -> Result<()> {
    let response =
        Response::empty(StatusCode(status)).with_header(content_type_header(content_type)?);
    request.respond(response)?;
    Ok(())
}

fn send_body(
    request: Request,
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
) -> Result<()> {
    let response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(content_type_header(content_type)?)
        .with_header(header("Cache-Control", "no-store")?);
    request.respond(response)?;
    Ok(())
}

fn content_type_header(value: &'static str) -> Result<Header> {
    header("Content-Type", value)
}

fn header(key: &'static str, value: &'static str) -> Result<Header> {
    Header::from_bytes(key, value).map_err(|()| anyhow::anyhow!("invalid header {key}"))
}
