//! HTTP response handlers.

use std::fs;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tiny_http::{Header, Method, Request, Response, StatusCode};

use super::content::maybe_inject_hotreload;
use crate::embed::serve::hotreload_js;
use crate::utils::mime::{self, types};

/// Respond with a static file, injecting the live-reload script into HTML.
pub fn respond_file(request: Request, path: &Path) -> Result<()> {
    let content_type = mime::from_path(path);

    if is_head_request(&request) {
        return send_head(request, 200, content_type);
    }

    if let Some(range) = get_range_header(&request) {
        return respond_range(request, path, content_type, &range);
    }

    let body = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let body = maybe_inject_hotreload(body, content_type);

    send_body(request, 200, content_type, body)
}

/// Handle Range request for media files (video/audio seeking).
fn respond_range(request: Request, path: &Path, content_type: &str, range: &str) -> Result<()> {
    let file_size = fs::metadata(path)?.len();
    if file_size == 0 {
        return send_body(request, 200, content_type, Vec::new());
    }

    let range = range.strip_prefix("bytes=").unwrap_or(range);
    let (start, end) = parse_range(range, file_size);
    let length = end - start + 1;

    let mut file = fs::File::open(path)?;
    file.seek(SeekFrom::Start(start))?;
    let reader = file.take(length);

    let content_range = format!("bytes {start}-{end}/{file_size}");
    let response = Response::new(
        StatusCode(206),
        vec![
            header("Content-Type", content_type)?,
            header("Content-Range", &content_range)?,
            header("Accept-Ranges", "bytes")?,
        ],
        reader,
        Some(length as usize),
        None,
    );

    request.respond(response)?;
    Ok(())
}

/// Parse Range header value "start-end" into inclusive (start, end) bytes.
///
/// `file_size` must be non-zero.
fn parse_range(range: &str, file_size: u64) -> (u64, u64) {
    let last = file_size - 1;
    let (start, end) = match range.trim().split_once('-') {
        // "0-499"
        Some((s, e)) if !s.is_empty() && !e.is_empty() => {
            let start = s.trim().parse().unwrap_or(0);
            let end: u64 = e.trim().parse().unwrap_or(last);
            (start, end.min(last))
        }
        // "500-"
        Some((s, "")) if !s.is_empty() => (s.trim().parse().unwrap_or(0), last),
        // "-500"
        Some(("", e)) if !e.is_empty() => {
            let suffix: u64 = e.trim().parse().unwrap_or(0);
            (file_size.saturating_sub(suffix), last)
        }
        _ => (0, last),
    };
    (start.min(end), end)
}

/// Extract Range header from request.
fn get_range_header(request: &Request) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|h| h.field.as_str().as_str().eq_ignore_ascii_case("range"))
        .map(|h| h.value.to_string())
}

/// Respond with 404 page (`404.html` in the output root, or plain text).
pub fn respond_not_found(request: Request, serve_root: &Path) -> Result<()> {
    let custom_404 = serve_root.join("404.html");

    if is_head_request(&request) {
        let mime = if custom_404.is_file() { types::HTML } else { types::PLAIN };
        return send_head(request, 404, mime);
    }

    if let Ok(body) = fs::read(&custom_404) {
        let body = maybe_inject_hotreload(body, types::HTML);
        return send_body(request, 404, types::HTML, body);
    }

    send_body(request, 404, types::PLAIN, b"404 Not Found".to_vec())
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    send_body(request, 503, types::PLAIN, b"503 Service Unavailable".to_vec())
}

/// Respond with hotreload.js from memory.
pub fn respond_hotreload_js(request: Request, ws_port: u16) -> Result<()> {
    send_body(request, 200, types::JAVASCRIPT, hotreload_js(ws_port).into_bytes())
}

fn is_head_request(request: &Request) -> bool {
    request.method() == &Method::Head
}

fn send_head(request: Request, status: u16, content_type: &str) -> Result<()> {
    let response = Response::empty(StatusCode(status))
        .with_header(header("Content-Type", content_type)?)
        .with_header(header("Cache-Control", "no-store")?);
    request.respond(response)?;
    Ok(())
}

fn send_body(request: Request, status: u16, content_type: &str, body: Vec<u8>) -> Result<()> {
    let response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(header("Content-Type", content_type)?)
        .with_header(header("Cache-Control", "no-store")?);
    request.respond(response)?;
    Ok(())
}

fn header(key: &str, value: &str) -> Result<Header> {
    Header::from_bytes(key.as_bytes(), value.as_bytes())
        .map_err(|()| anyhow!("invalid header {key}: {value}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range_forms() {
        assert_eq!(parse_range("0-499", 1000), (0, 499));
        assert_eq!(parse_range("500-", 1000), (500, 999));
        assert_eq!(parse_range("-100", 1000), (900, 999));
        assert_eq!(parse_range("0-5000", 1000), (0, 999));
        assert_eq!(parse_range("garbage", 1000), (0, 999));
    }

    #[test]
    fn test_parse_range_start_past_end() {
        assert_eq!(parse_range("2000-", 1000), (999, 999));
    }
}
