//! Live-reload script injection.

use crate::embed::serve::hotreload_tag;

/// Inject the live-reload script into HTML bodies.
pub fn maybe_inject_hotreload(body: Vec<u8>, content_type: &str) -> Vec<u8> {
    if content_type.starts_with("text/html") {
        inject_hotreload_script(&body)
    } else {
        body
    }
}

/// Inject hotreload script before the last `</body>` tag
fn inject_hotreload_script(content: &[u8]) -> Vec<u8> {
    let script = hotreload_tag();
    let script_bytes = script.as_bytes();

    const PATTERN: &[u8] = b"</body>";

    let pos = content
        .windows(PATTERN.len())
        .rposition(|w| w.eq_ignore_ascii_case(PATTERN))
        .unwrap_or(content.len());

    let mut result = Vec::with_capacity(content.len() + script_bytes.len());
    result.extend_from_slice(&content[..pos]);
    result.extend_from_slice(script_bytes);
    result.extend_from_slice(&content[pos..]);
    result
}
