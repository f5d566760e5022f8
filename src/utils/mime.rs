//! Content-Type lookup for the dev server.

use std::path::Path;

/// Content types used by name elsewhere.
pub mod types {
    pub const HTML: &str = "text/html; charset=utf-8";
    pub const PLAIN: &str = "text/plain; charset=utf-8";
    pub const CSS: &str = "text/css; charset=utf-8";
    pub const JAVASCRIPT: &str = "text/javascript; charset=utf-8";
    pub const JSON: &str = "application/json";
    pub const OCTET_STREAM: &str = "application/octet-stream";
}

/// Content type of an output file, by extension (case-insensitive).
pub fn from_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("html" | "htm") => types::HTML,
        Some("css") => types::CSS,
        Some("js" | "mjs") => types::JAVASCRIPT,
        // rev.json and source maps
        Some("json" | "map") => types::JSON,
        Some("txt") => types::PLAIN,
        Some("xml") => "application/xml",

        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",
        Some("ico") => "image/x-icon",

        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("otf") => "font/otf",
        Some("eot") => "application/vnd.ms-fontobject",

        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("mp3") => "audio/mpeg",
        Some("pdf") => "application/pdf",

        _ => types::OCTET_STREAM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_assets() {
        assert_eq!(from_path(Path::new("index.html")), types::HTML);
        assert_eq!(from_path(Path::new("css/main.min.css")), types::CSS);
        assert_eq!(from_path(Path::new("js/main.js")), types::JAVASCRIPT);
        assert_eq!(from_path(Path::new("css/main.min.css.map")), types::JSON);
        assert_eq!(from_path(Path::new("img/sprites.svg")), "image/svg+xml");
        assert_eq!(from_path(Path::new("img/photo.webp")), "image/webp");
        assert_eq!(from_path(Path::new("fonts/inter.woff2")), "font/woff2");
    }

    #[test]
    fn test_extension_case_and_fallback() {
        assert_eq!(from_path(Path::new("img/PHOTO.JPG")), "image/jpeg");
        assert_eq!(from_path(Path::new("LICENSE")), types::OCTET_STREAM);
        assert_eq!(from_path(Path::new("data.xyz")), types::OCTET_STREAM);
    }
}
