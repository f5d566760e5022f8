//! URL to filesystem path resolution.

use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;

/// Resolve URL to filesystem path, handling index.html for directories
///
/// Only files inside `serve_root` (after resolving symlinks) are returned.
pub fn resolve_path(url: &str, serve_root: &Path) -> Option<PathBuf> {
    let clean = normalize_url(url);

    if clean.split('/').any(|segment| segment == "..") {
        return None;
    }

    let canonical = serve_root.join(&clean).canonicalize().ok()?;
    let root_canonical = serve_root.canonicalize().ok()?;

    if !canonical.starts_with(&root_canonical) {
        return None;
    }

    if canonical.is_file() {
        return Some(canonical);
    }

    if canonical.is_dir() {
        let index = canonical.join("index.html");
        if index.is_file() {
            return Some(index);
        }
    }

    None
}

/// Path part of a request URL, without query or fragment.
pub fn url_path(url: &str) -> &str {
    url.split(['?', '#']).next().unwrap_or(url)
}

/// Strip query, decode, trim slashes
fn normalize_url(url: &str) -> String {
    let decoded = percent_decode_str(url_path(url))
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();
    decoded.trim_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn site() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("css")).unwrap();
        fs::create_dir_all(dir.path().join("about")).unwrap();
        fs::write(dir.path().join("index.html"), "home").unwrap();
        fs::write(dir.path().join("about/index.html"), "about").unwrap();
        fs::write(dir.path().join("css/main.min.css"), "a{}").unwrap();
        fs::write(dir.path().join("my page.html"), "spaced").unwrap();
        dir
    }

    #[test]
    fn test_directory_index() {
        let dir = site();
        let root = dir.path();
        assert!(resolve_path("/", root).unwrap().ends_with("index.html"));
        assert!(resolve_path("/about/", root).unwrap().ends_with("about/index.html"));
    }

    #[test]
    fn test_query_and_encoding() {
        let dir = site();
        let root = dir.path();
        assert!(resolve_path("/css/main.min.css?v=123", root).is_some());
        assert!(resolve_path("/my%20page.html", root).is_some());
    }

    #[test]
    fn test_rejects_escape_and_missing() {
        let dir = site();
        let root = dir.path();
        assert!(resolve_path("/../secret", root).is_none());
        assert!(resolve_path("/%2e%2e/secret", root).is_none());
        assert!(resolve_path("/nope.html", root).is_none());
    }

    #[test]
    fn test_url_path() {
        assert_eq!(url_path("/__kiln/hotreload.js?t=1"), "/__kiln/hotreload.js");
        assert_eq!(url_path("/a#top"), "/a");
    }
}
