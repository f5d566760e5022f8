//! Manifest-driven reference rewriting.

use std::fs;
use std::path::PathBuf;

use rustc_hash::FxHashMap;

use super::{Manifest, RevError, read_manifest};
use crate::asset::SourceSet;
use crate::config::Config;

/// Rewrite every output HTML file. Returns the files that changed.
pub fn rewrite_html(config: &Config) -> Result<Vec<PathBuf>, RevError> {
    let manifest = read_manifest(&config.manifest_path())?;
    let output = config.output_dir();
    let pages = SourceSet::recursive(&output, &["html"])
        .collect()
        .map_err(RevError::io(&output))?;

    let mut changed = Vec::new();
    for page in pages {
        let html = fs::read_to_string(&page).map_err(RevError::io(&page))?;
        let rewritten = rewrite_references(&html, &manifest);
        if rewritten != html {
            fs::write(&page, rewritten).map_err(RevError::io(&page))?;
            changed.push(page);
        }
    }
    Ok(changed)
}

/// Replace manifest keys bounded by non-filename characters.
///
/// One left-to-right pass; at each position the longest key wins, and
/// replaced text is never scanned again.
pub fn rewrite_references(text: &str, manifest: &Manifest) -> String {
    let mut by_first: FxHashMap<u8, Vec<(&str, &str)>> = FxHashMap::default();
    for (from, to) in manifest {
        if let Some(&first) = from.as_bytes().first() {
            by_first.entry(first).or_default().push((from, to));
        }
    }
    for keys in by_first.values_mut() {
        keys.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    }

    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let bounded_before = i == 0 || !is_filename_byte(bytes[i - 1]);
        let hit = bounded_before
            .then(|| by_first.get(&bytes[i]))
            .flatten()
            .and_then(|keys| {
                keys.iter().find(|(from, _)| {
                    let end = i + from.len();
                    bytes[i..].starts_with(from.as_bytes())
                        && (end == bytes.len() || !is_filename_byte(bytes[end]))
                })
            });

        match hit {
            Some((from, to)) => {
                out.extend_from_slice(to.as_bytes());
                i += from.len();
            }
            None => {
                out.push(bytes[i]);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn is_filename_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b'-') || !b.is_ascii()
}
