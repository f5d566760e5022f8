//! Stylesheet pipeline: Sass → prefixed, minified CSS.
//!
//! Each non-partial `.scss` file under the styles root is an entry. Entries
//! are compiled independently; a broken entry is recorded as a failure and
//! the others still produce output.

mod compile;
mod minify;

pub use compile::compile_sass;
pub use minify::{browser_targets, minify_css};

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;

use crate::asset::SourceSet;
use crate::config::Config;
use crate::core::{TaskSummary, Variant};
use crate::debug;

/// Compile every entry. `Err` only for problems outside a single entry.
pub fn compile_all(config: &Config, variant: Variant) -> Result<TaskSummary> {
    let root = config.styles_src();
    let entries: Vec<PathBuf> = SourceSet::recursive(&root, &["scss"])
        .collect()
        .with_context(|| format!("Failed to scan {}", config.display_path(&root)))?
        .into_iter()
        .filter(|p| !is_partial(p))
        .collect();
    debug!("styles"; "{} entries under {}", entries.len(), config.display_path(&root));

    let targets = browser_targets(&config.styles.targets);
    let source_maps = variant.source_maps() && config.styles.source_maps;

    let results: Vec<_> = entries
        .par_iter()
        .map(|entry| {
            let out = output_path(config, &root, entry);
            let result = build_entry(config, &root, entry, &out, targets, source_maps);
            (entry, result)
        })
        .collect();

    let mut summary = TaskSummary::default();
    for (entry, result) in results {
        match result {
            Ok(written) => summary.written.extend(written),
            Err(err) => summary.push_failure(entry.clone(), format!("{err:#}")),
        }
    }
    Ok(summary)
}

/// `_name.scss` files are only reachable through `@use`/`@import`.
pub fn is_partial(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('_'))
}

/// `src/scss/pages/home.scss` → `app/css/pages/home.min.css`
fn output_path(config: &Config, root: &Path, entry: &Path) -> PathBuf {
    let rel = entry.strip_prefix(root).unwrap_or(entry);
    let stem = entry.file_stem().and_then(|s| s.to_str()).unwrap_or("style");
    config
        .styles_out()
        .join(rel)
        .with_file_name(format!("{stem}{}.css", config.styles.suffix))
}

fn build_entry(
    config: &Config,
    root: &Path,
    entry: &Path,
    out: &Path,
    targets: lightningcss::targets::Targets,
    source_maps: bool,
) -> Result<Vec<PathBuf>> {
    let css = compile_sass(entry, root)?;

    let source_name = entry
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("style.scss")
        .to_string();
    let minified = minify_css(&css, &source_name, targets, source_maps)?;

    if let Some(parent) = out.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let mut written = Vec::with_capacity(2);
    let mut code = minified.code;
    if let Some(map) = minified.map {
        let map_path = append_extension(out, "map");
        let map_name = map_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        code.push_str(&format!("\n/*# sourceMappingURL={map_name} */"));
        fs::write(&map_path, map)
            .with_context(|| format!("Failed to write {}", map_path.display()))?;
        written.push(map_path);
    }
    fs::write(out, code).with_context(|| format!("Failed to write {}", out.display()))?;
    written.insert(0, out.to_path_buf());

    debug!("styles"; "{} -> {}", config.display_path(entry), config.display_path(out));
    Ok(written)
}

/// `main.min.css` → `main.min.css.map`
pub fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}
