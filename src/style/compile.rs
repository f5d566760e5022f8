//! Sass compilation.

use std::path::Path;

use anyhow::{Result, anyhow};
use grass::{Options, OutputStyle};

/// Compile one entry to expanded CSS.
///
/// Imports resolve against the entry's own directory first, then the
/// styles root.
pub fn compile_sass(entry: &Path, styles_root: &Path) -> Result<String> {
    let mut options = Options::default().style(OutputStyle::Expanded);
    if let Some(dir) = entry.parent() {
        options = options.load_path(dir);
    }
    options = options.load_path(styles_root);

    grass::from_path(entry, &options).map_err(|err| anyhow!("{err}"))
}
