//! SVG normalization using usvg.

use anyhow::{Context, Result};

/// Parse and re-serialize without indentation.
///
/// Returns `None` for documents containing text, which would be lost
/// without font support.
pub fn optimize_svg(content: &[u8]) -> Result<Option<Vec<u8>>> {
    if has_text(content) {
        return Ok(None);
    }

    let tree = usvg::Tree::from_data(content, &usvg::Options::default())
        .context("Failed to parse SVG")?;

    let write_options = usvg::WriteOptions {
        indent: usvg::Indent::None,
        ..Default::default()
    };
    Ok(Some(tree.to_string(&write_options).into_bytes()))
}

fn has_text(content: &[u8]) -> bool {
    content.windows(5).any(|w| w == b"<text")
}
