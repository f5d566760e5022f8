//! Page assembly through `@@include` directives.
//!
//! Only top-level pages of the source tree are emitted. Partials live in a
//! sub-directory and reach the output solely by being included.

mod error;
mod include;

pub use error::IncludeError;
pub use include::Includer;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use rayon::prelude::*;

use crate::asset::SourceSet;
use crate::config::Config;

/// Resolve every top-level page into the output root.
///
/// Pages are independent; the first failing page fails the whole task.
pub fn assemble_pages(config: &Config) -> Result<Vec<PathBuf>> {
    let src = config.src_dir();
    let pages = SourceSet::top_level(&src, &["html"])
        .collect()
        .with_context(|| format!("Failed to scan {}", config.display_path(&src)))?;
    let includer = Includer::new(&config.markup.prefix, config.markup.max_depth)?;
    let output = config.output_dir();
    fs::create_dir_all(&output)
        .with_context(|| format!("Failed to create {}", output.display()))?;

    pages
        .par_iter()
        .map(|page| {
            let html = includer
                .render_file(page)
                .with_context(|| format!("Failed to assemble {}", config.display_path(page)))?;
            let name = page.file_name().context("page without file name")?;
            let out = output.join(name);
            fs::write(&out, html).with_context(|| format!("Failed to write {}", out.display()))?;
            Ok(out)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_assemble_top_level_pages_only() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "src/index.html", "<body>@@include('./html/nav.html')</body>");
        write(root, "src/html/nav.html", "<nav>home</nav>");

        let config = Config::with_root(root);
        let written = assemble_pages(&config).unwrap();

        assert_eq!(written, vec![root.join("app/index.html")]);
        assert_eq!(
            fs::read_to_string(root.join("app/index.html")).unwrap(),
            "<body><nav>home</nav></body>"
        );
        assert!(!root.join("app/html").exists());
        assert!(!root.join("app/nav.html").exists());
    }

    #[test]
    fn test_missing_partial_fails_task() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "src/index.html", "@@include('./html/missing.html')");

        let err = assemble_pages(&Config::with_root(root)).unwrap_err();
        assert!(format!("{err:#}").contains("missing.html"));
    }
}
