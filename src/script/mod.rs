//! Script bundling.
//!
//! # Pipeline
//!
//! ```text
//! entry ─► graph (resolve + transpile + rewrite per module) ─► emit ─► minify
//! ```
//!
//! First-party modules are lowered to the configured target; packages under
//! excluded directories (`node_modules`, `bower_components`) are bundled as
//! they are.

mod emit;
mod error;
mod graph;
mod helpers;
mod minify;
mod resolve;
mod rewrite;
mod transpile;

pub use error::BundleError;
pub use transpile::is_supported_target;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::core::Variant;
use crate::debug;
use graph::{GraphOptions, build_graph};

/// Bundle the entry into a single minified file.
pub fn bundle(config: &Config, variant: Variant) -> Result<Vec<PathBuf>> {
    let scripts = &config.scripts;
    let entry = config.scripts_entry();
    let out = config.scripts_out();

    let transform = transpile::transform_options(&scripts.target)?;
    let modules = build_graph(
        &entry,
        &GraphOptions {
            transform: &transform,
            exclude: &scripts.exclude,
        },
    )?;
    debug!("scripts"; "{} modules from {}", modules.len(), config.display_path(&entry));

    let bundled = emit::emit_bundle(&modules, &config.root);
    let map_source = variant.source_maps().then(|| PathBuf::from(&scripts.filename));
    let minified = minify::minify_js(&bundled, &scripts.target, map_source.as_deref())?;

    if let Some(parent) = out.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let mut written = vec![out.clone()];
    let mut code = minified.code;
    if let Some(map) = minified.map {
        let map_path = crate::style::append_extension(&out, "map");
        let map_name = map_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        code.push_str(&format!("\n//# sourceMappingURL={map_name}"));
        fs::write(&map_path, map)
            .with_context(|| format!("Failed to write {}", map_path.display()))?;
        written.push(map_path);
    }
    fs::write(&out, code).with_context(|| format!("Failed to write {}", out.display()))?;

    Ok(written)
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
    fn test_bundle_build_variant() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(
            root,
            "src/js/main.js",
            "import { greet } from './greet.js';\nimport lit from 'lit';\ndocument.title = greet(lit.name);\n",
        );
        write(root, "src/js/greet.js", "export const greet = (n) => `hello ${n}`;\n");
        write(root, "node_modules/lit/index.js", "module.exports = { name: 'lit' };\n");

        let config = Config::with_root(root);
        let written = bundle(&config, Variant::Build).unwrap();

        assert_eq!(written, vec![root.join("app/js/main.js")]);
        let code = fs::read_to_string(root.join("app/js/main.js")).unwrap();
        assert!(!code.contains("import "), "{code}");
        assert!(!code.contains("sourceMappingURL"));
        assert!(code.contains("document.title"));
        assert!(!root.join("app/js/main.js.map").exists());
    }

    #[test]
    fn test_bundle_dev_variant_writes_map() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "src/js/main.js", "console.log('dev');\n");

        let config = Config::with_root(root);
        let written = bundle(&config, Variant::Dev).unwrap();

        assert_eq!(written.len(), 2);
        let code = fs::read_to_string(root.join("app/js/main.js")).unwrap();
        assert!(code.ends_with("//# sourceMappingURL=main.js.map"), "{code}");
        assert!(root.join("app/js/main.js.map").exists());
    }

    #[test]
    fn test_modern_syntax_bundles_at_default_target() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(
            root,
            "src/js/main.js",
            "import { Counter } from './counter.js';\nasync function load() { await fetch('/x'); }\nconst base = { a: 1 };\nconst merged = { ...base, y: 2 };\nload().then(() => new Counter().inc(merged.y));\n",
        );
        write(
            root,
            "src/js/counter.js",
            "export class Counter { count = 0; #step = 1; inc(n) { this.count += n * this.#step; return this.count; } }\n",
        );

        let config = Config::with_root(root);
        bundle(&config, Variant::Build).unwrap();

        let code = fs::read_to_string(root.join("app/js/main.js")).unwrap();
        assert!(!code.contains("@oxc-project/runtime"), "{code}");
        assert!(!code.contains("async function"), "{code}");
        assert!(!code.contains("#step"), "{code}");
        // helper runtime is bundled
        assert!(code.contains("Private element is not present on this object"), "{code}");
    }

    #[test]
    fn test_helper_runtime_only_when_needed() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "src/js/main.js", "console.log([1, 2].map((n) => n * 2));\n");

        let config = Config::with_root(root);
        bundle(&config, Variant::Build).unwrap();

        let code = fs::read_to_string(root.join("app/js/main.js")).unwrap();
        assert!(!code.contains("Private element"), "{code}");
    }

    #[test]
    fn test_bundle_error_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "src/js/main.js", "import './missing.js';\n");

        let config = Config::with_root(root);
        assert!(bundle(&config, Variant::Dev).is_err());
        assert!(!root.join("app/js/main.js").exists());
    }
}
