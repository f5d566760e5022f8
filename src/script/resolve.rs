//! Module specifier resolution.
//!
//! Relative specifiers resolve against the importing file. Bare specifiers
//! walk `node_modules` directories upward and honour `package.json`
//! `module`/`main` fields.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::BundleError;
use crate::utils::path::clean_path;

#[derive(Debug, Default, Deserialize)]
struct PackageJson {
    module: Option<String>,
    main: Option<String>,
}

pub fn resolve(specifier: &str, from: &Path) -> Result<PathBuf, BundleError> {
    let resolved = if is_relative(specifier) {
        let base = from.parent().unwrap_or(Path::new(""));
        resolve_file(&clean_path(&base.join(specifier)))
    } else {
        resolve_package(specifier, from)
    };

    resolved.ok_or_else(|| BundleError::Unresolved {
        specifier: specifier.to_string(),
        from: from.to_path_buf(),
    })
}

fn is_relative(specifier: &str) -> bool {
    specifier.starts_with("./") || specifier.starts_with("../") || specifier.starts_with('/')
}

/// `x`, `x.js`, `x.mjs`, `x/index.js`
fn resolve_file(base: &Path) -> Option<PathBuf> {
    if base.is_file() {
        return Some(base.to_path_buf());
    }
    [".js", ".mjs"]
        .iter()
        .map(|ext| {
            let mut name = base.as_os_str().to_owned();
            name.push(ext);
            PathBuf::from(name)
        })
        .chain(std::iter::once(base.join("index.js")))
        .find(|candidate| candidate.is_file())
}

/// `lit`, `lit/decorators.js`, `@scope/pkg`, `@scope/pkg/sub`
fn split_bare(specifier: &str) -> (&str, Option<&str>) {
    let name_end = if specifier.starts_with('@') {
        specifier
            .match_indices('/')
            .nth(1)
            .map_or(specifier.len(), |(i, _)| i)
    } else {
        specifier.find('/').unwrap_or(specifier.len())
    };
    let (name, rest) = specifier.split_at(name_end);
    let sub = rest.strip_prefix('/').filter(|s| !s.is_empty());
    (name, sub)
}

fn resolve_package(specifier: &str, from: &Path) -> Option<PathBuf> {
    let (name, sub) = split_bare(specifier);
    from.ancestors().skip(1).find_map(|dir| {
        let package = dir.join("node_modules").join(name);
        if !package.is_dir() {
            return None;
        }
        match sub {
            Some(sub) => resolve_file(&package.join(sub)),
            None => package_entry(&package),
        }
    })
}

fn package_entry(package: &Path) -> Option<PathBuf> {
    let manifest: PackageJson = fs::read_to_string(package.join("package.json"))
        .ok()
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default();

    [manifest.module, manifest.main]
        .into_iter()
        .flatten()
        .find_map(|field| resolve_file(&clean_path(&package.join(field))))
        .or_else(|| resolve_file(&package.join("index.js")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str, content: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_relative_candidates() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let main = touch(root, "js/main.js", "");
        touch(root, "js/util.js", "");
        touch(root, "js/esm.mjs", "");
        touch(root, "js/widgets/index.js", "");

        assert_eq!(resolve("./util", &main).unwrap(), root.join("js/util.js"));
        assert_eq!(resolve("./util.js", &main).unwrap(), root.join("js/util.js"));
        assert_eq!(resolve("./esm", &main).unwrap(), root.join("js/esm.mjs"));
        assert_eq!(resolve("./widgets", &main).unwrap(), root.join("js/widgets/index.js"));
        assert!(matches!(
            resolve("./nope", &main),
            Err(BundleError::Unresolved { .. })
        ));
    }

    #[test]
    fn test_bare_specifier_walks_up() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let main = touch(root, "src/js/main.js", "");
        touch(
            root,
            "node_modules/lit/package.json",
            r#"{"main": "index.cjs", "module": "lit.mjs"}"#,
        );
        touch(root, "node_modules/lit/lit.mjs", "");
        touch(root, "node_modules/lit/directives/class-map.js", "");
        touch(root, "node_modules/plain/index.js", "");
        touch(root, "node_modules/@scope/pkg/package.json", r#"{"main": "./dist/pkg"}"#);
        touch(root, "node_modules/@scope/pkg/dist/pkg.js", "");

        assert_eq!(resolve("lit", &main).unwrap(), root.join("node_modules/lit/lit.mjs"));
        assert_eq!(
            resolve("lit/directives/class-map", &main).unwrap(),
            root.join("node_modules/lit/directives/class-map.js")
        );
        assert_eq!(resolve("plain", &main).unwrap(), root.join("node_modules/plain/index.js"));
        assert_eq!(
            resolve("@scope/pkg", &main).unwrap(),
            root.join("node_modules/@scope/pkg/dist/pkg.js")
        );
    }

    #[test]
    fn test_split_bare() {
        assert_eq!(split_bare("lit"), ("lit", None));
        assert_eq!(split_bare("lit/html.js"), ("lit", Some("html.js")));
        assert_eq!(split_bare("@a/b"), ("@a/b", None));
        assert_eq!(split_bare("@a/b/c/d"), ("@a/b", Some("c/d")));
    }
}
