//! Module graph discovery.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use oxc::transformer::TransformOptions;
use rustc_hash::FxHashMap;

use super::rewrite::rewrite_module;
use super::{BundleError, helpers, resolve::resolve, transpile::transpile};
use crate::debug;

/// One bundled module. Index 0 is the entry.
#[derive(Debug, Default)]
pub struct Module {
    pub path: PathBuf,
    pub code: String,
    /// Specifier as written → module index.
    pub deps: Vec<(String, usize)>,
}

pub struct GraphOptions<'a> {
    pub transform: &'a TransformOptions,
    /// Directory names whose modules are bundled as-is.
    pub exclude: &'a [String],
}

/// Breadth-first walk from `entry` over static imports and `require` calls.
pub fn build_graph(entry: &Path, options: &GraphOptions<'_>) -> Result<Vec<Module>, BundleError> {
    let entry = fs::canonicalize(entry).map_err(|source| BundleError::Read {
        path: entry.to_path_buf(),
        source,
    })?;

    let mut modules = vec![Module {
        path: entry.clone(),
        ..Module::default()
    }];
    let mut ids: FxHashMap<PathBuf, usize> = FxHashMap::default();
    ids.insert(entry, 0);
    let mut queue = VecDeque::from([0]);

    while let Some(id) = queue.pop_front() {
        let path = modules[id].path.clone();
        let source = fs::read_to_string(&path).map_err(|source| BundleError::Read {
            path: path.clone(),
            source,
        })?;

        let vendor = is_excluded(&path, options.exclude);
        let source = if vendor {
            source
        } else {
            let lowered = transpile(&path, &source, options.transform)?;
            helpers::check(&path, &lowered)?;
            lowered
        };
        let rewritten = rewrite_module(&path, &source)?;

        let mut deps = Vec::new();
        for specifier in rewritten.specifiers() {
            let target = match resolve(specifier, &path) {
                Ok(target) => fs::canonicalize(&target).unwrap_or(target),
                Err(err) if vendor && !rewritten.imports.iter().any(|s| s == specifier) => {
                    // optional requires inside packages, e.g. node builtins
                    debug!("scripts"; "skipping {err}");
                    continue;
                }
                Err(err) => return Err(err),
            };
            let dep = *ids.entry(target).or_insert_with_key(|target| {
                modules.push(Module {
                    path: target.clone(),
                    ..Module::default()
                });
                queue.push_back(modules.len() - 1);
                modules.len() - 1
            });
            deps.push((specifier.to_string(), dep));
        }

        modules[id].code = rewritten.code;
        modules[id].deps = deps;
    }

    Ok(modules)
}

fn is_excluded(path: &Path, exclude: &[String]) -> bool {
    path.components().any(|c| {
        let name = c.as_os_str().to_string_lossy();
        exclude.iter().any(|e| *e == name)
    })
}
