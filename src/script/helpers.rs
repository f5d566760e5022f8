//! Runtime helpers for lowered syntax.
//!
//! The transpiler references helpers as members of a `babelHelpers` object
//! instead of importing them from a package. The bundle defines that object
//! once, ahead of the module table, when any module uses it.

use std::path::Path;

use super::BundleError;

pub const GLOBAL: &str = "babelHelpers";

pub const SOURCE: &str = include_str!("helpers.js");

/// Helpers defined by [`SOURCE`].
const PROVIDED: &[&str] = &[
    "asyncToGenerator",
    "asyncIterator",
    "objectSpread2",
    "extends",
    "objectDestructuringEmpty",
    "objectWithoutProperties",
    "toPropertyKey",
    "defineProperty",
    "classPrivateFieldInitSpec",
    "classPrivateMethodInitSpec",
    "classPrivateFieldGet2",
    "classPrivateFieldSet2",
    "assertClassBrand",
    "toSetter",
    "classPrivateFieldLooseKey",
    "classPrivateFieldLooseBase",
    "superPropGet",
    "superPropSet",
    "readOnlyError",
    "writeOnlyError",
    "checkInRHS",
    "taggedTemplateLiteral",
];

/// Fail on a helper the bundle runtime does not define.
pub fn check(path: &Path, code: &str) -> Result<(), BundleError> {
    let prefix = format!("{GLOBAL}.");
    for (at, _) in code.match_indices(&prefix) {
        let rest = &code[at + prefix.len()..];
        let end = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '$'))
            .unwrap_or(rest.len());
        let name = &rest[..end];
        if !PROVIDED.contains(&name) {
            return Err(BundleError::MissingHelper {
                path: path.to_path_buf(),
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

pub fn is_used(code: &str) -> bool {
    code.contains(GLOBAL)
}
