//! Bundle emission: module wrappers inside a small runtime.

use std::fmt::Write;
use std::path::Path;

use super::graph::Module;
use super::helpers;
use crate::utils::path::to_slash;

const RUNTIME_HEAD: &str = r#"(function () {
function __export(target, name, get) {
  Object.defineProperty(target, name, { enumerable: true, get: get });
}
function __reexport(target, source) {
  Object.keys(source).forEach(function (key) {
    if (key !== "default" && !Object.prototype.hasOwnProperty.call(target, key)) {
      __export(target, key, function () { return source[key]; });
    }
  });
}
function __interop(mod) {
  return mod && mod.__esModule ? mod : { default: mod };
}
"#;

const RUNTIME_TAIL: &str = r#"];
var __cache = {};
function __load(id) {
  var cached = __cache[id];
  if (cached) return cached.exports;
  var module = __cache[id] = { exports: {} };
  var def = __modules[id];
  def[0].call(module.exports, module, module.exports, function (specifier) {
    var dep = def[1][specifier];
    if (dep === undefined) throw new Error("Cannot find module '" + specifier + "'");
    return __load(dep);
  });
  return module.exports;
}
__load(0);
})();
"#;

/// Concatenate `modules` into one self-executing script.
///
/// Module paths are shown relative to `root` in marker comments.
pub fn emit_bundle(modules: &[Module], root: &Path) -> String {
    let mut out = String::from(RUNTIME_HEAD);
    if modules.iter().any(|m| helpers::is_used(&m.code)) {
        out.push_str(helpers::SOURCE);
    }
    out.push_str("var __modules = [\n");
    for module in modules {
        let rel = module.path.strip_prefix(root).unwrap_or(&module.path);
        let deps = module
            .deps
            .iter()
            .map(|(specifier, id)| {
                let key = serde_json::to_string(specifier).unwrap_or_default();
                format!("{key}: {id}")
            })
            .collect::<Vec<_>>()
            .join(", ");

        let _ = write!(
            out,
            "// {}\n[function (module, exports, require) {{\n{}\n}}, {{{deps}}}],\n",
            to_slash(rel),
            module.code.trim_end()
        );
    }
    out.push_str(RUNTIME_TAIL);
    out
}
