//! ES module syntax → registry calls.
//!
//! Each module body ends up inside `function (module, exports, require)`.
//! Import declarations are removed and replaced by `require` calls hoisted to
//! the top of the body. Every use of an imported name reads the exporting
//! module's `exports` object, and exports are getters on `exports`, so
//! bindings stay live across modules (including cycles).
//!
//! ```text
//! import { html } from "lit";        __export(exports, "x", function () { return x; });
//! export const x = html`a`;    →     var __m0 = require("lit");
//! export default App;                const x = __m0.html`a`;
//!                                    var __default1 = App;
//! ```

use std::path::Path;

use oxc::allocator::Allocator;
use oxc::ast::ast::{
    Argument, CallExpression, Declaration, ExportDefaultDeclarationKind, Expression,
    ImportDeclarationSpecifier, ObjectProperty, Statement,
};
use oxc::ast_visit::{Visit, walk};
use oxc::parser::Parser;
use oxc::semantic::{Semantic, SemanticBuilder};
use oxc::span::{GetSpan, SourceType, Span};
use oxc::syntax::symbol::SymbolId;
use rustc_hash::{FxHashMap, FxHashSet};

use super::BundleError;

/// A module body ready to be wrapped.
#[derive(Debug, Default)]
pub struct Rewritten {
    pub code: String,
    /// Specifiers of `import`/`export ... from`; all must resolve.
    pub imports: Vec<String>,
    /// Literal `require("...")` specifiers.
    pub requires: Vec<String>,
    /// Had module syntax (otherwise CommonJS, left untouched).
    pub is_esm: bool,
}

impl Rewritten {
    /// Every specifier, imports first, without duplicates.
    pub fn specifiers(&self) -> impl Iterator<Item = &str> {
        let mut seen = Vec::new();
        self.imports
            .iter()
            .chain(&self.requires)
            .map(String::as_str)
            .filter(move |s| {
                if seen.contains(s) {
                    false
                } else {
                    seen.push(*s);
                    true
                }
            })
    }
}

pub fn rewrite_module(path: &Path, source: &str) -> Result<Rewritten, BundleError> {
    let allocator = Allocator::default();
    let mut ret = Parser::new(&allocator, source, SourceType::mjs()).parse();
    if !ret.errors.is_empty() {
        // sloppy-mode CommonJS that is not valid module code
        ret = Parser::new(&allocator, source, SourceType::cjs()).parse();
    }
    if let Some(err) = ret.errors.first() {
        return Err(BundleError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        });
    }
    let program = ret.program;
    let semantic = SemanticBuilder::new().build(&program).semantic;

    // imports first, so exports of imported names see their aliases
    let (imports, rest): (Vec<_>, Vec<_>) = program
        .body
        .iter()
        .partition(|stmt| matches!(stmt, Statement::ImportDeclaration(_)));
    let mut rewriter = Rewriter::default();
    for stmt in imports.into_iter().chain(rest) {
        rewriter.statement(stmt);
    }

    let mut scan = BodyScan::default();
    scan.visit_program(&program);
    rewriter.rebind_imports(&semantic, &scan.shorthand);

    Ok(rewriter.finish(source, scan.requires))
}

/// Literal `require` specifiers and shorthand property positions.
#[derive(Default)]
struct BodyScan {
    requires: Vec<String>,
    /// Start offsets of `{ name }` shorthand values.
    shorthand: FxHashSet<u32>,
}

impl<'a> Visit<'a> for BodyScan {
    fn visit_object_property(&mut self, prop: &ObjectProperty<'a>) {
        if prop.shorthand {
            self.shorthand.insert(prop.value.span().start);
        }
        walk::walk_object_property(self, prop);
    }

    fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
        if let Expression::Identifier(callee) = &call.callee
            && callee.name.as_str() == "require"
            && call.arguments.len() == 1
            && let Some(Argument::StringLiteral(lit)) = call.arguments.first()
        {
            let specifier = lit.value.to_string();
            if !self.requires.contains(&specifier) {
                self.requires.push(specifier);
            }
        }
        walk::walk_call_expression(self, call);
    }
}

#[derive(Default)]
struct Rewriter {
    getters: Vec<String>,
    /// Imported bindings and the member expression each use reads.
    bindings: Vec<(SymbolId, String, String)>,
    aliases: FxHashMap<String, String>,
    hoisted: Vec<String>,
    edits: Vec<(u32, u32, String)>,
    imports: Vec<String>,
    temps: usize,
    is_esm: bool,
}

impl Rewriter {
    fn statement(&mut self, stmt: &Statement<'_>) {
        match stmt {
            Statement::ImportDeclaration(decl) => {
                self.is_esm = true;
                self.remove(decl.span);
                let req = self.require(decl.source.value.as_str());
                let specifiers: &[ImportDeclarationSpecifier<'_>] = match &decl.specifiers {
                    Some(list) => list,
                    None => &[],
                };
                if specifiers.is_empty() {
                    self.hoisted.push(format!("{req};"));
                    return;
                }
                let module = self.temp("m");
                self.hoisted.push(format!("var {module} = {req};"));
                for specifier in specifiers {
                    match specifier {
                        ImportDeclarationSpecifier::ImportSpecifier(s) => {
                            let member = import_member(&module, s.imported.name().as_str());
                            self.bind(s.local.symbol_id(), s.local.name.as_str(), member);
                        }
                        ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => {
                            let interop = self.temp("i");
                            self.hoisted.push(format!("var {interop} = __interop({module});"));
                            self.bind(s.local.symbol_id(), s.local.name.as_str(), format!("{interop}.default"));
                        }
                        ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                            self.hoisted.push(format!("var {} = {module};", s.local.name));
                        }
                    }
                }
            }

            Statement::ExportNamedDeclaration(decl) => {
                self.is_esm = true;
                if let Some(source) = &decl.source {
                    self.remove(decl.span);
                    let req = self.require(source.value.as_str());
                    let module = self.temp("re");
                    self.hoisted.push(format!("var {module} = {req};"));
                    for s in &decl.specifiers {
                        let value = import_member(&module, s.local.name().as_str());
                        self.getter(s.exported.name().as_str(), &value);
                    }
                } else if let Some(declaration) = &decl.declaration {
                    self.edits
                        .push((decl.span.start, declaration.span().start, String::new()));
                    for name in declared_names(declaration) {
                        self.getter(&name, &name);
                    }
                } else {
                    self.remove(decl.span);
                    for s in &decl.specifiers {
                        let local = s.local.name();
                        let value = self
                            .aliases
                            .get(local.as_str())
                            .cloned()
                            .unwrap_or_else(|| local.to_string());
                        self.getter(s.exported.name().as_str(), &value);
                    }
                }
            }

            Statement::ExportDefaultDeclaration(decl) => {
                self.is_esm = true;
                let inner = decl.declaration.span();
                let named = match &decl.declaration {
                    ExportDefaultDeclarationKind::FunctionDeclaration(f) => {
                        f.id.as_ref().map(|id| id.name.to_string())
                    }
                    ExportDefaultDeclarationKind::ClassDeclaration(c) => {
                        c.id.as_ref().map(|id| id.name.to_string())
                    }
                    _ => None,
                };
                match named {
                    Some(name) => {
                        self.edits.push((decl.span.start, inner.start, String::new()));
                        self.getter("default", &name);
                    }
                    None => {
                        let binding = self.temp("default");
                        self.edits
                            .push((decl.span.start, inner.start, format!("var {binding} = ")));
                        self.edits.push((decl.span.end, decl.span.end, ";".into()));
                        self.getter("default", &binding);
                    }
                }
            }

            Statement::ExportAllDeclaration(decl) => {
                self.is_esm = true;
                self.remove(decl.span);
                let req = self.require(decl.source.value.as_str());
                match &decl.exported {
                    Some(name) => {
                        let module = self.temp("ns");
                        self.hoisted.push(format!("var {module} = {req};"));
                        self.getter(name.name().as_str(), &module);
                    }
                    None => self.hoisted.push(format!("__reexport(exports, {req});")),
                }
            }

            _ => {}
        }
    }

    fn bind(&mut self, symbol: SymbolId, local: &str, member: String) {
        self.aliases.insert(local.to_string(), member.clone());
        self.bindings.push((symbol, local.to_string(), member));
    }

    /// Replace every use of an imported name with its member read.
    fn rebind_imports(&mut self, semantic: &Semantic<'_>, shorthand: &FxHashSet<u32>) {
        for (symbol, local, member) in &self.bindings {
            for reference in semantic.symbol_references(*symbol) {
                let span = semantic.nodes().get_node(reference.node_id()).span();
                let replacement = if shorthand.contains(&span.start) {
                    format!("{local}: {member}")
                } else {
                    member.clone()
                };
                self.edits.push((span.start, span.end, replacement));
            }
        }
    }

    fn remove(&mut self, span: Span) {
        self.edits.push((span.start, span.end, String::new()));
    }

    fn require(&mut self, specifier: &str) -> String {
        if !self.imports.iter().any(|s| s == specifier) {
            self.imports.push(specifier.to_string());
        }
        format!("require({})", js_string(specifier))
    }

    fn temp(&mut self, hint: &str) -> String {
        let name = format!("__{hint}{}", self.temps);
        self.temps += 1;
        name
    }

    fn getter(&mut self, exported: &str, value: &str) {
        self.getters.push(format!(
            "__export(exports, {}, function () {{ return {value}; }});",
            js_string(exported)
        ));
    }

    fn finish(mut self, source: &str, requires: Vec<String>) -> Rewritten {
        if !self.is_esm {
            return Rewritten {
                code: source.to_string(),
                imports: Vec::new(),
                requires,
                is_esm: false,
            };
        }

        self.edits.sort_by_key(|(start, end, _)| (*start, *end));
        let mut body = String::with_capacity(source.len());
        let mut cursor = 0usize;
        for (start, end, replacement) in &self.edits {
            let (start, end) = (*start as usize, *end as usize);
            if start < cursor {
                continue;
            }
            body.push_str(&source[cursor..start]);
            body.push_str(replacement);
            cursor = end;
        }
        body.push_str(&source[cursor..]);

        let mut code = String::from("\"use strict\";\n");
        code.push_str("Object.defineProperty(exports, \"__esModule\", { value: true });\n");
        for line in self.getters.iter().chain(&self.hoisted) {
            code.push_str(line);
            code.push('\n');
        }
        code.push_str(&body);

        Rewritten {
            code,
            imports: self.imports,
            requires,
            is_esm: true,
        }
    }
}

fn declared_names(declaration: &Declaration<'_>) -> Vec<String> {
    match declaration {
        Declaration::VariableDeclaration(var) => var
            .declarations
            .iter()
            .flat_map(|d| d.id.get_binding_identifiers())
            .map(|id| id.name.to_string())
            .collect(),
        Declaration::FunctionDeclaration(f) => {
            f.id.iter().map(|id| id.name.to_string()).collect()
        }
        Declaration::ClassDeclaration(c) => c.id.iter().map(|id| id.name.to_string()).collect(),
        _ => Vec::new(),
    }
}

/// `module.name`, going through CommonJS interop for `default`.
fn import_member(module: &str, name: &str) -> String {
    if name == "default" {
        return format!("__interop({module}).default");
    }
    if is_identifier(name) {
        format!("{module}.{name}")
    } else {
        format!("{module}[{}]", js_string(name))
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn js_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{s}\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewrite(source: &str) -> Rewritten {
        rewrite_module(Path::new("test.js"), source).unwrap()
    }

    #[test]
    fn test_imports_hoisted_as_requires() {
        let out = rewrite(
            "console.log(a, b, ns, def);\nimport def, { a, x as b } from './a.js';\nimport * as ns from 'lit';\nimport './side.js';\n",
        );
        assert_eq!(out.imports, vec!["./a.js", "lit", "./side.js"]);
        assert!(out.code.contains("var __m0 = require(\"./a.js\");"), "{}", out.code);
        assert!(out.code.contains("var __i1 = __interop(__m0);"), "{}", out.code);
        assert!(out.code.contains("var ns = __m2;"), "{}", out.code);
        assert!(out.code.contains("require(\"./side.js\");"));
        assert!(out.code.contains("console.log(__m0.a, __m0.x, ns, __i1.default);"), "{}", out.code);
        assert!(!out.code.contains("import "));
        assert!(!out.code.contains("var a "));

        let hoisted = out.code.find("var __m0").unwrap();
        let usage = out.code.find("console.log").unwrap();
        assert!(hoisted < usage);
    }

    #[test]
    fn test_imported_bindings_stay_live() {
        let out = rewrite(
            "import { count, inc } from './counter.js';\ninc();\nconsole.log(count, { count });\nfunction show() { return count; }\nexport { count as current };\n",
        );
        assert!(out.code.contains("__m0.inc();"), "{}", out.code);
        assert!(out.code.contains("console.log(__m0.count, { count: __m0.count });"), "{}", out.code);
        assert!(out.code.contains("return __m0.count;"), "{}", out.code);
        assert!(out.code.contains("__export(exports, \"current\", function () { return __m0.count; });"), "{}", out.code);
    }

    #[test]
    fn test_shadowed_import_name_untouched() {
        let out = rewrite("import { x } from './x.js';\nfunction f(x) { return x + 1; }\nf(x);\n");
        assert!(out.code.contains("function f(x) { return x + 1; }"), "{}", out.code);
        assert!(out.code.contains("f(__m0.x);"), "{}", out.code);
    }

    #[test]
    fn test_exports_become_getters() {
        let out = rewrite(
            "export const x = 1, y = 2;\nexport function f() {}\nlet z = 3;\nexport { z as zed };\nexport default class App {}\n",
        );
        for name in ["x", "y", "f"] {
            assert!(
                out.code.contains(&format!(
                    "__export(exports, \"{name}\", function () {{ return {name}; }});"
                )),
                "{}",
                out.code
            );
        }
        assert!(out.code.contains("__export(exports, \"zed\", function () { return z; });"));
        assert!(out.code.contains("__export(exports, \"default\", function () { return App; });"));
        assert!(out.code.contains("const x = 1, y = 2;"));
        assert!(out.code.contains("class App {}"));
        assert!(!out.code.contains("export "));
    }

    #[test]
    fn test_anonymous_default_and_reexports() {
        let out = rewrite("export default 40 + 2;\nexport * from './all.js';\nexport { a as b } from './one.js';\nexport * as ns from './ns.js';\n");
        assert!(out.code.contains("var __default0 = 40 + 2;"), "{}", out.code);
        assert!(out.code.contains("__reexport(exports, require(\"./all.js\"));"));
        assert!(out.code.contains("return __re1.a;"));
        assert!(out.code.contains("__export(exports, \"ns\", function () { return __ns2; });"));
        assert_eq!(out.imports, vec!["./all.js", "./one.js", "./ns.js"]);
    }

    #[test]
    fn test_commonjs_left_untouched() {
        let source = "var lit = require(\"lit\");\nmodule.exports = function () { return require('./x'); };\n";
        let out = rewrite(source);
        assert!(!out.is_esm);
        assert_eq!(out.code, source);
        assert_eq!(out.requires, vec!["lit", "./x"]);
    }

    #[test]
    fn test_sloppy_commonjs_parses() {
        let out = rewrite("with (obj) { foo(); }\nmodule.exports = 010;\n");
        assert!(!out.is_esm);
    }

    #[test]
    fn test_specifiers_deduplicated() {
        let out = rewrite("import a from 'lit';\nconst b = require('lit');\nconst c = require('./c');\n");
        assert_eq!(out.specifiers().collect::<Vec<_>>(), vec!["lit", "./c"]);
    }
}
