//! Include directive expansion.
//!
//! ```text
//! @@include('./html/header.html', {"title": "Home"})
//! ```
//!
//! The path is resolved against the including file's directory. The optional
//! JSON object becomes the variable scope of the included file, layered over
//! the scope of its parent. Inside that file `@@title` expands to `Home`.

use std::fs;
use std::path::{Path, PathBuf};

use regex::{Captures, Regex};
use serde_json::{Map, Value};

use super::IncludeError;
use crate::utils::path::clean_path;

type Scope = Map<String, Value>;

/// Reusable directive expander, built once per task.
#[derive(Debug)]
pub struct Includer {
    directive: Regex,
    variable: Regex,
    max_depth: usize,
}

/// A parsed `include(...)` call, starting right after the opening paren.
#[derive(Debug, PartialEq)]
struct Call<'a> {
    path: &'a str,
    args: Option<&'a str>,
    /// Bytes consumed including the closing paren.
    len: usize,
}

impl Includer {
    pub fn new(prefix: &str, max_depth: usize) -> Result<Self, regex::Error> {
        let prefix = regex::escape(prefix);
        Ok(Self {
            directive: Regex::new(&format!(r"(?:{prefix})+include\s*\("))?,
            variable: Regex::new(&format!(r"(?:{prefix})+([A-Za-z_]\w*(?:\.[A-Za-z_]\w*)*)"))?,
            max_depth,
        })
    }

    /// Expand a page with an empty variable scope.
    pub fn render_file(&self, path: &Path) -> Result<String, IncludeError> {
        let mut stack = Vec::new();
        self.render(path, &Scope::new(), &mut stack)
    }

    fn render(
        &self,
        path: &Path,
        scope: &Scope,
        stack: &mut Vec<PathBuf>,
    ) -> Result<String, IncludeError> {
        let source = fs::read_to_string(path).map_err(|source| IncludeError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let key = fs::canonicalize(path).unwrap_or_else(|_| clean_path(path));

        if stack.contains(&key) {
            let chain = stack
                .iter()
                .chain(std::iter::once(&key))
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(IncludeError::Cycle { chain });
        }
        if stack.len() > self.max_depth {
            return Err(IncludeError::TooDeep {
                file: path.to_path_buf(),
                max: self.max_depth,
            });
        }

        stack.push(key);
        let result = self.expand(&source, path, scope, stack);
        stack.pop();
        result
    }

    fn expand(
        &self,
        source: &str,
        file: &Path,
        scope: &Scope,
        stack: &mut Vec<PathBuf>,
    ) -> Result<String, IncludeError> {
        let base = file.parent().unwrap_or(Path::new(""));

        // Substituted text is never scanned for directives.
        let mut out = String::with_capacity(source.len());
        let mut cursor = 0;
        while let Some(m) = self.directive.find_at(source, cursor) {
            let line = source[..m.start()].matches('\n').count() + 1;
            let call = parse_call(&source[m.end()..]).map_err(|reason| IncludeError::Syntax {
                file: file.to_path_buf(),
                line,
                reason,
            })?;

            let mut child = scope.clone();
            if let Some(args) = call.args {
                let args: Scope = serde_json::from_str(&self.substitute(args, scope)).map_err(
                    |source| IncludeError::Arguments {
                        file: file.to_path_buf(),
                        line,
                        source,
                    },
                )?;
                child.extend(args);
            }

            out.push_str(&self.substitute(&source[cursor..m.start()], scope));
            let target = clean_path(&base.join(self.substitute(call.path, scope)));
            out.push_str(&self.render(&target, &child, stack)?);
            cursor = m.end() + call.len;
        }
        out.push_str(&self.substitute(&source[cursor..], scope));
        Ok(out)
    }

    /// Replace `@@name` references that resolve in `scope`.
    fn substitute(&self, source: &str, scope: &Scope) -> String {
        if scope.is_empty() {
            return source.to_string();
        }
        self.variable
            .replace_all(source, |caps: &Captures| {
                let whole = &caps[0];
                let name = &caps[1];
                if name == "include" {
                    return whole.to_string();
                }
                lookup(scope, name).unwrap_or_else(|| whole.to_string())
            })
            .into_owned()
    }
}

/// Resolve a dotted name, longest matching path first.
///
/// `@@file.html` with `file = "index"` yields `index.html`.
fn lookup(scope: &Scope, name: &str) -> Option<String> {
    let segments: Vec<&str> = name.split('.').collect();
    (1..=segments.len()).rev().find_map(|n| {
        let (head, rest) = segments.split_at(n);
        let mut value = scope.get(head[0])?;
        for key in &head[1..] {
            value = value.get(key)?;
        }
        let mut text = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        for segment in rest {
            text.push('.');
            text.push_str(segment);
        }
        Some(text)
    })
}

fn parse_call(input: &str) -> Result<Call<'_>, &'static str> {
    let bytes = input.as_bytes();
    let mut i = skip_ws(bytes, 0);

    let quote = *bytes.get(i).ok_or("unterminated directive")?;
    if quote != b'\'' && quote != b'"' {
        return Err("expected a quoted path");
    }
    let start = i + 1;
    let end = start
        + input[start..]
            .find(quote as char)
            .ok_or("unterminated path string")?;
    let path = &input[start..end];
    if path.trim().is_empty() {
        return Err("empty path");
    }

    i = skip_ws(bytes, end + 1);
    let mut args = None;
    if bytes.get(i) == Some(&b',') {
        i = skip_ws(bytes, i + 1);
        if bytes.get(i) != Some(&b'{') {
            return Err("expected a JSON object after ','");
        }
        let close = matching_brace(bytes, i).ok_or("unbalanced braces in arguments")?;
        args = Some(&input[i..=close]);
        i = skip_ws(bytes, close + 1);
    }

    if bytes.get(i) != Some(&b')') {
        return Err("expected ')'");
    }
    Ok(Call {
        path,
        args,
        len: i + 1,
    })
}

fn skip_ws(bytes: &[u8], mut i: usize) -> usize {
    while bytes.get(i).is_some_and(u8::is_ascii_whitespace) {
        i += 1;
    }
    i
}

/// Index of the brace closing the one at `open`, ignoring braces in strings.
fn matching_brace(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string: Option<u8> = None;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(open) {
        if let Some(quote) = in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == quote {
                in_string = None;
            }
            continue;
        }
        match b {
            b'"' | b'\'' => in_string = Some(b),
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    fn includer() -> Includer {
        Includer::new("@", 32).unwrap()
    }

    #[test]
    fn test_include_replaces_directive_without_residue() {
        let dir = TempDir::new().unwrap();
        let page = write(dir.path(), "index.html", "<p>a</p>\n@@include('./partial.html')\n<p>b</p>");
        write(dir.path(), "partial.html", "<footer>hi</footer>");

        let html = includer().render_file(&page).unwrap();
        assert_eq!(html, "<p>a</p>\n<footer>hi</footer>\n<p>b</p>");
        assert!(!html.contains("include"));
    }

    #[test]
    fn test_single_prefix_and_double_quotes() {
        let dir = TempDir::new().unwrap();
        let page = write(dir.path(), "index.html", r#"[@include( "part.html" )]"#);
        write(dir.path(), "part.html", "x");

        assert_eq!(includer().render_file(&page).unwrap(), "[x]");
    }

    #[test]
    fn test_nested_paths_resolve_relative_to_includer() {
        let dir = TempDir::new().unwrap();
        let page = write(dir.path(), "index.html", "@@include('html/layout/head.html')");
        write(dir.path(), "html/layout/head.html", "<head>@@include('../meta.html')</head>");
        write(dir.path(), "html/meta.html", "<meta>");

        assert_eq!(includer().render_file(&page).unwrap(), "<head><meta></head>");
    }

    #[test]
    fn test_variables_inherit_and_override() {
        let dir = TempDir::new().unwrap();
        let page = write(
            dir.path(),
            "index.html",
            r#"@@include('card.html', {"title": "Home", "count": 3, "meta": {"lang": "en"}})"#,
        );
        write(
            dir.path(),
            "card.html",
            r#"<h1>@@title</h1>@@count @@meta.lang @@include('inner.html', {"title": "Inner"})"#,
        );
        write(dir.path(), "inner.html", "@@title/@@count/@@unknown");

        assert_eq!(
            includer().render_file(&page).unwrap(),
            "<h1>Home</h1>3 en Inner/3/@@unknown"
        );
    }

    #[test]
    fn test_variable_values_are_not_directives() {
        let dir = TempDir::new().unwrap();
        let page = write(
            dir.path(),
            "index.html",
            r#"@@include('card.html', {"body": "@@include('secret.html')"})"#,
        );
        write(dir.path(), "card.html", "<p>@@body</p>");

        assert_eq!(
            includer().render_file(&page).unwrap(),
            "<p>@@include('secret.html')</p>"
        );
    }

    #[test]
    fn test_variable_in_include_path() {
        let dir = TempDir::new().unwrap();
        let page = write(
            dir.path(),
            "index.html",
            r#"@@include('wrap.html', {"file": "nav"})"#,
        );
        write(dir.path(), "wrap.html", "[@@include('@@file.html')]");
        write(dir.path(), "nav.html", "<nav></nav>");

        assert_eq!(includer().render_file(&page).unwrap(), "[<nav></nav>]");
    }

    #[test]
    fn test_top_level_text_untouched() {
        let dir = TempDir::new().unwrap();
        let page = write(dir.path(), "index.html", "mail me@example.com @@year");
        assert_eq!(
            includer().render_file(&page).unwrap(),
            "mail me@example.com @@year"
        );
    }

    #[test]
    fn test_dotted_name_falls_back_to_prefix() {
        let mut scope = Scope::new();
        scope.insert("file".into(), Value::String("index".into()));
        assert_eq!(lookup(&scope, "file.html").as_deref(), Some("index.html"));
        assert_eq!(lookup(&scope, "other.html"), None);
    }

    #[test]
    fn test_cycle_detected() {
        let dir = TempDir::new().unwrap();
        let page = write(dir.path(), "a.html", "@@include('b.html')");
        write(dir.path(), "b.html", "@@include('a.html')");

        let err = includer().render_file(&page).unwrap_err();
        assert!(matches!(err, IncludeError::Cycle { .. }), "{err}");
    }

    #[test]
    fn test_depth_limit() {
        let dir = TempDir::new().unwrap();
        let page = write(dir.path(), "0.html", "@@include('1.html')");
        write(dir.path(), "1.html", "@@include('2.html')");
        write(dir.path(), "2.html", "@@include('3.html')");
        write(dir.path(), "3.html", "end");

        let shallow = Includer::new("@", 2).unwrap();
        assert!(matches!(
            shallow.render_file(&page),
            Err(IncludeError::TooDeep { max: 2, .. })
        ));
        assert_eq!(Includer::new("@", 3).unwrap().render_file(&page).unwrap(), "end");
    }

    #[test]
    fn test_malformed_directive_reports_line() {
        let dir = TempDir::new().unwrap();
        let page = write(dir.path(), "index.html", "ok\n@@include(header.html)");

        match includer().render_file(&page) {
            Err(IncludeError::Syntax { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_parse_call_with_braces_in_strings() {
        let call = parse_call(r#"'a.html', {"x": "}{"} ) tail"#).unwrap();
        assert_eq!(call.path, "a.html");
        assert_eq!(call.args, Some(r#"{"x": "}{"}"#));
        assert_eq!(&r#"'a.html', {"x": "}{"} ) tail"#[call.len..], " tail");
    }
}
