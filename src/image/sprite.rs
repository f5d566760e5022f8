//! SVG stack sprite.
//!
//! Every icon becomes a nested `<svg id="{stem}">`. A style rule hides all of
//! them except the one addressed by the URL fragment, so
//! `sprites.svg#menu` renders the `menu` icon on its own.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};

use crate::asset::SourceSet;
use crate::config::Config;

const STACK_STYLE: &str = ":root>svg{display:none}:root>svg:target{display:block}";

/// Root attributes that do not carry over to the nested icon.
const DROPPED_ATTRS: &[&str] = &["id", "width", "height", "x", "y", "version", "xml:space"];

/// A parsed icon: root attributes and inner markup.
#[derive(Debug, PartialEq)]
struct Icon {
    attrs: Vec<(String, String)>,
    inner: String,
}

/// Assemble the sprite. Returns `None` when there are no icons.
pub fn build_sprite(config: &Config) -> Result<Option<PathBuf>> {
    let dir = config.sprite_src();
    let icons = SourceSet::top_level(&dir, &["svg"])
        .collect()
        .with_context(|| format!("Failed to scan {}", config.display_path(&dir)))?;
    if icons.is_empty() {
        return Ok(None);
    }

    let mut parts = Vec::with_capacity(icons.len());
    for path in &icons {
        let id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .context("icon without a file name")?;
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let icon = parse_icon(&source)
            .with_context(|| format!("Invalid SVG {}", config.display_path(path)))?;
        parts.push((id.to_string(), icon));
    }

    let out = config.sprite_out();
    if let Some(parent) = out.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&out, render(&parts)).with_context(|| format!("Failed to write {}", out.display()))?;
    Ok(Some(out))
}

fn render(icons: &[(String, Icon)]) -> String {
    let mut out = String::from(
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">"#,
    );
    out.push_str("<style>");
    out.push_str(STACK_STYLE);
    out.push_str("</style>");
    for (id, icon) in icons {
        out.push_str(r#"<svg id=""#);
        out.push_str(&escape(id.as_str()));
        out.push('"');
        for (name, value) in &icon.attrs {
            out.push_str(&format!(r#" {name}="{value}""#));
        }
        out.push('>');
        out.push_str(icon.inner.trim());
        out.push_str("</svg>");
    }
    out.push_str("</svg>");
    out
}

fn parse_icon(source: &str) -> Result<Icon> {
    let mut reader = Reader::from_str(source);
    let mut depth = 0usize;
    let mut root: Option<(Vec<(String, String)>, usize)> = None;

    loop {
        let before = reader.buffer_position() as usize;
        match reader.read_event()? {
            Event::Start(e) => {
                if depth == 0 {
                    if e.local_name().as_ref() != b"svg" {
                        bail!("root element is not <svg>");
                    }
                    root = Some((root_attrs(&e)?, reader.buffer_position() as usize));
                }
                depth += 1;
            }
            Event::Empty(e) if depth == 0 => {
                if e.local_name().as_ref() != b"svg" {
                    bail!("root element is not <svg>");
                }
                return Ok(Icon {
                    attrs: root_attrs(&e)?,
                    inner: String::new(),
                });
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if depth == 0
                    && let Some((attrs, start)) = root.take()
                {
                    return Ok(Icon {
                        attrs,
                        inner: source[start..before].to_string(),
                    });
                }
            }
            Event::Eof => bail!("missing <svg> root"),
            _ => {}
        }
    }
}

/// Attributes kept on the nested icon, with `viewBox` guaranteed when the
/// size is known.
fn root_attrs(e: &BytesStart<'_>) -> Result<Vec<(String, String)>> {
    let mut attrs = Vec::new();
    let mut view_box = None;
    let (mut width, mut height) = (None, None);

    for attr in e.attributes() {
        let attr = attr?;
        let name = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = String::from_utf8_lossy(&attr.value).into_owned();
        match name.as_str() {
            "viewBox" => view_box = Some(value),
            "width" => width = Some(value),
            "height" => height = Some(value),
            n if n == "xmlns" || n.starts_with("xmlns:") => {}
            n if DROPPED_ATTRS.contains(&n) => {}
            _ => attrs.push((name, value)),
        }
    }

    let view_box = view_box.or_else(|| {
        let w = parse_length(width.as_deref()?)?;
        let h = parse_length(height.as_deref()?)?;
        Some(format!("0 0 {w} {h}"))
    });
    if let Some(view_box) = view_box {
        attrs.insert(0, ("viewBox".into(), view_box));
    }
    Ok(attrs)
}

/// `"24"`, `"24px"` → `24`
fn parse_length(value: &str) -> Option<f32> {
    value.trim().trim_end_matches("px").parse().ok()
}

/// Whether `path` is the sprite this task writes.
pub fn is_sprite(config: &Config, path: &Path) -> bool {
    path == config.sprite_out()
}
