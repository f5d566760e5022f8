//! Prefixing and minification with lightningcss.

use anyhow::{Result, anyhow};
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use parcel_sourcemap::SourceMap;

use crate::config::BrowserTargets;
use crate::config::section::parse_version;

/// Minified stylesheet plus its JSON source map, if requested.
#[derive(Debug)]
pub struct MinifiedCss {
    pub code: String,
    pub map: Option<String>,
}

/// Convert configured minimum versions into lightningcss targets.
pub fn browser_targets(config: &BrowserTargets) -> Targets {
    let mut browsers = Browsers::default();
    for (name, version) in config.entries() {
        let version = parse_version(version);
        match name {
            "chrome" => browsers.chrome = version,
            "firefox" => browsers.firefox = version,
            "safari" => browsers.safari = version,
            "edge" => browsers.edge = version,
            "ios_saf" => browsers.ios_saf = version,
            "samsung" => browsers.samsung = version,
            "opera" => browsers.opera = version,
            "android" => browsers.android = version,
            "ie" => browsers.ie = version,
            _ => {}
        }
    }
    Targets::from(browsers)
}

/// Add vendor prefixes for `targets`, merge rules and minify.
///
/// `source_name` names the input inside the source map.
pub fn minify_css(
    source: &str,
    source_name: &str,
    targets: Targets,
    source_map: bool,
) -> Result<MinifiedCss> {
    let mut stylesheet = StyleSheet::parse(
        source,
        ParserOptions {
            filename: source_name.to_string(),
            ..ParserOptions::default()
        },
    )
    .map_err(|err| anyhow!("{err}"))?;

    stylesheet
        .minify(MinifyOptions {
            targets,
            ..MinifyOptions::default()
        })
        .map_err(|err| anyhow!("{err}"))?;

    let mut map = source_map.then(|| {
        let mut map = SourceMap::new("/");
        map.add_source(source_name);
        map
    });
    if let Some(map) = map.as_mut() {
        map.set_source_content(0, source)
            .map_err(|err| anyhow!("source map: {err:?}"))?;
    }

    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            targets,
            source_map: map.as_mut(),
            ..PrinterOptions::default()
        })
        .map_err(|err| anyhow!("{err}"))?;

    let map = match map.as_mut() {
        Some(map) => Some(
            map.to_json(None)
                .map_err(|err| anyhow!("source map: {err:?}"))?,
        ),
        None => None,
    };

    Ok(MinifiedCss {
        code: result.code,
        map,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets() -> Targets {
        browser_targets(&BrowserTargets::default())
    }

    #[test]
    fn test_minify_merges_and_strips() {
        let css = ".a {\n  color: red;\n}\n\n.a {\n  margin: 0px;\n}\n";
        let out = minify_css(css, "main.css", targets(), false).unwrap();
        assert_eq!(out.code, ".a{color:red;margin:0}");
        assert!(out.map.is_none());
    }

    #[test]
    fn test_prefixes_for_old_safari() {
        let css = ".a { user-select: none; }";
        let out = minify_css(css, "main.css", targets(), false).unwrap();
        assert!(out.code.contains("-webkit-user-select:none"), "{}", out.code);
    }

    #[test]
    fn test_source_map_names_input() {
        let out = minify_css("body { color: blue }", "main.scss", targets(), true).unwrap();
        let map = out.map.unwrap();
        assert!(map.contains("main.scss"), "{map}");
    }
}
