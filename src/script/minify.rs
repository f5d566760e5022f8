//! Whole-bundle minification with oxc.

use std::path::Path;

use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;
use oxc::transformer::EngineTargets;

use super::BundleError;

#[derive(Debug)]
pub struct MinifiedJs {
    pub code: String,
    /// JSON source map, when `map_source` was given.
    pub map: Option<String>,
}

/// Mangle and compress without raising syntax above `target`.
///
/// `map_source` names the unminified input inside the source map.
pub fn minify_js(
    source: &str,
    target: &str,
    map_source: Option<&Path>,
) -> Result<MinifiedJs, BundleError> {
    let target =
        EngineTargets::from_target(target).map_err(|_| BundleError::Target(target.to_string()))?;

    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::cjs()).parse();
    if let Some(err) = ret.errors.first() {
        return Err(BundleError::Minify(err.to_string()));
    }
    let mut program = ret.program;

    let options = MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions {
            target,
            ..CompressOptions::smallest()
        }),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);
    let ret = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            source_map_path: map_source.map(Path::to_path_buf),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program);

    Ok(MinifiedJs {
        code: ret.code,
        map: ret.map.map(|map| map.to_json_string()),
    })
}
