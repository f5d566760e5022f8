//! Syntax lowering for first-party modules.

use std::path::Path;

use oxc::allocator::Allocator;
use oxc::codegen::Codegen;
use oxc::parser::Parser;
use oxc::semantic::SemanticBuilder;
use oxc::span::SourceType;
use oxc::transformer::{HelperLoaderMode, TransformOptions, Transformer};

use super::BundleError;

/// Options for a target such as `es2015`, validated once per bundle.
///
/// Helpers are referenced through the bundle's `babelHelpers` object rather
/// than imported from `@oxc-project/runtime`.
pub fn transform_options(target: &str) -> Result<TransformOptions, BundleError> {
    let mut options = TransformOptions::from_target(target)
        .map_err(|_| BundleError::Target(target.to_string()))?;
    options.helper_loader.mode = HelperLoaderMode::External;
    Ok(options)
}

/// Whether `target` names a syntax level the transpiler knows.
pub fn is_supported_target(target: &str) -> bool {
    TransformOptions::from_target(target).is_ok()
}

/// Lower `source` to the syntax level of `options`. Module syntax is kept.
pub fn transpile(
    path: &Path,
    source: &str,
    options: &TransformOptions,
) -> Result<String, BundleError> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::mjs()).parse();
    if let Some(err) = ret.errors.first() {
        return Err(BundleError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        });
    }
    let mut program = ret.program;

    let scoping = SemanticBuilder::new()
        .build(&program)
        .semantic
        .into_scoping();
    let ret = Transformer::new(&allocator, path, options).build_with_scoping(scoping, &mut program);
    if let Some(err) = ret.errors.first() {
        return Err(BundleError::Transpile {
            path: path.to_path_buf(),
            message: err.to_string(),
        });
    }

    Ok(Codegen::new().build(&program).code)
}
