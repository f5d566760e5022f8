//! Configuration section definitions.
//!
//! Every section derives `Default` with values reproducing the stock
//! pipeline, so `kiln` runs without any config file.

mod cache;
mod images;
mod markup;
mod paths;
mod scripts;
mod serve;
mod styles;

pub use cache::CacheConfig;
pub use images::{
    FontsConfig, ImagesConfig, JpegTarget, OptimizeConfig, WebpConfig, WebpPreset,
};
pub use markup::MarkupConfig;
pub use paths::PathsConfig;
pub use scripts::ScriptsConfig;
pub use serve::ServeConfig;
pub use styles::{BrowserTargets, StylesConfig, parse_version};
