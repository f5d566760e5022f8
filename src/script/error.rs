use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("{}: transpile failed: {message}", path.display())]
    Transpile { path: PathBuf, message: String },

    #[error("cannot resolve '{specifier}' from {}", from.display())]
    Unresolved { specifier: String, from: PathBuf },

    #[error("{}: lowered syntax needs the '{name}' helper, which the bundle runtime lacks; raise scripts.target", path.display())]
    MissingHelper { path: PathBuf, name: String },

    #[error("unsupported script target '{0}'")]
    Target(String),

    #[error("minify failed: {0}")]
    Minify(String),
}
