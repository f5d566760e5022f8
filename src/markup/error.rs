use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure while resolving include directives for one page.
#[derive(Debug, Error)]
pub enum IncludeError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}:{line}: malformed include directive: {reason}", file.display())]
    Syntax {
        file: PathBuf,
        line: usize,
        reason: &'static str,
    },

    #[error("{}:{line}: include arguments are not a JSON object: {source}", file.display())]
    Arguments {
        file: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("include cycle: {chain}")]
    Cycle { chain: String },

    #[error("includes nested deeper than {max} levels at {}", file.display())]
    TooDeep { file: PathBuf, max: usize },
}
