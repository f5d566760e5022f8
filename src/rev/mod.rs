//! Cache busting.
//!
//! ```text
//! app/css/main.min.css ──rev──► app/css/main.min-3f2a9c01bd.css
//!                                 + app/rev.json { "css/main.min.css": "css/main.min-3f2a9c01bd.css" }
//! app/index.html ──rewrite──► references use the hashed names
//! ```

mod error;
mod manifest;
mod rewrite;

pub use error::RevError;
pub use manifest::{Manifest, read_manifest, rev_files};
pub use rewrite::rewrite_html;
