//! Filesystem-level asset handling: source sets, verbatim copies, cleaning.

mod clean;
mod copy;
mod scan;

pub use clean::clean_dir;
pub use copy::copy_set;
pub use scan::SourceSet;
