//! Image tasks.
//!
//! - [`webp`]: lossy WebP variants of source photos
//! - [`sprite`]: SVG stack sprite from an icon directory
//! - [`optimize`]: build-only in-place recompression of the output tree

pub mod optimize;
pub mod sprite;
pub mod webp;

pub use optimize::optimize_images;
pub use sprite::build_sprite;
pub use webp::convert_webp;
