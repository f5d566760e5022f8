//! Task identities.
//!
//! A task is one unit of work with its own inputs and a disjoint output
//! subtree. Pipelines order tasks; the watcher maps changes onto them.

use std::fmt;

/// Artifact flavour for styles and scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Source maps, live-reload notifications.
    Dev,
    /// No maps, no notifications.
    Build,
}

impl Variant {
    pub const fn source_maps(self) -> bool {
        matches!(self, Self::Dev)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    /// Empty the output tree.
    Clean,
    /// Copy fonts verbatim.
    Fonts,
    /// Copy raster/vector images verbatim.
    Images,
    /// Lossy WebP variants of photos.
    Webp,
    /// SVG stack sprite.
    Sprites,
    /// Resolve include directives into pages.
    Html,
    Styles(Variant),
    Scripts(Variant),
    /// In-place recompression of built images.
    ImageMin,
    /// Content-hash renaming + manifest.
    Rev,
    /// Manifest-driven reference rewrite in HTML.
    Rewrite,
}

/// What connected browsers should do once a task finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadKind {
    /// Swap stylesheets in place.
    InjectCss,
    /// Reload the whole page.
    Full,
}

impl TaskKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Clean => "clean",
            Self::Fonts => "fonts",
            Self::Images => "images",
            Self::Webp => "webp",
            Self::Sprites => "sprites",
            Self::Html => "html",
            Self::Styles(_) => "styles",
            Self::Scripts(_) => "scripts",
            Self::ImageMin => "imagemin",
            Self::Rev => "rev",
            Self::Rewrite => "rewrite",
        }
    }

    pub const fn reload_kind(self) -> ReloadKind {
        match self {
            Self::Styles(_) => ReloadKind::InjectCss,
            _ => ReloadKind::Full,
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
