//! Artwork references: the `file://` locators handed to plasmashell.

use std::fmt;
use std::path::Path;

/// Locator of a local image, as written into the Plasma wallpaper config.
///
/// Two references are equal iff they point at the same file, which is what
/// the poll loop uses to decide whether the wallpaper needs re-applying.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtworkRef(String);

impl ArtworkRef {
    pub fn from_path(path: &Path) -> Self {
        Self(format!("file://{}", path.display()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtworkRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
