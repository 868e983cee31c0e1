//! Wallpaper state owned by the poll loop.

use crate::artwork::ArtworkRef;

/// What the desktop shows versus what it should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WallpaperState {
    /// Best known artwork as of the latest tick
    pub current: ArtworkRef,
    /// Last artwork plasmashell accepted
    pub previous: ArtworkRef,
}

impl WallpaperState {
    /// Starts with the default on both sides, matching a fresh login.
    pub fn new(default: ArtworkRef) -> Self {
        Self {
            current: default.clone(),
            previous: default,
        }
    }

    pub fn needs_apply(&self) -> bool {
        self.current != self.previous
    }
}
