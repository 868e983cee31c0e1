//! # Configuration Module
//!
//! Runtime settings for the wallpaper daemon. There is no configuration file:
//! everything is derived from the user's home directory plus fixed defaults.
//!
//! ## Wallpaper Directory
//! Downloaded album art is stored in:
//! `~/.local/share/wallpapers/`
//!
//! The fallback image is expected at `~/.local/share/wallpapers/default`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::artwork::ArtworkRef;
use crate::error::StartupError;

/// Wallpaper directory, relative to the home directory
const WALLPAPER_SUBDIR: &str = ".local/share/wallpapers";

/// File name of the fallback image inside the wallpaper directory
pub const DEFAULT_ARTWORK_NAME: &str = "default";

/// Delay between two poll cycles
const POLL_INTERVAL_SECS: u64 = 5;

/// Timeout for each HTTP request (oEmbed lookup and image download)
const HTTP_TIMEOUT_SECS: u64 = 15;

/// Timeout for each D-Bus call
const BUS_TIMEOUT_SECS: u64 = 5;

/// Settings shared by every component of the poll cycle.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory where album art is cached (also holds the default image)
    pub cache_dir: PathBuf,
    /// Sleep between poll cycles
    pub poll_interval: Duration,
    /// Per-request HTTP timeout
    pub http_timeout: Duration,
    /// Per-call D-Bus timeout
    pub bus_timeout: Duration,
}

impl Config {
    /// Builds the configuration for the current user.
    ///
    /// Fails only when the home directory cannot be determined.
    pub fn load() -> Result<Self, StartupError> {
        let home = dirs::home_dir().ok_or(StartupError::NoHomeDir)?;
        Ok(Self::with_home(&home))
    }

    /// Builds the configuration rooted at an explicit home directory.
    pub fn with_home(home: &Path) -> Self {
        Self::with_cache_dir(home.join(WALLPAPER_SUBDIR))
    }

    pub fn with_cache_dir(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            poll_interval: Duration::from_secs(POLL_INTERVAL_SECS),
            http_timeout: Duration::from_secs(HTTP_TIMEOUT_SECS),
            bus_timeout: Duration::from_secs(BUS_TIMEOUT_SECS),
        }
    }

    /// Path of the fallback image file
    pub fn default_artwork_path(&self) -> PathBuf {
        self.cache_dir.join(DEFAULT_ARTWORK_NAME)
    }

    /// Reference applied whenever no track artwork is available
    pub fn default_artwork(&self) -> ArtworkRef {
        ArtworkRef::from_path(&self.default_artwork_path())
    }
}
