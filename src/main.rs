//! # Plasma Album Wallpaper
//!
//! A small background daemon that keeps the KDE Plasma wallpaper showing the
//! album art of whatever Spotify is playing. When Spotify is not running the
//! wallpaper falls back to `~/.local/share/wallpapers/default`.
//!
//! ## How it works
//! Every five seconds the daemon:
//! - checks whether `org.mpris.MediaPlayer2.spotify` is on the session bus
//! - reads the track URL from the player's MPRIS metadata
//! - looks up the cover art through Spotify's oEmbed endpoint
//! - downloads the cover into `~/.local/share/wallpapers/` (once per album)
//! - sends a script to plasmashell if the image differs from the current one
//!
//! ## Architecture
//! - `poll.rs` - The loop tying everything together
//! - `presence.rs` - Is Spotify running?
//! - `resolver.rs` - Track metadata → local artwork file
//! - `metadata.rs` - Typed extraction of the track URL from MPRIS metadata
//! - `cache.rs` - Downloads and stores album art
//! - `wallpaper.rs` - Applies an image through plasmashell's scripting API
//! - `state.rs` - What is shown versus what should be shown
//! - `bus.rs` / `http.rs` - D-Bus and HTTP adapters
//! - `config.rs` - Paths, intervals and timeouts
//!
//! ## Logging
//! Logs go to stderr. Set `RUST_LOG=debug` for per-tick detail.

// --- Module declarations ---

mod artwork;   // file:// artwork references
mod bus;       // Session bus adapter (ListNames, MPRIS metadata, PlasmaShell)
mod cache;     // Local album art store
mod config;    // Runtime settings derived from $HOME
mod error;     // Error types
mod http;      // reqwest-backed HTTP adapter
mod metadata;  // Track URL extraction
mod poll;      // Poll loop
mod presence;  // Player presence detection
mod resolver;  // Track → artwork resolution
mod state;     // Wallpaper state
mod wallpaper; // Plasma wallpaper script

#[cfg(test)]
mod testing;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::bus::SessionBus;
use crate::cache::ArtworkCache;
use crate::config::Config;
use crate::error::StartupError;
use crate::http::HttpClient;
use crate::poll::PollLoop;

/// Entry point. Only startup failures end the process; once the loop is
/// running every error is handled inside the tick that hit it.
#[tokio::main]
async fn main() {
    init_logging();

    if let Err(e) = run().await {
        error!("{e}");
        std::process::exit(1);
    }
}

/// Logs to stderr, `info` unless `RUST_LOG` says otherwise
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<(), StartupError> {
    let config = Config::load()?;

    let cache = ArtworkCache::new(config.cache_dir.clone(), config.default_artwork());
    cache.ensure_dir().await.map_err(|source| StartupError::CacheDir {
        path: config.cache_dir.clone(),
        source,
    })?;

    let default_path = config.default_artwork_path();
    if !default_path.is_file() {
        warn!(path = %default_path.display(), "default wallpaper image is missing");
    }

    let bus = SessionBus::connect(config.bus_timeout).await?;
    let http = HttpClient::new(config.http_timeout)?;

    info!(
        cache_dir = %config.cache_dir.display(),
        interval = ?config.poll_interval,
        "watching for Spotify"
    );

    PollLoop::new(bus, http, cache, config.poll_interval).run().await;
    Ok(())
}
