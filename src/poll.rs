//! # Poll Loop
//!
//! Drives the whole daemon. Each tick:
//!
//! 1. Checks whether Spotify owns its bus name
//! 2. Resolves the playing track's art (or picks the default when absent)
//! 3. Applies it if it differs from what the desktop already shows
//!
//! Ticks run back to back on one task, separated by a fixed sleep, and
//! never overlap. There is no exit condition; the process runs until killed.

use std::time::Duration;

use tracing::{debug, warn};

use crate::bus::DesktopBus;
use crate::cache::ArtworkCache;
use crate::http::HttpFetch;
use crate::presence;
use crate::resolver;
use crate::state::WallpaperState;
use crate::wallpaper;

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The wallpaper was changed
    Applied,
    /// The desktop already showed the right image
    Unchanged,
    /// plasmashell rejected the change; it is retried next tick
    ApplyFailed,
}

/// The poll loop and the state it owns.
pub struct PollLoop<B, H> {
    bus: B,
    http: H,
    cache: ArtworkCache,
    state: WallpaperState,
    interval: Duration,
}

impl<B: DesktopBus, H: HttpFetch> PollLoop<B, H> {
    pub fn new(bus: B, http: H, cache: ArtworkCache, interval: Duration) -> Self {
        let state = WallpaperState::new(cache.default_ref().clone());
        Self {
            bus,
            http,
            cache,
            state,
            interval,
        }
    }

    /// Runs ticks forever, sleeping `interval` between them.
    pub async fn run(mut self) {
        loop {
            self.tick().await;
            tokio::time::sleep(self.interval).await;
        }
    }

    /// One detect → resolve → compare → apply cycle.
    pub async fn tick(&mut self) -> TickOutcome {
        self.state.current = if presence::is_present(&self.bus).await {
            resolver::resolve_artwork(&self.bus, &self.http, &self.cache).await
        } else {
            debug!("player not running");
            self.cache.default_ref().clone()
        };

        if !self.state.needs_apply() {
            return TickOutcome::Unchanged;
        }

        let target = self.state.current.clone();
        match wallpaper::apply(&self.bus, &mut self.state, &target).await {
            Ok(()) => TickOutcome::Applied,
            Err(e) => {
                warn!(error = %e, image = %target, "wallpaper not changed, will retry");
                TickOutcome::ApplyFailed
            }
        }
    }
}
