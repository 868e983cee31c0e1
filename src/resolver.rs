//! # Metadata Resolver
//!
//! Turns "whatever Spotify is playing" into a local image file:
//!
//! 1. Read `Metadata` from the player and pull out `xesam:url`
//! 2. Ask Spotify's oEmbed endpoint for the track's `thumbnail_url`
//! 3. Map the thumbnail onto a file in the wallpaper directory
//! 4. Reuse that file if it exists, otherwise download it
//!
//! Every failure along the way resolves to the default artwork instead.

use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::artwork::ArtworkRef;
use crate::bus::DesktopBus;
use crate::cache::ArtworkCache;
use crate::error::{FetchError, ResolveError};
use crate::http::HttpFetch;
use crate::metadata::TrackIdentity;

/// Spotify's oEmbed endpoint; the track URL goes in the `url` query parameter
pub const OEMBED_ENDPOINT: &str = "https://open.spotify.com/oembed";

/// The part of the oEmbed response we use.
#[derive(Debug, Clone, Deserialize)]
pub struct OEmbedResponse {
    /// Cover art image URL
    pub thumbnail_url: String,
}

/// Resolves the playing track to an artwork reference.
///
/// Never fails: errors are logged and produce the cache's default reference.
pub async fn resolve_artwork<B, H>(bus: &B, http: &H, cache: &ArtworkCache) -> ArtworkRef
where
    B: DesktopBus,
    H: HttpFetch,
{
    match try_resolve(bus, http, cache).await {
        Ok(reference) => reference,
        Err(e) => {
            warn!(error = %e, "could not resolve album art, using default");
            cache.default_ref().clone()
        }
    }
}

async fn try_resolve<B, H>(bus: &B, http: &H, cache: &ArtworkCache) -> Result<ArtworkRef, ResolveError>
where
    B: DesktopBus,
    H: HttpFetch,
{
    let metadata = bus.player_metadata().await?;
    let track = TrackIdentity::from_metadata(&metadata)?;
    debug!(track = track.url(), "current track");

    let thumbnail = lookup_thumbnail(http, &track).await?;
    let path = cache.path_for(&thumbnail)?;

    if let Some(hit) = cache.lookup(&path).await {
        debug!(path = %path.display(), "album art already cached");
        return Ok(hit);
    }

    Ok(cache.fetch_and_store(http, &thumbnail, &path).await)
}

/// Asks the oEmbed endpoint for the track's thumbnail URL
async fn lookup_thumbnail<H: HttpFetch>(http: &H, track: &TrackIdentity) -> Result<String, FetchError> {
    let url = oembed_url(track)?;
    let response: OEmbedResponse = http.get_json(url.as_str()).await?;
    Ok(response.thumbnail_url)
}

/// `https://open.spotify.com/oembed?url=<percent-encoded track url>`
fn oembed_url(track: &TrackIdentity) -> Result<Url, FetchError> {
    Url::parse_with_params(OEMBED_ENDPOINT, &[("url", track.url())]).map_err(|e| FetchError::Decode {
        url: OEMBED_ENDPOINT.to_string(),
        reason: e.to_string(),
    })
}
