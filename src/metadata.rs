//! Track identity extraction from MPRIS metadata.
//!
//! Metadata values arrive as D-Bus variants of arbitrary type. They are
//! checked here, once, so the rest of the cycle only sees a validated URL.

use zbus::zvariant::Value;

use crate::bus::Metadata;
use crate::error::MetadataError;

/// Metadata key holding the track's canonical URL
pub const TRACK_URL_KEY: &str = "xesam:url";

/// URL that identifies the playing track (e.g. `https://open.spotify.com/track/...`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackIdentity {
    url: String,
}

impl TrackIdentity {
    pub fn from_metadata(metadata: &Metadata) -> Result<Self, MetadataError> {
        let value = metadata
            .get(TRACK_URL_KEY)
            .ok_or(MetadataError::MissingKey(TRACK_URL_KEY))?;

        let url = match unwrap_variant(value) {
            Value::Str(s) => s.as_str().trim(),
            _ => return Err(MetadataError::NotAString(TRACK_URL_KEY)),
        };

        if url.is_empty() {
            return Err(MetadataError::Empty(TRACK_URL_KEY));
        }

        Ok(Self { url: url.to_string() })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Peels `v` wrappers until a concrete value is reached
fn unwrap_variant<'a, 'v>(value: &'a Value<'v>) -> &'a Value<'v> {
    match value {
        Value::Value(inner) => unwrap_variant(inner),
        other => other,
    }
}
