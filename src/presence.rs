//! Presence detection: is Spotify on the session bus right now?

use tracing::warn;

use crate::bus::{DesktopBus, PLAYER_SERVICE};

/// True iff the player's well-known name is currently owned.
///
/// A failed `ListNames` call counts as "not running"; the next tick asks again.
pub async fn is_present<B: DesktopBus>(bus: &B) -> bool {
    match bus.list_names().await {
        Ok(names) => names.iter().any(|name| name == PLAYER_SERVICE),
        Err(e) => {
            warn!(error = %e, "could not list bus names, treating player as absent");
            false
        }
    }
}
