//! # Session Bus Module
//!
//! Everything the daemon says over D-Bus goes through [`DesktopBus`]:
//!
//! - `org.freedesktop.DBus.ListNames` to see whether Spotify is running
//! - `org.mpris.MediaPlayer2.Player.Metadata` to read the current track
//! - `org.kde.PlasmaShell.evaluateScript` to change the wallpaper
//!
//! [`SessionBus`] is the real implementation. Every call is bounded by a
//! timeout so a hung service cannot stall the poll loop forever.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use zbus::zvariant::OwnedValue;
use zbus::{fdo::DBusProxy, proxy, CacheProperties, Connection};

use crate::error::BusError;

/// Well-known name of the media player we follow
pub const PLAYER_SERVICE: &str = "org.mpris.MediaPlayer2.spotify";

/// Shell service that owns the desktop wallpaper
pub const PLASMA_SERVICE: &str = "org.kde.plasmashell";
pub const PLASMA_PATH: &str = "/PlasmaShell";
pub const PLASMA_INTERFACE: &str = "org.kde.PlasmaShell";
pub const PLASMA_EVALUATE_METHOD: &str = "evaluateScript";

/// MPRIS metadata: `a{sv}` keyed by xesam/mpris field names
pub type Metadata = HashMap<String, OwnedValue>;

/// MPRIS player interface, reduced to the one property we need
#[proxy(
    interface = "org.mpris.MediaPlayer2.Player",
    default_service = "org.mpris.MediaPlayer2.spotify",
    default_path = "/org/mpris/MediaPlayer2"
)]
trait Player {
    /// Metadata of the current track
    #[zbus(property)]
    fn metadata(&self) -> zbus::Result<Metadata>;
}

/// The calls the poll cycle makes on the session bus.
#[allow(async_fn_in_trait)]
pub trait DesktopBus {
    /// Names currently owned on the bus
    async fn list_names(&self) -> Result<Vec<String>, BusError>;

    /// Metadata of the track the player is on right now
    async fn player_metadata(&self) -> Result<Metadata, BusError>;

    /// Runs a script in plasmashell's scripting console
    async fn evaluate_script(&self, script: &str) -> Result<(), BusError>;
}

/// [`DesktopBus`] over a live session bus connection.
pub struct SessionBus {
    connection: Connection,
    timeout: Duration,
}

impl SessionBus {
    /// Connect to the session bus
    pub async fn connect(timeout: Duration) -> zbus::Result<Self> {
        let connection = Connection::session().await?;
        Ok(Self::new(connection, timeout))
    }

    pub fn new(connection: Connection, timeout: Duration) -> Self {
        Self { connection, timeout }
    }
}

/// Awaits `fut`, giving up after `timeout`
async fn bounded<T, E>(
    timeout: Duration,
    call: &'static str,
    fut: impl Future<Output = Result<T, E>>,
) -> Result<T, BusError>
where
    BusError: From<E>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result.map_err(BusError::from),
        Err(_) => Err(BusError::Timeout { call, timeout }),
    }
}

impl DesktopBus for SessionBus {
    async fn list_names(&self) -> Result<Vec<String>, BusError> {
        let names = bounded(self.timeout, "ListNames", async {
            let dbus = DBusProxy::new(&self.connection).await?;
            dbus.list_names().await
        })
        .await?;
        Ok(names.into_iter().map(|name| name.to_string()).collect())
    }

    async fn player_metadata(&self) -> Result<Metadata, BusError> {
        bounded(self.timeout, "Metadata", async {
            // Cached properties would go stale between ticks
            let player = PlayerProxy::builder(&self.connection)
                .cache_properties(CacheProperties::No)
                .build()
                .await?;
            player.metadata().await
        })
        .await
    }

    async fn evaluate_script(&self, script: &str) -> Result<(), BusError> {
        bounded(
            self.timeout,
            "evaluateScript",
            self.connection.call_method(
                Some(PLASMA_SERVICE),
                PLASMA_PATH,
                Some(PLASMA_INTERFACE),
                PLASMA_EVALUATE_METHOD,
                &(script,),
            ),
        )
        .await?;
        Ok(())
    }
}
