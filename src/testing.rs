//! In-memory stand-ins for the session bus and the network.

use std::cell::{Cell, RefCell};
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use zbus::zvariant::{OwnedValue, Value};

use crate::bus::{DesktopBus, Metadata, PLAYER_SERVICE};
use crate::error::{BusError, FetchError};
use crate::http::HttpFetch;
use crate::metadata::TRACK_URL_KEY;

/// Smallest byte sequence that passes the JPEG signature check
pub const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00];

fn timeout(call: &'static str) -> BusError {
    BusError::Timeout {
        call,
        timeout: Duration::from_secs(5),
    }
}

pub fn metadata_entry(key: &str, value: Value<'_>) -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert(key.to_string(), OwnedValue::try_from(value).unwrap());
    metadata
}

pub fn track_metadata(track_url: &str) -> Metadata {
    metadata_entry(TRACK_URL_KEY, Value::from(track_url))
}

/// Scripted [`DesktopBus`]. Records every script sent to the shell.
pub struct FakeBus {
    names: RefCell<Option<Vec<String>>>,
    metadata: Box<dyn Fn() -> Option<Metadata>>,
    shell_broken: Cell<bool>,
    scripts: RefCell<Vec<String>>,
}

impl FakeBus {
    fn new(names: Vec<String>, metadata: Box<dyn Fn() -> Option<Metadata>>) -> Self {
        Self {
            names: RefCell::new(Some(names)),
            metadata,
            shell_broken: Cell::new(false),
            scripts: RefCell::new(Vec::new()),
        }
    }

    /// Spotify is running and playing `track_url`
    pub fn playing(track_url: &str) -> Self {
        let track_url = track_url.to_string();
        Self::new(
            vec!["org.freedesktop.DBus".into(), PLAYER_SERVICE.into()],
            Box::new(move || Some(track_metadata(&track_url))),
        )
    }

    /// Spotify is running and reports a single string metadata entry
    pub fn with_metadata(key: &str, value: &str) -> Self {
        let (key, value) = (key.to_string(), value.to_string());
        Self::new(
            vec![PLAYER_SERVICE.into()],
            Box::new(move || Some(metadata_entry(&key, Value::from(value.as_str())))),
        )
    }

    /// Spotify owns its name but the metadata read fails
    pub fn without_metadata() -> Self {
        Self::new(vec![PLAYER_SERVICE.into()], Box::new(|| None))
    }

    /// Spotify is not running
    pub fn player_absent() -> Self {
        Self::new(vec!["org.freedesktop.DBus".into()], Box::new(|| None))
    }

    pub fn with_names(self, names: &[&str]) -> Self {
        self.set_names(names);
        self
    }

    pub fn with_broken_listing(self) -> Self {
        *self.names.borrow_mut() = None;
        self
    }

    pub fn with_broken_shell(self) -> Self {
        self.set_shell_broken(true);
        self
    }

    pub fn set_names(&self, names: &[&str]) {
        *self.names.borrow_mut() = Some(names.iter().map(|n| n.to_string()).collect());
    }

    pub fn set_shell_broken(&self, broken: bool) {
        self.shell_broken.set(broken);
    }

    /// Every script sent to the shell, including rejected ones
    pub fn scripts(&self) -> Vec<String> {
        self.scripts.borrow().clone()
    }
}

impl DesktopBus for FakeBus {
    async fn list_names(&self) -> Result<Vec<String>, BusError> {
        self.names.borrow().clone().ok_or_else(|| timeout("ListNames"))
    }

    async fn player_metadata(&self) -> Result<Metadata, BusError> {
        (self.metadata)().ok_or_else(|| timeout("Metadata"))
    }

    async fn evaluate_script(&self, script: &str) -> Result<(), BusError> {
        self.scripts.borrow_mut().push(script.to_string());
        if self.shell_broken.get() {
            return Err(timeout("evaluateScript"));
        }
        Ok(())
    }
}

enum Download {
    Serve(Vec<u8>),
    Fail,
    /// Writes the bytes, then drops the connection
    Truncate(Vec<u8>),
}

/// Scripted [`HttpFetch`]. Records lookups and downloads separately.
pub struct FakeHttp {
    oembed: Option<String>,
    download: Download,
    lookups: RefCell<Vec<String>>,
    downloads: RefCell<Vec<String>>,
}

impl FakeHttp {
    fn new(download: Download) -> Self {
        Self {
            oembed: None,
            download,
            lookups: RefCell::new(Vec::new()),
            downloads: RefCell::new(Vec::new()),
        }
    }

    pub fn serving_image(bytes: &[u8]) -> Self {
        Self::new(Download::Serve(bytes.to_vec()))
    }

    pub fn failing_download() -> Self {
        Self::new(Download::Fail)
    }

    pub fn truncated_download(bytes: &[u8]) -> Self {
        Self::new(Download::Truncate(bytes.to_vec()))
    }

    /// Body returned by every JSON request; without one they fail with 503
    pub fn with_oembed(mut self, body: &str) -> Self {
        self.oembed = Some(body.to_string());
        self
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.borrow().clone()
    }

    pub fn downloads(&self) -> Vec<String> {
        self.downloads.borrow().clone()
    }
}

impl HttpFetch for FakeHttp {
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        self.lookups.borrow_mut().push(url.to_string());
        let body = self.oembed.as_deref().ok_or_else(|| FetchError::Status {
            url: url.to_string(),
            status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
        })?;
        serde_json::from_str(body).map_err(|e| FetchError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    async fn download_to<W>(&self, url: &str, out: &mut W) -> Result<u64, FetchError>
    where
        W: AsyncWrite + Unpin,
    {
        self.downloads.borrow_mut().push(url.to_string());
        match &self.download {
            Download::Serve(bytes) => {
                out.write_all(bytes).await?;
                out.flush().await?;
                Ok(bytes.len() as u64)
            }
            Download::Fail => Err(FetchError::Status {
                url: url.to_string(),
                status: reqwest::StatusCode::NOT_FOUND,
            }),
            Download::Truncate(bytes) => {
                out.write_all(bytes).await?;
                Err(FetchError::Io(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "connection closed mid-body",
                )))
            }
        }
    }
}
