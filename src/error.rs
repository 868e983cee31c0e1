//! # Error Types
//!
//! Every failure the poll cycle can hit, grouped by where it comes from.
//! Only [`StartupError`] is ever fatal; everything else is logged and the
//! cycle degrades to the default artwork or retries on the next tick.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// A session bus call failed or did not answer in time.
#[derive(Debug, Error)]
pub enum BusError {
    #[error("D-Bus call failed: {0}")]
    Zbus(#[from] zbus::Error),
    #[error("D-Bus call `{call}` timed out after {timeout:?}")]
    Timeout { call: &'static str, timeout: Duration },
}

impl From<zbus::fdo::Error> for BusError {
    fn from(e: zbus::fdo::Error) -> Self {
        Self::Zbus(e.into())
    }
}

/// An HTTP request failed somewhere between connecting and reading the body.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("could not decode response from {url}: {reason}")]
    Decode { url: String, reason: String },
    #[error("failed to write response body: {0}")]
    Io(#[from] std::io::Error),
}

/// The player's metadata did not have the shape we need.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetadataError {
    #[error("metadata has no `{0}` entry")]
    MissingKey(&'static str),
    #[error("metadata entry `{0}` is not a string")]
    NotAString(&'static str),
    #[error("metadata entry `{0}` is empty")]
    Empty(&'static str),
}

/// Storing a thumbnail in the local wallpaper directory failed.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("thumbnail URL `{0}` has no usable file name")]
    UnusableUrl(String),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("downloaded {0} is not an image")]
    NotAnImage(String),
}

/// Anything that stops a track from resolving to a local artwork file.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("could not read player metadata: {0}")]
    Bus(#[from] BusError),
    #[error(transparent)]
    Metadata(#[from] MetadataError),
    #[error("oEmbed lookup failed: {0}")]
    Lookup(#[from] FetchError),
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// plasmashell rejected or never answered the wallpaper script.
#[derive(Debug, Error)]
#[error("failed to change background: {0}")]
pub struct ApplyError(#[from] pub BusError);

/// Conditions that keep the process from starting at all.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("could not determine the home directory")]
    NoHomeDir,
    #[error("failed to connect to the session bus: {0}")]
    Bus(#[from] zbus::Error),
    #[error("failed to create wallpaper directory {path}: {source}")]
    CacheDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}
