//! # Artwork Cache
//!
//! Album art is downloaded once into the wallpaper directory and then
//! reused forever. The file name is the last path segment of the thumbnail
//! URL, so the same album always maps to the same file.
//!
//! Downloads go to a hidden `.part` file first and are renamed into place
//! only after the body is complete and looks like an image (JPEG, PNG, GIF
//! or WebP). A file that exists under its final name is therefore always a
//! complete download.

use std::path::{Path, PathBuf};

use reqwest::Url;
use tokio::io::AsyncReadExt;
use tracing::{debug, info, warn};

use crate::artwork::ArtworkRef;
use crate::error::CacheError;
use crate::http::HttpFetch;

/// Local store of downloaded thumbnails.
#[derive(Debug, Clone)]
pub struct ArtworkCache {
    dir: PathBuf,
    default: ArtworkRef,
}

impl ArtworkCache {
    pub fn new(dir: PathBuf, default: ArtworkRef) -> Self {
        Self { dir, default }
    }

    /// Reference used whenever artwork cannot be produced
    pub fn default_ref(&self) -> &ArtworkRef {
        &self.default
    }

    /// Creates the wallpaper directory if needed
    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// Where the thumbnail at `thumbnail_url` is (or will be) stored.
    ///
    /// Query strings and fragments are ignored. URLs without a usable final
    /// path segment are rejected rather than mapped onto the directory itself.
    pub fn path_for(&self, thumbnail_url: &str) -> Result<PathBuf, CacheError> {
        let unusable = || CacheError::UnusableUrl(thumbnail_url.to_string());

        let url = Url::parse(thumbnail_url).map_err(|_| unusable())?;
        let name = url
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .ok_or_else(unusable)?;

        if name == "." || name == ".." || name.contains('\\') {
            return Err(unusable());
        }

        Ok(self.dir.join(name))
    }

    /// Returns the cached reference if `path` already holds a download.
    pub async fn lookup(&self, path: &Path) -> Option<ArtworkRef> {
        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.is_file() => Some(ArtworkRef::from_path(path)),
            _ => None,
        }
    }

    /// Downloads `url` into `path` and returns its reference.
    ///
    /// Any failure yields the default reference; no partial file is left
    /// behind under `path`.
    pub async fn fetch_and_store<H: HttpFetch>(&self, http: &H, url: &str, path: &Path) -> ArtworkRef {
        match self.try_fetch_and_store(http, url, path).await {
            Ok(reference) => {
                info!(url, path = %path.display(), "stored album art");
                reference
            }
            Err(e) => {
                warn!(url, error = %e, "album art download failed, using default");
                self.default.clone()
            }
        }
    }

    async fn try_fetch_and_store<H: HttpFetch>(
        &self,
        http: &H,
        url: &str,
        path: &Path,
    ) -> Result<ArtworkRef, CacheError> {
        // The directory may have been removed since startup
        self.ensure_dir().await.map_err(|source| CacheError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let part = part_path(path);

        let result = self.download_into(http, url, &part).await;
        let result = match result {
            Ok(()) => tokio::fs::rename(&part, path).await.map_err(|source| CacheError::Io {
                path: path.to_path_buf(),
                source,
            }),
            Err(e) => Err(e),
        };

        if result.is_err() {
            // Best effort: a missing part file is fine
            if let Err(e) = tokio::fs::remove_file(&part).await {
                debug!(path = %part.display(), error = %e, "no partial download to remove");
            }
        }

        result.map(|()| ArtworkRef::from_path(path))
    }

    /// Streams the body into `part` and checks that it is an image
    async fn download_into<H: HttpFetch>(&self, http: &H, url: &str, part: &Path) -> Result<(), CacheError> {
        let io_err = |source: std::io::Error| CacheError::Io {
            path: part.to_path_buf(),
            source,
        };

        let mut file = tokio::fs::File::create(part).await.map_err(io_err)?;
        let bytes = http.download_to(url, &mut file).await?;
        file.sync_all().await.map_err(io_err)?;
        drop(file);

        debug!(url, bytes, "downloaded album art");

        let mut head = [0u8; 12];
        let mut file = tokio::fs::File::open(part).await.map_err(io_err)?;
        let mut filled = 0;
        while filled < head.len() {
            let n = file.read(&mut head[filled..]).await.map_err(io_err)?;
            if n == 0 {
                break;
            }
            filled += n;
        }

        if !looks_like_image(&head[..filled]) {
            return Err(CacheError::NotAnImage(url.to_string()));
        }
        Ok(())
    }
}

/// `<dir>/.<name>.part` next to the final file, so the rename stays on one filesystem
fn part_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.part"))
}

/// Checks magic bytes: JPEG, PNG, GIF or WebP.
///
/// Catches HTML error pages served with a 200 status.
fn looks_like_image(head: &[u8]) -> bool {
    let is_jpeg = head.starts_with(&[0xFF, 0xD8, 0xFF]);
    let is_png = head.starts_with(&[0x89, 0x50, 0x4E, 0x47]);
    let is_gif = head.starts_with(b"GIF8");
    let is_webp = head.len() >= 12 && &head[0..4] == b"RIFF" && &head[8..12] == b"WEBP";
    is_jpeg || is_png || is_gif || is_webp
}
