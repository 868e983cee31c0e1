//! # HTTP Client
//!
//! Thin wrapper around `reqwest` used for the two requests of a cycle:
//! the Spotify oEmbed lookup (JSON) and the thumbnail download (raw bytes,
//! streamed to disk).

use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::FetchError;

/// The requests the resolver and the artwork cache make.
#[allow(async_fn_in_trait)]
pub trait HttpFetch {
    /// GETs `url` and decodes the body as JSON
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError>;

    /// GETs `url` and streams the body into `out`, returning the byte count
    async fn download_to<W>(&self, url: &str, out: &mut W) -> Result<u64, FetchError>
    where
        W: AsyncWrite + Unpin;
}

/// [`HttpFetch`] backed by a `reqwest` client with a request timeout.
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    /// Creates an HTTP client with the given per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Sends a GET and rejects non-2xx answers
    async fn get(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }
        Ok(response)
    }
}

impl HttpFetch for HttpClient {
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let body = self
            .get(url)
            .await?
            .bytes()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        serde_json::from_slice(&body).map_err(|e| FetchError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    async fn download_to<W>(&self, url: &str, out: &mut W) -> Result<u64, FetchError>
    where
        W: AsyncWrite + Unpin,
    {
        let mut response = self.get(url).await?;
        let mut written = 0u64;

        while let Some(chunk) = response.chunk().await.map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })? {
            out.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        out.flush().await?;

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    /// Serves `response` verbatim to one connection and returns its URL
    async fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{addr}/img123.jpg")
    }

    fn client() -> HttpClient {
        HttpClient::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_error_status_is_rejected() {
        let url = serve_once(
            "HTTP/1.1 503 Service Unavailable\r\ncontent-length: 4\r\nconnection: close\r\n\r\nbusy",
        )
        .await;

        let mut out = Vec::new();
        let err = client().download_to(&url, &mut out).await.unwrap_err();

        match err {
            FetchError::Status { status, url: failed } => {
                assert_eq!(status, reqwest::StatusCode::SERVICE_UNAVAILABLE);
                assert_eq!(failed, url);
            }
            other => panic!("expected status error, got {other:?}"),
        }
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_download_streams_body() {
        let url = serve_once("HTTP/1.1 200 OK\r\ncontent-length: 5\r\nconnection: close\r\n\r\nhello").await;

        let mut out = Vec::new();
        let written = client().download_to(&url, &mut out).await.unwrap();

        assert_eq!(written, 5);
        assert_eq!(out, b"hello");
    }

    #[tokio::test]
    async fn test_json_decode_failure_is_reported() {
        let url = serve_once("HTTP/1.1 200 OK\r\ncontent-length: 6\r\nconnection: close\r\n\r\n<html>").await;

        let err = client().get_json::<serde_json::Value>(&url).await.unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
    }
}
