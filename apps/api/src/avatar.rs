//! Avatar loading: Fetches the author picture once per carousel.
//!
//! Accepts `http(s)://` URLs and inline `data:image/...;base64,` URIs. A failed
//! load is never fatal: callers log a warning and render without an avatar.
//!
//! `AppState` holds an `Arc<dyn AvatarSource>` so tests can swap in a stub.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use bytes::{Bytes, BytesMut};
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use crate::layout::surface::EmbeddedImage;

/// Largest avatar accepted, in bytes.
const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

const ALLOWED_MIME: [&str; 4] = ["image/png", "image/jpeg", "image/gif", "image/webp"];

#[derive(Debug, Error)]
pub enum AvatarError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("avatar request returned status {0}")]
    Status(u16),

    #[error("unsupported avatar URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("unsupported avatar content type: {0}")]
    UnsupportedType(String),

    #[error("malformed data URI: {0}")]
    MalformedDataUri(String),

    #[error("avatar is larger than {MAX_AVATAR_BYTES} bytes")]
    TooLarge,

    #[error("avatar body is empty")]
    Empty,
}

#[async_trait]
pub trait AvatarSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<EmbeddedImage, AvatarError>;
}

/// Loads avatars over HTTP with a request timeout.
#[derive(Clone)]
pub struct HttpAvatarSource {
    client: Client,
}

impl HttpAvatarSource {
    pub fn new(timeout: Duration) -> Result<Self, AvatarError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl AvatarSource for HttpAvatarSource {
    async fn fetch(&self, url: &str) -> Result<EmbeddedImage, AvatarError> {
        if url.starts_with("data:") {
            return decode_data_uri(url);
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            let scheme = url.split(':').next().unwrap_or_default();
            return Err(AvatarError::UnsupportedScheme(scheme.to_string()));
        }

        debug!(url, "Fetching avatar");
        let mut response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AvatarError::Status(status.as_u16()));
        }

        let mime = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or_default().trim().to_ascii_lowercase())
            .unwrap_or_default();
        let mime = checked_mime(&mime)?;

        if response.content_length().is_some_and(|len| len > MAX_AVATAR_BYTES as u64) {
            return Err(AvatarError::TooLarge);
        }

        let mut body = BodyLimit::default();
        while let Some(chunk) = response.chunk().await? {
            body.push(&chunk)?;
        }
        let data = body.into_bytes();
        check_size(&data)?;
        Ok(EmbeddedImage::new(mime, data))
    }
}

/// Accumulates a streamed body and fails as soon as it passes `MAX_AVATAR_BYTES`.
#[derive(Debug, Default)]
struct BodyLimit {
    buf: BytesMut,
}

impl BodyLimit {
    fn push(&mut self, chunk: &[u8]) -> Result<(), AvatarError> {
        if self.buf.len() + chunk.len() > MAX_AVATAR_BYTES {
            return Err(AvatarError::TooLarge);
        }
        self.buf.extend_from_slice(chunk);
        Ok(())
    }

    fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

/// Decodes `data:<mime>;base64,<payload>`.
fn decode_data_uri(uri: &str) -> Result<EmbeddedImage, AvatarError> {
    let rest = uri.strip_prefix("data:").unwrap_or(uri);
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| AvatarError::MalformedDataUri("missing ',' separator".into()))?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| AvatarError::MalformedDataUri("only base64 payloads are supported".into()))?;
    let mime = checked_mime(&mime.to_ascii_lowercase())?;

    let data = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| AvatarError::MalformedDataUri(e.to_string()))?;
    let data = Bytes::from(data);
    check_size(&data)?;
    Ok(EmbeddedImage::new(mime, data))
}

fn checked_mime(mime: &str) -> Result<&'static str, AvatarError> {
    ALLOWED_MIME
        .iter()
        .find(|allowed| **allowed == mime)
        .copied()
        .ok_or_else(|| AvatarError::UnsupportedType(mime.to_string()))
}

fn check_size(data: &Bytes) -> Result<(), AvatarError> {
    if data.is_empty() {
        return Err(AvatarError::Empty);
    }
    if data.len() > MAX_AVATAR_BYTES {
        return Err(AvatarError::TooLarge);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> HttpAvatarSource {
        HttpAvatarSource::new(Duration::from_secs(1)).unwrap()
    }

    #[tokio::test]
    async fn test_data_uri_is_decoded() {
        let image = source().fetch("data:image/png;base64,cG5n").await.unwrap();
        assert_eq!(image.mime, "image/png");
        assert_eq!(image.data, Bytes::from_static(b"png"));
    }

    #[tokio::test]
    async fn test_data_uri_with_wrong_type_is_rejected() {
        let result = source().fetch("data:text/html;base64,cG5n").await;
        assert!(matches!(result, Err(AvatarError::UnsupportedType(_))));
    }

    #[tokio::test]
    async fn test_non_base64_data_uri_is_rejected() {
        let result = source().fetch("data:image/png,raw").await;
        assert!(matches!(result, Err(AvatarError::MalformedDataUri(_))));
    }

    #[tokio::test]
    async fn test_unknown_scheme_is_rejected() {
        let result = source().fetch("ftp://example.com/a.png").await;
        assert!(matches!(result, Err(AvatarError::UnsupportedScheme(s)) if s == "ftp"));
    }

    #[test]
    fn test_streamed_body_stops_past_the_cap() {
        let mut body = BodyLimit::default();
        let chunk = vec![0u8; 1024 * 1024];
        for _ in 0..5 {
            body.push(&chunk).unwrap();
        }
        assert!(matches!(body.push(&[0u8]), Err(AvatarError::TooLarge)));
        assert_eq!(body.into_bytes().len(), MAX_AVATAR_BYTES);
    }

    #[test]
    fn test_oversized_data_uri_is_rejected() {
        let payload = base64::engine::general_purpose::STANDARD.encode(vec![0u8; MAX_AVATAR_BYTES + 1]);
        let result = decode_data_uri(&format!("data:image/png;base64,{payload}"));
        assert!(matches!(result, Err(AvatarError::TooLarge)));
    }

    #[test]
    fn test_empty_payload_is_rejected() {
        assert!(matches!(check_size(&Bytes::new()), Err(AvatarError::Empty)));
    }
}
