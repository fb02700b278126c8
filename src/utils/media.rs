//! Image and audio attachments.
//!
//! Remote images (`http://` or `https://`) are passed through untouched.
//! Local images and all audio are read from disk and base64-encoded.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::mime::guess_mime;
use crate::error::SgptError;

const DEFAULT_IMAGE_MIME: &str = "image/jpeg";
const DEFAULT_AUDIO_MIME: &str = "audio/wav";

/// A loaded attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    /// Remote resource, referenced by URL.
    Url { url: String, mime_type: String },
    /// File contents inlined as standard base64 (no `data:` prefix).
    Inline { mime_type: String, data: String },
}

impl MediaSource {
    /// The URL itself, or a `data:<mime>;base64,<data>` URI for inline content.
    pub fn to_uri(&self) -> String {
        match self {
            Self::Url { url, .. } => url.clone(),
            Self::Inline { mime_type, data } => format!("data:{mime_type};base64,{data}"),
        }
    }
}

pub fn is_remote(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}

/// Load an image from a local path, or wrap a URL without fetching it.
pub async fn load_image(path: &str) -> Result<MediaSource, SgptError> {
    if is_remote(path) {
        return Ok(MediaSource::Url {
            url: path.to_string(),
            mime_type: guess_mime(None, Some(path), DEFAULT_IMAGE_MIME),
        });
    }
    inline_file("image", path, DEFAULT_IMAGE_MIME).await
}

/// Load an audio clip. Audio is always inlined.
pub async fn load_audio(path: &str) -> Result<MediaSource, SgptError> {
    inline_file("audio", path, DEFAULT_AUDIO_MIME).await
}

async fn inline_file(
    kind: &'static str,
    path: &str,
    fallback_mime: &str,
) -> Result<MediaSource, SgptError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| SgptError::MediaRead {
            kind,
            path: path.to_string(),
            source,
        })?;
    tracing::debug!(kind, path, size = bytes.len(), "loaded attachment");

    Ok(MediaSource::Inline {
        mime_type: guess_mime(Some(&bytes), Some(path), fallback_mime),
        data: STANDARD.encode(&bytes),
    })
}
