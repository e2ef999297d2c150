use base64::{Engine, engine::general_purpose::STANDARD};
use thiserror::Error;
use tracing::debug;

/// Largest avatar accepted by default, 5 MiB.
pub const DEFAULT_MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AvatarError {
    #[error("{0} is not an image type")]
    InvalidType(String),
    #[error("image too large: {size} bytes, max {max_size}")]
    TooLarge { size: usize, max_size: usize },
}

/// An accepted image, kept locally until the surrounding profile edit is committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarPreview {
    pub content_type: String,
    pub bytes: Vec<u8>,
    /// `data:<content type>;base64,<payload>`
    pub data_uri: String,
}

/// Checks uploaded images and turns them into [`AvatarPreview`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvatarIngestor {
    max_bytes: usize,
}

impl AvatarIngestor {
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub fn ingest(&self, bytes: Vec<u8>, content_type: &str) -> Result<AvatarPreview, AvatarError> {
        if !content_type.starts_with("image/") {
            return Err(AvatarError::InvalidType(content_type.to_string()));
        }

        if bytes.len() > self.max_bytes {
            return Err(AvatarError::TooLarge {
                size: bytes.len(),
                max_size: self.max_bytes,
            });
        }

        let data_uri = format!("data:{content_type};base64,{}", STANDARD.encode(&bytes));
        debug!("Ingested {content_type} avatar of {} bytes", bytes.len());

        Ok(AvatarPreview {
            content_type: content_type.to_string(),
            bytes,
            data_uri,
        })
    }
}

impl Default for AvatarIngestor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_AVATAR_BYTES)
    }
}
