use std::path::PathBuf;

use uuid::Uuid;

use crate::config::UploadConfig;

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("Unsupported image type: {0}")]
    UnsupportedType(String),

    #[error("Image exceeds the maximum allowed size of {0} bytes")]
    TooLarge(usize),

    #[error("Failed to store image: {0}")]
    Io(#[from] std::io::Error),
}

/// Stores validated course images on disk under the configured uploads
/// directory and hands back the public URL path they are served from.
pub struct ImageService {
    dir: PathBuf,
    max_size_bytes: usize,
}

impl ImageService {
    #[must_use]
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            dir: PathBuf::from(&config.path),
            max_size_bytes: config.max_size_bytes,
        }
    }

    pub async fn save(&self, content_type: &str, bytes: &[u8]) -> Result<String, ImageError> {
        let extension = extension_for(content_type)
            .ok_or_else(|| ImageError::UnsupportedType(content_type.to_string()))?;

        if bytes.len() > self.max_size_bytes {
            return Err(ImageError::TooLarge(self.max_size_bytes));
        }

        tokio::fs::create_dir_all(&self.dir).await?;

        let filename = format!("{}.{extension}", Uuid::new_v4());
        tokio::fs::write(self.dir.join(&filename), bytes).await?;

        Ok(format!("/uploads/{filename}"))
    }
}

fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}
