//! Profile picture storage port.

use async_trait::async_trait;

/// Stores uploaded profile pictures as small thumbnails.
#[async_trait]
pub trait ProfileImageStore: Send + Sync {
    /// Thumbnail and persist an upload; returns the stored file name.
    ///
    /// `original_name` only contributes its extension; the stored name is random.
    async fn save(&self, original_name: &str, bytes: Vec<u8>) -> Result<String, MediaError>;

    /// Read a stored picture back.
    async fn load(&self, name: &str) -> Result<Vec<u8>, MediaError>;
}

/// Media errors.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("File does not have an approved extension: {0}")]
    UnsupportedType(String),

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Image not found")]
    NotFound,

    #[error("Storage error: {0}")]
    Io(String),
}

/// Extensions accepted for profile pictures.
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["jpg", "png"];

/// Lower-cased extension of `file_name` when it is an accepted picture type.
pub fn allowed_extension(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    ALLOWED_IMAGE_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}
