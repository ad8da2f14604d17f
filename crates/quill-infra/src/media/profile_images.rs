//! Thumbnails written to the local filesystem.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use uuid::Uuid;

use quill_core::domain::DEFAULT_IMAGE_FILE;
use quill_core::ports::{
    ALLOWED_IMAGE_EXTENSIONS, MediaError, ProfileImageStore, allowed_extension,
};

/// Bounding box every stored picture is shrunk into.
pub const THUMBNAIL_SIZE: u32 = 120;

/// Stores pictures under `<media_root>/profile_pics`.
pub struct FsProfileImageStore {
    dir: PathBuf,
}

impl FsProfileImageStore {
    pub fn new(media_root: impl AsRef<Path>) -> Self {
        Self {
            dir: media_root.as_ref().join("profile_pics"),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the directory and the shared default picture if missing.
    pub async fn init(&self) -> Result<(), MediaError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| MediaError::Io(e.to_string()))?;

        let default = self.dir.join(DEFAULT_IMAGE_FILE);
        if tokio::fs::try_exists(&default).await.unwrap_or(false) {
            return Ok(());
        }

        let placeholder = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(
            THUMBNAIL_SIZE,
            THUMBNAIL_SIZE,
            Rgb([200u8, 200, 200]),
        ));
        let bytes = encode(&placeholder, "jpg")?;
        tokio::fs::write(&default, bytes)
            .await
            .map_err(|e| MediaError::Io(e.to_string()))?;
        tracing::info!(path = %default.display(), "Created default profile picture");
        Ok(())
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, MediaError> {
        let plain = !name.is_empty()
            && !name.starts_with('.')
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        if !plain {
            return Err(MediaError::NotFound);
        }
        Ok(self.dir.join(name))
    }
}

fn encode(image: &DynamicImage, ext: &str) -> Result<Vec<u8>, MediaError> {
    let mut buffer = Vec::new();
    let mut cursor = Cursor::new(&mut buffer);
    let result = match ext {
        "png" => image.write_to(&mut cursor, ImageFormat::Png),
        _ => DynamicImage::ImageRgb8(image.to_rgb8()).write_to(&mut cursor, ImageFormat::Jpeg),
    };
    result.map_err(|e| MediaError::Io(format!("Failed to encode image: {e}")))?;
    Ok(buffer)
}

/// Decode, shrink to fit the thumbnail box and re-encode in the upload's format.
fn thumbnail(bytes: &[u8], ext: &str) -> Result<Vec<u8>, MediaError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| MediaError::InvalidImage(format!("Failed to load image: {e}")))?;
    encode(&img.thumbnail(THUMBNAIL_SIZE, THUMBNAIL_SIZE), ext)
}

#[async_trait]
impl ProfileImageStore for FsProfileImageStore {
    async fn save(&self, original_name: &str, bytes: Vec<u8>) -> Result<String, MediaError> {
        let ext = allowed_extension(original_name)
            .ok_or_else(|| MediaError::UnsupportedType(ALLOWED_IMAGE_EXTENSIONS.join(", ")))?;

        let encoded = {
            let ext = ext.clone();
            tokio::task::spawn_blocking(move || thumbnail(&bytes, &ext))
                .await
                .map_err(|e| MediaError::Io(e.to_string()))??
        };

        let random = Uuid::new_v4().simple().to_string();
        let name = format!("{}.{ext}", &random[..16]);
        tokio::fs::write(self.dir.join(&name), encoded)
            .await
            .map_err(|e| MediaError::Io(e.to_string()))?;

        tracing::debug!(file = %name, "Stored profile picture");
        Ok(name)
    }

    async fn load(&self, name: &str) -> Result<Vec<u8>, MediaError> {
        let path = self.path_for(name)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(MediaError::NotFound),
            Err(e) => Err(MediaError::Io(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = ImageBuffer::from_fn(width, height, |x, _| Rgb([(x % 255) as u8, 0u8, 0u8]));
        let mut out = Vec::new();
        img.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    fn temp_root() -> PathBuf {
        std::env::temp_dir().join(format!("quill-media-{}", Uuid::new_v4().simple()))
    }

    #[tokio::test]
    async fn saves_a_thumbnail_under_a_random_name() {
        let root = temp_root();
        let store = FsProfileImageStore::new(&root);
        store.init().await.unwrap();

        let name = store.save("Holiday.PNG", png(400, 200)).await.unwrap();
        assert!(name.ends_with(".png"));
        assert_eq!(name.len(), 16 + 4);

        let stored = image::load_from_memory(&store.load(&name).await.unwrap()).unwrap();
        assert_eq!(stored.width(), THUMBNAIL_SIZE);
        assert!(stored.height() <= THUMBNAIL_SIZE);

        let _ = std::fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn init_creates_the_default_picture() {
        let root = temp_root();
        let store = FsProfileImageStore::new(&root);
        store.init().await.unwrap();

        let bytes = store.load(DEFAULT_IMAGE_FILE).await.unwrap();
        assert!(image::load_from_memory(&bytes).is_ok());

        let _ = std::fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn rejects_bad_uploads() {
        let root = temp_root();
        let store = FsProfileImageStore::new(&root);
        store.init().await.unwrap();

        assert!(matches!(
            store.save("me.gif", png(10, 10)).await,
            Err(MediaError::UnsupportedType(_))
        ));
        assert!(matches!(
            store.save("me.jpg", b"not an image".to_vec()).await,
            Err(MediaError::InvalidImage(_))
        ));

        let _ = std::fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn load_refuses_paths() {
        let store = FsProfileImageStore::new(temp_root());
        assert!(matches!(
            store.load("../secret.txt").await,
            Err(MediaError::NotFound)
        ));
        assert!(matches!(
            store.load("missing.jpg").await,
            Err(MediaError::NotFound)
        ));
    }
}
