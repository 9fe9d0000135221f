use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;

use crate::session::CompressedImage;

/// Saves one image as `compressed-image-<epoch-ms>.<ext>` in `output_dir`.
///
/// Several saves within the same millisecond get the next free timestamp.
pub async fn save_image(image: &CompressedImage, output_dir: &Path) -> Result<PathBuf> {
    tokio::fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let mut timestamp = Utc::now().timestamp_millis();
    let path = loop {
        let candidate = output_dir.join(format!("compressed-image-{}.{}", timestamp, image.extension()));
        if !tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
            break candidate;
        }
        timestamp += 1;
    };

    tokio::fs::write(&path, &image.payload)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    #[tokio::test]
    async fn consecutive_saves_do_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let image = CompressedImage {
            payload: Bytes::from_static(b"payload"),
            content_type: "image/png".to_string(),
            byte_size: 7,
        };

        let first = save_image(&image, dir.path()).await.unwrap();
        let second = save_image(&image, dir.path()).await.unwrap();

        assert_ne!(first, second);
        for path in [&first, &second] {
            let name = path.file_name().unwrap().to_str().unwrap();
            assert!(name.starts_with("compressed-image-"));
            assert!(name.ends_with(".png"));
            assert_eq!(std::fs::read(path).unwrap(), b"payload");
        }
    }
}
