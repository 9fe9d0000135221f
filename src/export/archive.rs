use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::task;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::session::CompressedImage;

/// Entry name inside the archive for the image at `index` (0-based).
pub fn entry_name(index: usize, image: &CompressedImage) -> String {
    format!("compressed-image-{}.{}", index + 1, image.extension())
}

/// Builds an in-memory zip with one entry per image, in session order.
pub fn build_archive(images: &[CompressedImage]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    // Payloads are already compressed images
    let options = FileOptions::default().compression_method(CompressionMethod::Stored);

    for (index, image) in images.iter().enumerate() {
        let name = entry_name(index, image);
        zip.start_file(name.as_str(), options)
            .with_context(|| format!("Failed to start archive entry {}", name))?;
        zip.write_all(&image.payload)
            .with_context(|| format!("Failed to write archive entry {}", name))?;
    }

    let cursor = zip.finish().context("Failed to finalize archive")?;
    Ok(cursor.into_inner())
}

/// Writes `compressed-images-<epoch-ms>.zip` into `output_dir` and returns its path.
pub async fn export_archive(images: Vec<CompressedImage>, output_dir: &Path) -> Result<PathBuf> {
    let archive = task::spawn_blocking(move || build_archive(&images))
        .await
        .context("Archive task failed")??;

    tokio::fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let path = output_dir.join(format!("compressed-images-{}.zip", Utc::now().timestamp_millis()));
    tokio::fs::write(&path, archive)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(path)
}
