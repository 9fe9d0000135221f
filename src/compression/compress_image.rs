use std::io::Cursor;

use anyhow::{Context, Result};
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, GenericImageView, ImageFormat};

use crate::config::config::CompressionConfig;
use crate::session::{AcceptedImage, CompressedImage};

const MIN_JPEG_QUALITY: u8 = 40;
const QUALITY_STEP: u8 = 10;
const SHRINK_FACTOR: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionOptions {
    pub max_size_bytes: u64,
    pub max_width_or_height: u32,
    pub max_iterations: u32,
    pub initial_quality: u8,
}

impl Default for CompressionOptions {
    fn default() -> Self {
        CompressionOptions {
            max_size_bytes: 1024 * 1024,
            max_width_or_height: 1920,
            max_iterations: 10,
            initial_quality: 90,
        }
    }
}

impl From<&CompressionConfig> for CompressionOptions {
    fn from(config: &CompressionConfig) -> Self {
        CompressionOptions {
            max_size_bytes: (config.max_size_mb * 1024.0 * 1024.0) as u64,
            max_width_or_height: config.max_width_or_height.max(1),
            ..CompressionOptions::default()
        }
    }
}

/// Shrinks an image until it fits `options`.
///
/// The longer side is scaled down to `max_width_or_height` first. While the
/// encoded output is still above `max_size_bytes`, JPEG quality drops in steps
/// and then the dimensions shrink, for at most `max_iterations` rounds.
/// An image that already fits both limits is returned unchanged.
pub fn compress_image(image: &AcceptedImage, options: &CompressionOptions) -> Result<CompressedImage> {
    let format = image::guess_format(&image.payload).context("Unrecognised image format")?;
    let mut decoded = image::load_from_memory_with_format(&image.payload, format)
        .context("Failed to decode image")?;

    let (width, height) = decoded.dimensions();
    let max_dimension = options.max_width_or_height;
    let needs_resize = width.max(height) > max_dimension;

    if !needs_resize && image.byte_size <= options.max_size_bytes {
        return Ok(CompressedImage::from_original(image));
    }

    if needs_resize {
        decoded = decoded.resize(max_dimension, max_dimension, FilterType::Lanczos3);
    }

    let output_format = output_format(format, &decoded);
    let mut quality = options.initial_quality;
    let mut encoded = encode(&decoded, output_format, quality)?;

    for _ in 0..options.max_iterations {
        if encoded.len() as u64 <= options.max_size_bytes {
            break;
        }

        if output_format == ImageFormat::Jpeg && quality > MIN_JPEG_QUALITY {
            quality = quality.saturating_sub(QUALITY_STEP).max(MIN_JPEG_QUALITY);
        } else {
            let (width, height) = decoded.dimensions();
            let new_width = ((width as f64 * SHRINK_FACTOR) as u32).max(1);
            let new_height = ((height as f64 * SHRINK_FACTOR) as u32).max(1);
            if (new_width, new_height) == (width, height) {
                break;
            }
            decoded = decoded.resize_exact(new_width, new_height, FilterType::Lanczos3);
        }

        encoded = encode(&decoded, output_format, quality)?;
    }

    if !needs_resize && encoded.len() as u64 >= image.byte_size {
        return Ok(CompressedImage::from_original(image));
    }

    Ok(CompressedImage {
        byte_size: encoded.len() as u64,
        payload: Bytes::from(encoded),
        content_type: output_format.to_mime_type().to_string(),
    })
}

/// JPEG and PNG keep their format; anything else becomes PNG when it has an
/// alpha channel and JPEG otherwise.
fn output_format(input: ImageFormat, image: &DynamicImage) -> ImageFormat {
    match input {
        ImageFormat::Jpeg => ImageFormat::Jpeg,
        ImageFormat::Png => ImageFormat::Png,
        _ if image.color().has_alpha() => ImageFormat::Png,
        _ => ImageFormat::Jpeg,
    }
}

fn encode(image: &DynamicImage, format: ImageFormat, quality: u8) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();

    if format == ImageFormat::Jpeg {
        let rgb = image.to_rgb8();
        JpegEncoder::new_with_quality(&mut buffer, quality)
            .encode_image(&rgb)
            .context("Failed to encode JPEG")?;
    } else {
        let converted;
        let image = match image.color() {
            ColorType::Rgb32F | ColorType::Rgba32F => {
                converted = DynamicImage::ImageRgba8(image.to_rgba8());
                &converted
            }
            _ => image,
        };
        image
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .context("Failed to encode PNG")?;
    }

    Ok(buffer)
}
