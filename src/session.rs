use bytes::Bytes;

/// An image that was downloaded and passed content-type and size validation.
#[derive(Debug, Clone)]
pub struct AcceptedImage {
    pub url: String,
    pub payload: Bytes,
    pub content_type: String,
    pub byte_size: u64,
}

/// Output of the compressor, paired 1:1 with an [`AcceptedImage`].
#[derive(Debug, Clone)]
pub struct CompressedImage {
    pub payload: Bytes,
    pub content_type: String,
    pub byte_size: u64,
}

impl CompressedImage {
    /// The untouched original, used whenever compression cannot improve on it.
    pub fn from_original(image: &AcceptedImage) -> Self {
        CompressedImage {
            payload: image.payload.clone(),
            content_type: image.content_type.clone(),
            byte_size: image.byte_size,
        }
    }

    /// File extension derived from the content-type subtype (`image/png` -> `png`).
    pub fn extension(&self) -> &str {
        self.content_type
            .split('/')
            .nth(1)
            .filter(|subtype| !subtype.is_empty())
            .unwrap_or("bin")
    }
}

/// State of one user-initiated run.
#[derive(Debug, Default)]
pub struct Session {
    pub accepted_images: Vec<AcceptedImage>,
    pub compressed_images: Vec<CompressedImage>,
}

impl Session {
    pub fn reset(&mut self) {
        self.accepted_images.clear();
        self.compressed_images.clear();
    }

    /// Records an accepted image together with its compressed counterpart.
    pub fn push(&mut self, accepted: AcceptedImage, compressed: CompressedImage) {
        self.accepted_images.push(accepted);
        self.compressed_images.push(compressed);
    }

    pub fn processed(&self) -> usize {
        self.accepted_images.len()
    }
}

/// Percentage of bytes saved by compression, `(original - compressed) / original * 100`.
pub fn savings_percent(original: u64, compressed: u64) -> f64 {
    if original == 0 {
        return 0.0;
    }
    (original as f64 - compressed as f64) / original as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accepted(content_type: &str) -> AcceptedImage {
        AcceptedImage {
            url: "http://x/a".to_string(),
            payload: Bytes::from_static(&[1, 2, 3]),
            content_type: content_type.to_string(),
            byte_size: 3,
        }
    }

    #[test]
    fn extension_uses_subtype() {
        assert_eq!(CompressedImage::from_original(&accepted("image/jpeg")).extension(), "jpeg");
        assert_eq!(CompressedImage::from_original(&accepted("image/svg+xml")).extension(), "svg+xml");
        assert_eq!(CompressedImage::from_original(&accepted("image/")).extension(), "bin");
    }

    #[test]
    fn savings_percent_matches_formula() {
        assert_eq!(savings_percent(1000, 250), 75.0);
        assert_eq!(savings_percent(1000, 1000), 0.0);
        assert!(savings_percent(100, 150) < 0.0);
        assert_eq!(savings_percent(0, 0), 0.0);
    }

    #[test]
    fn reset_clears_both_sequences() {
        let mut session = Session::default();
        let image = accepted("image/png");
        session.push(image.clone(), CompressedImage::from_original(&image));
        assert_eq!(session.processed(), 1);

        session.reset();
        assert!(session.accepted_images.is_empty());
        assert!(session.compressed_images.is_empty());
    }
}
