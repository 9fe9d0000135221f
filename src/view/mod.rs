pub mod console;

use std::fmt;

use crate::session::{savings_percent, AcceptedImage, CompressedImage};

pub use console::ConsoleView;

/// Everything the downloader needs from a front end.
pub trait ViewModel {
    fn show_status(&self, message: &str);

    /// Called once per processed image, as soon as it is available.
    fn render_result(&self, original: &AcceptedImage, compressed: &CompressedImage);

    /// Called at the end of a run that processed at least one image.
    fn show_export_control(&self);
}

/// Before/after sizes of one image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResultSummary {
    pub original_kb: f64,
    pub compressed_kb: f64,
    pub saved_percent: f64,
}

impl ResultSummary {
    pub fn new(original: &AcceptedImage, compressed: &CompressedImage) -> Self {
        ResultSummary {
            original_kb: original.byte_size as f64 / 1024.0,
            compressed_kb: compressed.byte_size as f64 / 1024.0,
            saved_percent: savings_percent(original.byte_size, compressed.byte_size),
        }
    }
}

impl fmt::Display for ResultSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Original: {:.2} KB | Compressed: {:.2} KB | Saved: {:.1}%",
            self.original_kb, self.compressed_kb, self.saved_percent
        )
    }
}
