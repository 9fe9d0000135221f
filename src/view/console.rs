use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;

use crate::session::{AcceptedImage, CompressedImage};
use crate::view::{ResultSummary, ViewModel};

/// Terminal front end: one status line per update and one line per image.
#[derive(Debug, Default)]
pub struct ConsoleView {
    export_requested: bool,
    export_available: AtomicBool,
}

impl ConsoleView {
    pub fn new(export_requested: bool) -> Self {
        ConsoleView {
            export_requested,
            export_available: AtomicBool::new(false),
        }
    }

    /// Whether "download all" was unlocked by the last run.
    pub fn export_available(&self) -> bool {
        self.export_available.load(Ordering::Relaxed)
    }
}

impl ViewModel for ConsoleView {
    fn show_status(&self, message: &str) {
        if message.starts_with("Error") {
            println!("{}", message.red());
        } else {
            println!("{}", message.cyan());
        }
    }

    fn render_result(&self, original: &AcceptedImage, compressed: &CompressedImage) {
        let summary = ResultSummary::new(original, compressed);
        println!("{} {}", "Compressed".green(), original.url);
        println!("    {}", summary);
    }

    fn show_export_control(&self) {
        self.export_available.store(true, Ordering::Relaxed);
        if !self.export_requested {
            println!("{}", "Run again with --zip to download all images as one archive.".yellow());
        }
    }
}
