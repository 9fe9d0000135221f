use colored::Colorize;
use futures::stream::{FuturesUnordered, StreamExt};

use crate::compression::CompressionWorker;
use crate::fetching::fetch_image::{ImageFetcher, SkipReason};
use crate::session::{AcceptedImage, CompressedImage, Session};
use crate::view::ViewModel;

/// Result of one URL once it has settled.
#[derive(Debug)]
pub enum ImageOutcome {
    Processed {
        accepted: AcceptedImage,
        compressed: CompressedImage,
    },
    Skipped {
        url: String,
        reason: SkipReason,
    },
}

/// Fetches image URLs in consecutive batches.
///
/// A batch runs all of its downloads concurrently and fully settles before the
/// next one starts. Settled images are recorded first come, first served.
pub struct BatchImageFetcher {
    fetcher: ImageFetcher,
    batch_size: usize,
}

impl BatchImageFetcher {
    pub fn new(fetcher: ImageFetcher, batch_size: usize) -> Self {
        BatchImageFetcher {
            fetcher,
            batch_size: batch_size.max(1),
        }
    }

    pub async fn process_images<V: ViewModel>(
        &self,
        image_urls: &[String],
        compressor: &CompressionWorker,
        session: &mut Session,
        view: &V,
    ) {
        let total = image_urls.len();
        let mut dispatched = 0;

        for batch in image_urls.chunks(self.batch_size) {
            let mut in_flight: FuturesUnordered<_> = batch
                .iter()
                .map(|image_url| self.process_image(image_url, compressor))
                .collect();

            while let Some(outcome) = in_flight.next().await {
                match outcome {
                    ImageOutcome::Processed { accepted, compressed } => {
                        view.render_result(&accepted, &compressed);
                        session.push(accepted, compressed);
                    }
                    ImageOutcome::Skipped { url, reason: SkipReason::Timeout } => {
                        println!("{} {}", "Timeout while fetching image:".yellow(), url);
                    }
                    ImageOutcome::Skipped { url, reason } => {
                        eprintln!("{} {}: {}", "Error processing image".red(), url, reason);
                    }
                }
            }

            dispatched += batch.len();
            view.show_status(&format!("Processed {} of {} images...", dispatched, total));
        }
    }

    async fn process_image(&self, image_url: &str, compressor: &CompressionWorker) -> ImageOutcome {
        match self.fetcher.fetch_image(image_url).await {
            Ok(accepted) => {
                let compressed = compressor.compress(&accepted).await;
                ImageOutcome::Processed { accepted, compressed }
            }
            Err(reason) => ImageOutcome::Skipped {
                url: image_url.to_string(),
                reason,
            },
        }
    }
}
