use anyhow::Result;
use reqwest::Client;

use crate::compression::{CompressionOptions, CompressionWorker};
use crate::config::config::AppConfig;
use crate::extractors::extract_image_urls;
use crate::fetching::{BatchImageFetcher, FetchLimits, ImageFetcher};
use crate::scraping::ProxyFetcher;
use crate::session::Session;
use crate::view::ViewModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The URL input was empty; nothing was fetched.
    InvalidUrl,
    /// The page had no usable `<img>` elements.
    NoImages,
    Completed { candidates: usize, processed: usize },
}

/// Drives one scrape-fetch-compress run and owns its session state.
pub struct ImageDownloader<V: ViewModel> {
    proxy: ProxyFetcher,
    batch_fetcher: BatchImageFetcher,
    compressor: CompressionWorker,
    session: Session,
    view: V,
}

impl<V: ViewModel> ImageDownloader<V> {
    /// Builds the downloader. Spawns the compression worker, so this must run
    /// inside a Tokio runtime when `compression.use_worker` is set.
    pub fn new(config: &AppConfig, view: V) -> Self {
        let client = Client::new();
        let options = CompressionOptions::from(&config.compression);

        let compressor = if config.compression.use_worker {
            CompressionWorker::spawn(options)
        } else {
            CompressionWorker::inline(options)
        };

        let fetcher = ImageFetcher::new(client.clone(), FetchLimits::from(&config.fetch));

        ImageDownloader {
            proxy: ProxyFetcher::new(client, &config.proxy.proxy_url),
            batch_fetcher: BatchImageFetcher::new(fetcher, config.fetch.batch_size),
            compressor,
            session: Session::default(),
            view,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Runs the whole pipeline for `url`.
    ///
    /// # Errors
    ///
    /// Only proxy failures are fatal. They are reported through the view before
    /// being returned, so callers should not print them again.
    pub async fn run(&mut self, url: &str) -> Result<RunOutcome> {
        let url = url.trim();
        if url.is_empty() {
            self.view.show_status("Please enter a valid URL");
            return Ok(RunOutcome::InvalidUrl);
        }

        match self.fetch_images(url).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                self.view.show_status(&format!("Error: {:#}", e));
                Err(e)
            }
        }
    }

    async fn fetch_images(&mut self, url: &str) -> Result<RunOutcome> {
        self.view.show_status("Fetching images...");
        self.session.reset();

        let html = self.proxy.fetch_page(url).await?;
        let image_urls = extract_image_urls(&html);

        if image_urls.is_empty() {
            self.view.show_status("No valid images found on this website");
            return Ok(RunOutcome::NoImages);
        }

        self.view
            .show_status(&format!("Found {} images. Processing...", image_urls.len()));

        self.batch_fetcher
            .process_images(&image_urls, &self.compressor, &mut self.session, &self.view)
            .await;

        let processed = self.session.processed();
        if processed > 0 {
            self.view.show_export_control();
        }
        self.view
            .show_status(&format!("Successfully processed {} images!", processed));

        Ok(RunOutcome::Completed {
            candidates: image_urls.len(),
            processed,
        })
    }
}
