use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use crate::downloader::{ImageDownloader, RunOutcome};
use crate::export::{export_archive, save_image};
use crate::view::ConsoleView;

// Import modules
mod compression;
mod config;
mod downloader;
mod export;
mod extractors;
mod fetching;
mod scraping;
mod session;
mod view;

#[derive(Debug, Parser)]
#[command(
    name = "img_scrapping",
    version,
    about = "Scrape, download and compress every image of a web page"
)]
struct Cli {
    /// Page to scrape
    #[arg(value_name = "URL")]
    url: String,

    #[arg(short, long, value_name = "FILE", default_value = "Settings.toml")]
    settings: PathBuf,

    /// Overrides `output.output_dir`
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<String>,

    /// Bundle every compressed image into one zip archive
    #[arg(long, default_value_t = false)]
    zip: bool,

    /// Save every compressed image as its own file
    #[arg(long, default_value_t = false)]
    save_each: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration settings
    let mut config = match config::load_config(&cli.settings) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };
    if let Some(output_dir) = cli.output_dir {
        config.output.output_dir = output_dir;
    }

    let mut downloader = ImageDownloader::new(&config, ConsoleView::new(cli.zip));

    match downloader.run(&cli.url).await {
        Ok(RunOutcome::Completed { .. }) => {}
        Ok(_) => return Ok(()),
        // Already shown as the status line
        Err(_) => std::process::exit(1),
    }

    let output_dir = PathBuf::from(&config.output.output_dir);

    if cli.save_each {
        for image in &downloader.session().compressed_images {
            let path = save_image(image, &output_dir).await?;
            println!("{} {}", "Saved".green(), path.display());
        }
    }

    if cli.zip && downloader.view().export_available() {
        let images = downloader.session().compressed_images.clone();
        let path = export_archive(images, &output_dir).await?;
        println!("{} {}", "Archive written:".green(), path.display());
    }

    Ok(())
}
