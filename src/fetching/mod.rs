pub mod fetch_image;
pub mod process_images;

pub use fetch_image::{FetchLimits, ImageFetcher};
pub use process_images::BatchImageFetcher;
