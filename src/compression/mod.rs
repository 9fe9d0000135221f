pub mod compress_image;
pub mod worker;

pub use compress_image::CompressionOptions;
pub use worker::CompressionWorker;
