pub mod extract_image_urls;

pub use extract_image_urls::extract_image_urls;
