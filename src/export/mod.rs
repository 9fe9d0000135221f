pub mod archive;
pub mod save_image;

pub use archive::export_archive;
pub use save_image::save_image;
