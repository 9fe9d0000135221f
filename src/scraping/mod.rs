pub mod fetch_page;

pub use fetch_page::ProxyFetcher;
