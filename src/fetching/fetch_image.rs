use std::fmt;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;

use crate::config::config::FetchConfig;
use crate::session::AcceptedImage;

/// Why a single image was not accepted. Every variant is recoverable: the
/// image is skipped and the run continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Timeout,
    Request(String),
    HttpStatus(u16),
    NotAnImage(String),
    TooSmall(u64),
    TooLarge(u64),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Timeout => write!(f, "request timed out"),
            SkipReason::Request(error) => write!(f, "{}", error),
            SkipReason::HttpStatus(status) => write!(f, "HTTP error! status: {}", status),
            SkipReason::NotAnImage(content_type) if content_type.is_empty() => {
                write!(f, "missing content type")
            }
            SkipReason::NotAnImage(content_type) => write!(f, "not an image: {}", content_type),
            SkipReason::TooSmall(size) => write!(f, "too small: {} bytes", size),
            SkipReason::TooLarge(size) => write!(f, "too large: {} bytes", size),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FetchLimits {
    pub timeout: Duration,
    pub min_bytes: u64,
    pub max_bytes: u64,
}

impl From<&FetchConfig> for FetchLimits {
    fn from(config: &FetchConfig) -> Self {
        FetchLimits {
            timeout: Duration::from_millis(config.timeout_ms),
            min_bytes: config.min_bytes,
            max_bytes: config.max_bytes,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImageFetcher {
    client: Client,
    limits: FetchLimits,
}

impl ImageFetcher {
    pub fn new(client: Client, limits: FetchLimits) -> Self {
        ImageFetcher { client, limits }
    }

    /// Downloads one image and validates it.
    pub async fn fetch_image(&self, image_url: &str) -> Result<AcceptedImage, SkipReason> {
        let response = self
            .client
            .get(image_url)
            .header(ACCEPT, "image/*")
            .timeout(self.limits.timeout)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SkipReason::HttpStatus(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(normalize_content_type)
            .unwrap_or_default();

        if let Some(declared) = response.content_length() {
            if declared > self.limits.max_bytes {
                return Err(SkipReason::TooLarge(declared));
            }
        }

        let payload = response.bytes().await.map_err(request_error)?;

        self.validate(image_url, content_type, payload)
    }

    pub fn validate(
        &self,
        image_url: &str,
        content_type: String,
        payload: bytes::Bytes,
    ) -> Result<AcceptedImage, SkipReason> {
        if !content_type.starts_with("image/") {
            return Err(SkipReason::NotAnImage(content_type));
        }

        let byte_size = payload.len() as u64;
        if byte_size < self.limits.min_bytes {
            return Err(SkipReason::TooSmall(byte_size));
        }
        if byte_size > self.limits.max_bytes {
            return Err(SkipReason::TooLarge(byte_size));
        }

        Ok(AcceptedImage {
            url: image_url.to_string(),
            payload,
            content_type,
            byte_size,
        })
    }
}

fn request_error(error: reqwest::Error) -> SkipReason {
    if error.is_timeout() {
        SkipReason::Timeout
    } else {
        SkipReason::Request(error.to_string())
    }
}

/// `Image/JPEG; charset=binary` -> `image/jpeg`
fn normalize_content_type(value: &str) -> String {
    value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}
