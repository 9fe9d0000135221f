use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use urlencoding::encode;

/// Body returned by the proxy's `/get` endpoint.
#[derive(Debug, Deserialize)]
pub struct ProxyResponse {
    #[serde(default)]
    pub contents: Option<String>,
}

/// Fetches remote pages through a JSON proxy (`GET <proxy>/get?url=<target>`).
#[derive(Debug, Clone)]
pub struct ProxyFetcher {
    client: Client,
    proxy_url: String,
}

impl ProxyFetcher {
    pub fn new(client: Client, proxy_url: &str) -> Self {
        ProxyFetcher {
            client,
            proxy_url: proxy_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn request_url(&self, target_url: &str) -> String {
        format!("{}/get?url={}", self.proxy_url, encode(target_url))
    }

    /// Returns the raw HTML of `target_url`.
    ///
    /// # Errors
    ///
    /// Fails when the proxy is unreachable, answers with a non-success status
    /// or returns a body that is not the expected JSON.
    pub async fn fetch_page(&self, target_url: &str) -> Result<String> {
        let response = self
            .client
            .get(self.request_url(target_url))
            .send()
            .await
            .context("Failed to send request to proxy")?;

        let status = response.status();
        if !status.is_success() {
            bail!("HTTP error! status: {}", status.as_u16());
        }

        let payload: ProxyResponse = response
            .json()
            .await
            .context("Failed to parse proxy response as JSON")?;

        Ok(payload.contents.unwrap_or_default())
    }
}
