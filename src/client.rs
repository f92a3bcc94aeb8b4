//! HTTP client for the remote book catalog API (Gutendex).
//!
//! Issues a single search request per invocation and hands the raw
//! response body to the normalizer. No retries, no backoff.

use crate::config::ApiConfig;
use crate::error::ClientError;
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

/// Trait for book search backends.
///
/// The HTTP client implements this against the real API; tests substitute
/// an in-memory stub so the pipeline can run without a network.
#[async_trait]
pub trait BookSearch: Send + Sync {
    /// Searches the catalog by free-text title and returns the raw
    /// response body, unparsed.
    async fn search(&self, title: &str) -> Result<String, ClientError>;
}

/// Client for the Gutendex book search endpoint.
pub struct GutendexClient {
    client: reqwest::Client,
    base_url: Url,
}

impl GutendexClient {
    /// Creates a new client from API configuration.
    ///
    /// The timeout applies to the whole request and surfaces as
    /// [`ClientError::Timeout`] rather than a generic transport failure.
    pub fn new(config: &ApiConfig) -> Result<Self, ClientError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|_| ClientError::InvalidBaseUrl(config.base_url.clone()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, base_url })
    }

    /// Builds the search URL for a title.
    ///
    /// Spaces become `+` as the API expects; other special characters are
    /// passed through unescaped. Matches the original consumer's behavior.
    fn search_url(&self, title: &str) -> String {
        format!("{}?search={}", self.base_url, title.replace(' ', "+"))
    }
}

#[async_trait]
impl BookSearch for GutendexClient {
    async fn search(&self, title: &str) -> Result<String, ClientError> {
        let url = self.search_url(title);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(ClientError::Status(response.status()));
        }

        Ok(response.text().await?)
    }
}
