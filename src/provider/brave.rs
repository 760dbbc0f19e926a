//! Brave Search API provider.
//!
//! [Brave Search](https://brave.com/search/api/) serves web results from its
//! own index. Requests carry the API key in `X-Subscription-Token`.

use async_trait::async_trait;
use reqwest::header::ACCEPT;

use super::{ProviderResponse, SearchProvider};
use crate::error::ProxyError;
use crate::types::Query;

/// Brave web search endpoint.
pub const BRAVE_API_URL: &str = "https://api.search.brave.com/res/v1/web/search";

/// Number of results requested per search.
pub const DEFAULT_RESULT_COUNT: u32 = 10;

/// Header carrying the Brave API key.
const SUBSCRIPTION_HEADER: &str = "X-Subscription-Token";

/// Brave Search provider.
#[derive(Debug, Clone)]
pub struct BraveProvider {
    client: reqwest::Client,
    endpoint: String,
    count: u32,
}

impl BraveProvider {
    /// Create a provider for the public Brave endpoint.
    pub fn new() -> Self {
        Self::with_endpoint(BRAVE_API_URL, DEFAULT_RESULT_COUNT)
    }

    /// Create a provider for a specific endpoint and page size.
    pub fn with_endpoint(endpoint: impl Into<String>, count: u32) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            count,
        }
    }

    /// The endpoint searches are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for BraveProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchProvider for BraveProvider {
    fn name(&self) -> &str {
        "brave"
    }

    async fn web_search(
        &self,
        query: &Query,
        api_key: &str,
    ) -> Result<ProviderResponse, ProxyError> {
        let count = self.count.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query.as_str()), ("count", count.as_str())])
            .header(ACCEPT, "application/json")
            .header(SUBSCRIPTION_HEADER, api_key)
            .send()
            .await
            .map_err(|e| ProxyError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProxyError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProxyError::Transport(e.to_string()))?;

        serde_json::from_slice(&bytes).map_err(|e| ProxyError::MalformedResponse(e.to_string()))
    }
}
