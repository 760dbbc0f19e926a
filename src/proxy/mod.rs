//! Search proxy for cleansearch.
//!
//! The proxy is the server-side function between the query submitter and
//! the search provider. Each request runs through a fixed sequence:
//!
//! ```text
//! preflight? ──yes──▶ 200, empty body
//!     │ no
//!     ▼
//! parse body ──no query──▶ 400 "Query parameter is required"
//!     │
//!     ▼
//! credential ──missing──▶ 500 "Search service not configured"
//!     │
//!     ▼
//! provider call ──non-2xx / unreachable──▶ 500 "Search failed"
//!     │
//!     ▼
//! translate ──▶ 200 {"results": [...]}
//! ```
//!
//! Every response carries the CORS headers from [`cors`]. Nothing is shared
//! between requests except the immutable provider and credential source.

use std::sync::Arc;

use axum::body::Bytes;
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use tracing::Instrument;
use uuid::Uuid;

use crate::error::ProxyError;
use crate::provider::{translate, SearchProvider};
use crate::types::{ErrorBody, Query, SearchResponse, SearchResult};

pub mod cors;
pub mod credentials;

pub use credentials::{CredentialSource, EnvCredential, StaticCredential};

/// An inbound proxy request, independent of the HTTP server.
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub method: Method,
    pub body: Bytes,
}

impl ProxyRequest {
    pub fn new(method: Method, body: impl Into<Bytes>) -> Self {
        Self {
            method,
            body: body.into(),
        }
    }

    /// A `POST` carrying a JSON body.
    pub fn post_json(body: &serde_json::Value) -> Self {
        Self::new(Method::POST, body.to_string())
    }
}

/// Body of a proxy response.
#[derive(Debug, Clone, PartialEq)]
pub enum ProxyBody {
    /// Preflight responses carry no body.
    Empty,
    Results(Vec<SearchResult>),
    Error(ErrorBody),
}

/// An outbound proxy response.
#[derive(Debug, Clone)]
pub struct ProxyResponse {
    pub status: StatusCode,
    pub body: ProxyBody,
}

impl ProxyResponse {
    /// Response to a CORS preflight.
    pub fn preflight() -> Self {
        Self {
            status: StatusCode::OK,
            body: ProxyBody::Empty,
        }
    }

    pub fn results(results: Vec<SearchResult>) -> Self {
        Self {
            status: StatusCode::OK,
            body: ProxyBody::Results(results),
        }
    }

    pub fn error(err: &ProxyError) -> Self {
        Self {
            status: err.status(),
            body: ProxyBody::Error(ErrorBody::new(err.client_message())),
        }
    }

    /// Response headers: the CORS set, plus a JSON content type when there is a body.
    pub fn headers(&self) -> Vec<(HeaderName, HeaderValue)> {
        let mut headers = cors::cors_headers().to_vec();
        if self.body != ProxyBody::Empty {
            headers.push((
                axum::http::header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            ));
        }
        headers
    }

    /// Serialized body bytes. Empty for preflight responses.
    pub fn body_bytes(&self) -> Vec<u8> {
        let encoded = match &self.body {
            ProxyBody::Empty => return Vec::new(),
            ProxyBody::Results(results) => serde_json::to_vec(&SearchResponse {
                results: results.clone(),
            }),
            ProxyBody::Error(error) => serde_json::to_vec(error),
        };
        // Both bodies are plain string records; serialization cannot fail.
        encoded.unwrap_or_default()
    }
}

/// The search proxy.
#[derive(Clone)]
pub struct SearchProxy {
    provider: Arc<dyn SearchProvider>,
    credentials: Arc<dyn CredentialSource>,
}

impl SearchProxy {
    /// Create a proxy over a provider and a credential source.
    pub fn new(
        provider: Arc<dyn SearchProvider>,
        credentials: Arc<dyn CredentialSource>,
    ) -> Self {
        Self {
            provider,
            credentials,
        }
    }

    /// Handle one request. Never fails: every error becomes a JSON error response.
    pub async fn handle(&self, request: ProxyRequest) -> ProxyResponse {
        if request.method == Method::OPTIONS {
            return ProxyResponse::preflight();
        }

        let span = tracing::info_span!(
            "search",
            request_id = %Uuid::new_v4(),
            provider = self.provider.name()
        );

        async {
            match self.search(&request.body).await {
                Ok(results) => ProxyResponse::results(results),
                Err(err) => {
                    self.log_failure(&err);
                    ProxyResponse::error(&err)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Answer a request whose body the HTTP layer refused to read.
    ///
    /// Preflights still succeed; anything else gets the rejection status as
    /// a JSON error, so oversized bodies carry CORS headers too.
    pub fn reject(
        &self,
        method: &Method,
        status: StatusCode,
        message: impl Into<String>,
    ) -> ProxyResponse {
        if *method == Method::OPTIONS {
            return ProxyResponse::preflight();
        }
        let err = ProxyError::BodyRejected {
            status: status.as_u16(),
            message: message.into(),
        };
        self.log_failure(&err);
        ProxyResponse::error(&err)
    }

    async fn search(&self, body: &[u8]) -> Result<Vec<SearchResult>, ProxyError> {
        let query = parse_query(body)?;
        tracing::info!("Searching for: {}", query);

        let api_key = self.credentials.api_key().ok_or(ProxyError::NotConfigured)?;

        let response = self.provider.web_search(&query, &api_key).await?;
        tracing::info!("Search results received: {}", response.len());

        Ok(translate(response))
    }

    fn log_failure(&self, err: &ProxyError) {
        match err {
            ProxyError::MissingQuery => {
                tracing::debug!("Rejected request without a query");
            }
            ProxyError::NotConfigured => {
                tracing::error!("{} not found", self.credentials.describe());
            }
            ProxyError::Upstream { status, body } => {
                tracing::error!(status, body = %body, "Search provider API error");
            }
            ProxyError::Transport(msg) => {
                tracing::error!("Search provider unreachable: {}", msg);
            }
            ProxyError::InvalidBody(msg) | ProxyError::MalformedResponse(msg) => {
                tracing::error!("Error in search function: {}", msg);
            }
            ProxyError::BodyRejected { status, message } => {
                tracing::warn!(status, "Request body rejected: {}", message);
            }
        }
    }
}

/// Extract the query from a JSON request body.
///
/// A body that is not JSON at all is a fault; a JSON body without a
/// non-empty `query` string is a validation error. The text is passed on
/// unchanged, whitespace included.
fn parse_query(body: &[u8]) -> Result<Query, ProxyError> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| ProxyError::InvalidBody(e.to_string()))?;

    value
        .get("query")
        .and_then(|q| q.as_str())
        .and_then(Query::new)
        .ok_or(ProxyError::MissingQuery)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderResponse;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Provider double that records queries and replays one outcome.
    struct MockProvider {
        outcome: fn() -> Result<ProviderResponse, ProxyError>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl MockProvider {
        fn new(outcome: fn() -> Result<ProviderResponse, ProxyError>) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SearchProvider for MockProvider {
        fn name(&self) -> &str {
            "mock"
        }

        async fn web_search(
            &self,
            query: &Query,
            api_key: &str,
        ) -> Result<ProviderResponse, ProxyError> {
            self.calls
                .lock()
                .unwrap()
                .push((query.to_string(), api_key.to_string()));
            (self.outcome)()
        }
    }

    fn two_results() -> Result<ProviderResponse, ProxyError> {
        Ok(serde_json::from_value(json!({
            "web": { "results": [
                { "title": "Tokio", "url": "https://tokio.rs", "description": "Runtime" },
                { "url": "https://docs.rs" },
            ]}
        }))
        .unwrap())
    }

    fn unavailable() -> Result<ProviderResponse, ProxyError> {
        Err(ProxyError::Upstream {
            status: 503,
            body: "{\"message\":\"quota exceeded\"}".to_string(),
        })
    }

    fn proxy(provider: Arc<MockProvider>, key: StaticCredential) -> SearchProxy {
        SearchProxy::new(provider, Arc::new(key))
    }

    fn body_json(response: &ProxyResponse) -> serde_json::Value {
        serde_json::from_slice(&response.body_bytes()).unwrap()
    }

    #[tokio::test]
    async fn test_successful_search() {
        let provider = MockProvider::new(two_results);
        let proxy = proxy(provider.clone(), StaticCredential::new("key-1"));

        let response = proxy
            .handle(ProxyRequest::post_json(&json!({ "query": "tokio" })))
            .await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(
            body_json(&response),
            json!({ "results": [
                { "title": "Tokio", "url": "https://tokio.rs", "content": "Runtime" },
                { "title": "Untitled", "url": "https://docs.rs", "content": "No description available" },
            ]})
        );
        assert_eq!(provider.calls(), vec![("tokio".to_string(), "key-1".to_string())]);
    }

    #[tokio::test]
    async fn test_missing_query() {
        let provider = MockProvider::new(two_results);
        let proxy = proxy(provider.clone(), StaticCredential::new("key"));

        for body in [json!({}), json!({ "query": 42 }), json!({ "query": "" }), json!("tokio")] {
            let response = proxy.handle(ProxyRequest::post_json(&body)).await;
            assert_eq!(response.status, StatusCode::BAD_REQUEST);
            assert_eq!(body_json(&response), json!({ "error": "Query parameter is required" }));
        }
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_credential_skips_provider() {
        let provider = MockProvider::new(two_results);
        let proxy = proxy(provider.clone(), StaticCredential::missing());

        let response = proxy
            .handle(ProxyRequest::post_json(&json!({ "query": "tokio" })))
            .await;

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(&response), json!({ "error": "Search service not configured" }));
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_provider_failure_hides_detail() {
        let provider = MockProvider::new(unavailable);
        let proxy = proxy(provider, StaticCredential::new("key"));

        let response = proxy
            .handle(ProxyRequest::post_json(&json!({ "query": "tokio" })))
            .await;

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(&response);
        assert_eq!(body, json!({ "error": "Search failed" }));
        assert!(body.get("results").is_none());
    }

    #[tokio::test]
    async fn test_invalid_json_body() {
        let provider = MockProvider::new(two_results);
        let proxy = proxy(provider.clone(), StaticCredential::new("key"));

        let response = proxy
            .handle(ProxyRequest::new(Method::POST, "query=tokio"))
            .await;

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(&response);
        let message = body["error"].as_str().unwrap();
        assert!(!message.is_empty());
        assert!(body.get("results").is_none());
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_preflight_ignores_body() {
        let provider = MockProvider::new(two_results);
        let proxy = proxy(provider.clone(), StaticCredential::missing());

        let response = proxy
            .handle(ProxyRequest::new(Method::OPTIONS, "definitely not json"))
            .await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, ProxyBody::Empty);
        assert!(response.body_bytes().is_empty());

        let names: Vec<_> = response.headers().iter().map(|(n, _)| n.as_str().to_string()).collect();
        assert_eq!(
            names,
            vec!["access-control-allow-origin", "access-control-allow-headers"]
        );
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_error_responses_carry_cors() {
        let provider = MockProvider::new(unavailable);
        let proxy = proxy(provider, StaticCredential::new("key"));

        let response = proxy
            .handle(ProxyRequest::post_json(&json!({ "query": "tokio" })))
            .await;

        let headers = response.headers();
        assert!(headers
            .iter()
            .any(|(n, v)| n.as_str() == "access-control-allow-origin" && *v == "*"));
        assert!(headers
            .iter()
            .any(|(n, v)| n.as_str() == "content-type" && *v == "application/json"));
    }

    fn empty_results() -> Result<ProviderResponse, ProxyError> {
        Ok(serde_json::from_value(json!({ "web": { "results": [] } })).unwrap())
    }

    #[tokio::test]
    async fn test_rejected_body() {
        let provider = MockProvider::new(two_results);
        let proxy = proxy(provider.clone(), StaticCredential::new("key"));

        let response = proxy.reject(
            &Method::POST,
            StatusCode::PAYLOAD_TOO_LARGE,
            "length limit exceeded",
        );
        assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body_json(&response), json!({ "error": "length limit exceeded" }));
        assert!(response
            .headers()
            .iter()
            .any(|(n, v)| n.as_str() == "access-control-allow-origin" && *v == "*"));

        let preflight = proxy.reject(&Method::OPTIONS, StatusCode::PAYLOAD_TOO_LARGE, "");
        assert_eq!(preflight.status, StatusCode::OK);
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_query_forwarded_unchanged() {
        let provider = MockProvider::new(two_results);
        let proxy = proxy(provider.clone(), StaticCredential::new("key"));

        for text in ["  rust  ", "   "] {
            let response = proxy
                .handle(ProxyRequest::post_json(&json!({ "query": text })))
                .await;
            assert_eq!(response.status, StatusCode::OK);
        }
        assert_eq!(
            provider.calls(),
            vec![
                ("  rust  ".to_string(), "key".to_string()),
                ("   ".to_string(), "key".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_no_provider_results() {
        let provider = MockProvider::new(empty_results);
        let proxy = proxy(provider.clone(), StaticCredential::new("key"));

        let response = proxy
            .handle(ProxyRequest::post_json(&json!({ "query": "zzzxqv" })))
            .await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(body_json(&response), json!({ "results": [] }));
        assert_eq!(provider.calls().len(), 1);
    }
}
