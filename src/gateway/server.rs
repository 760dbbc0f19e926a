//! HTTP server for the search gateway.
//!
//! Mounts the [`SearchProxy`] on one route and forwards every request on
//! that route to it, whatever the method, so that preflights and malformed
//! requests still get the proxy's CORS headers and JSON errors.

use std::net::SocketAddr;

use axum::{
    body::{Body, Bytes},
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::Method,
    response::{IntoResponse, Response},
    routing::{any, get},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::error::ServerError;
use crate::gateway::config::DEFAULT_MAX_BODY_BYTES;
use crate::proxy::{ProxyRequest, ProxyResponse, SearchProxy};

impl IntoResponse for ProxyResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body_bytes()));
        *response.status_mut() = self.status;

        let headers = response.headers_mut();
        for (name, value) in self.headers() {
            headers.insert(name, value);
        }

        response
    }
}

/// Search gateway HTTP server.
pub struct SearchServer {
    proxy: SearchProxy,

    /// Server configuration
    host: String,
    port: u16,
    path: String,
    max_body_bytes: usize,
}

impl SearchServer {
    /// Create a new search server.
    pub fn new(proxy: SearchProxy, host: &str, port: u16, path: &str) -> Self {
        Self {
            proxy,
            host: host.to_string(),
            port,
            path: path.to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Set the largest request body the search route will read.
    pub fn with_body_limit(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    /// Build the router.
    pub fn router(&self) -> Router {
        Router::new()
            .route(&self.path, any(Self::search_handler))
            .route("/health", get(Self::health_handler))
            .layer(DefaultBodyLimit::max(self.max_body_bytes))
            .layer(TraceLayer::new_for_http())
            .with_state(self.proxy.clone())
    }

    /// Start the server.
    pub async fn start(&self) -> Result<(), ServerError> {
        let addr: SocketAddr = format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ServerError::InvalidAddress(format!("{}", e)))?;

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind(e.to_string()))?;

        let local = listener
            .local_addr()
            .map_err(|e| ServerError::Bind(e.to_string()))?;
        tracing::info!("Search gateway listening on http://{}{}", local, self.path);

        axum::serve(listener, self.router())
            .await
            .map_err(|e| ServerError::Serve(e.to_string()))
    }

    /// Search function handler.
    ///
    /// Body rejections (oversized, unreadable) are answered by the proxy too,
    /// so they carry the same CORS headers as every other response.
    async fn search_handler(
        State(proxy): State<SearchProxy>,
        method: Method,
        body: Result<Bytes, BytesRejection>,
    ) -> ProxyResponse {
        match body {
            Ok(body) => proxy.handle(ProxyRequest::new(method, body)).await,
            Err(rejection) => proxy.reject(&method, rejection.status(), rejection.body_text()),
        }
    }

    /// Health check handler.
    async fn health_handler() -> &'static str {
        "ok"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::BraveProvider;
    use crate::proxy::StaticCredential;
    use axum::http::StatusCode;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const PATH: &str = "/functions/v1/search";

    /// Serve `router` on an ephemeral port and return its base URL.
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    /// A provider stand-in that answers with a fixed status and body, counting hits.
    async fn spawn_provider(status: StatusCode, body: serde_json::Value) -> (String, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let router = Router::new().route(
            "/res/v1/web/search",
            get(move || {
                let counter = counter.clone();
                let body = body.to_string();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    (status, body)
                }
            }),
        );
        let base = serve(router).await;
        (format!("{}/res/v1/web/search", base), hits)
    }

    async fn spawn_gateway(provider_url: &str, credential: StaticCredential) -> String {
        let proxy = SearchProxy::new(
            Arc::new(BraveProvider::with_endpoint(provider_url, 10)),
            Arc::new(credential),
        );
        let server = SearchServer::new(proxy, "127.0.0.1", 0, PATH);
        format!("{}{}", serve(server.router()).await, PATH)
    }

    fn assert_cors(response: &reqwest::Response) {
        let headers = response.headers();
        assert_eq!(headers["access-control-allow-origin"], "*");
        assert_eq!(
            headers["access-control-allow-headers"],
            "authorization, x-client-info, apikey, content-type"
        );
    }

    #[tokio::test]
    async fn test_end_to_end_search() {
        let (provider, hits) = spawn_provider(
            StatusCode::OK,
            json!({ "web": { "results": [
                { "title": "Axum", "url": "https://docs.rs/axum", "description": "Web framework" },
                { "title": "Tower", "url": "https://docs.rs/tower" },
            ]}}),
        )
        .await;
        let gateway = spawn_gateway(&provider, StaticCredential::new("key")).await;

        let response = reqwest::Client::new()
            .post(&gateway)
            .json(&json!({ "query": "rust web" }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 200);
        assert_cors(&response);
        assert_eq!(response.headers()["content-type"], "application/json");

        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(
            body,
            json!({ "results": [
                { "title": "Axum", "url": "https://docs.rs/axum", "content": "Web framework" },
                { "title": "Tower", "url": "https://docs.rs/tower", "content": "No description available" },
            ]})
        );
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_preflight() {
        let (provider, hits) = spawn_provider(StatusCode::OK, json!({})).await;
        let gateway = spawn_gateway(&provider, StaticCredential::missing()).await;

        let response = reqwest::Client::new()
            .request(reqwest::Method::OPTIONS, &gateway)
            .body("garbage")
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 200);
        assert_cors(&response);
        assert!(response.text().await.unwrap().is_empty());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_provider_unavailable() {
        let (provider, hits) =
            spawn_provider(StatusCode::SERVICE_UNAVAILABLE, json!({ "message": "down" })).await;
        let gateway = spawn_gateway(&provider, StaticCredential::new("key")).await;

        let response = reqwest::Client::new()
            .post(&gateway)
            .json(&json!({ "query": "rust" }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 500);
        assert_cors(&response);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body, json!({ "error": "Search failed" }));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_credential() {
        let (provider, hits) = spawn_provider(StatusCode::OK, json!({})).await;
        let gateway = spawn_gateway(&provider, StaticCredential::missing()).await;

        let response = reqwest::Client::new()
            .post(&gateway)
            .json(&json!({ "query": "rust" }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 500);
        assert_cors(&response);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body, json!({ "error": "Search service not configured" }));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_query() {
        let (provider, _) = spawn_provider(StatusCode::OK, json!({})).await;
        let gateway = spawn_gateway(&provider, StaticCredential::new("key")).await;

        let response = reqwest::Client::new()
            .post(&gateway)
            .json(&json!({ "q": "rust" }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 400);
        assert_cors(&response);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body, json!({ "error": "Query parameter is required" }));
    }

    #[tokio::test]
    async fn test_oversized_body_carries_cors() {
        let (provider, hits) = spawn_provider(StatusCode::OK, json!({})).await;
        let proxy = SearchProxy::new(
            Arc::new(BraveProvider::with_endpoint(&provider, 10)),
            Arc::new(StaticCredential::new("key")),
        );
        let server = SearchServer::new(proxy, "127.0.0.1", 0, PATH).with_body_limit(16);
        let gateway = format!("{}{}", serve(server.router()).await, PATH);

        let response = reqwest::Client::new()
            .post(&gateway)
            .json(&json!({ "query": "a".repeat(64) }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 413);
        assert_cors(&response);
        assert_eq!(response.headers()["content-type"], "application/json");
        let body: serde_json::Value = response.json().await.unwrap();
        assert!(!body["error"].as_str().unwrap().is_empty());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_whitespace_query_reaches_provider() {
        let (provider, hits) =
            spawn_provider(StatusCode::OK, json!({ "web": { "results": [] } })).await;
        let gateway = spawn_gateway(&provider, StaticCredential::new("key")).await;

        let response = reqwest::Client::new()
            .post(&gateway)
            .json(&json!({ "query": "   " }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 200);
        assert_cors(&response);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body, json!({ "results": [] }));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_health() {
        let proxy = SearchProxy::new(
            Arc::new(BraveProvider::new()),
            Arc::new(StaticCredential::missing()),
        );
        let base = serve(SearchServer::new(proxy, "127.0.0.1", 0, PATH).router()).await;

        let body = reqwest::get(format!("{}/health", base))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "ok");
    }
}
