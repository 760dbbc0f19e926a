//! Query submitter for cleansearch.
//!
//! The submitter is the client side of the proxy: it validates the user's
//! input, issues exactly one call to the search proxy, and collapses every
//! failure into an empty result list plus a [`Notification`] delivered to a
//! callback. Failures never escape `submit`, so callers can keep searching.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cleansearch::client::{HttpTransport, QuerySubmitter, Submission};
//!
//! let submitter = QuerySubmitter::new(HttpTransport::new("http://127.0.0.1:8080/functions/v1/search"))
//!     .on_failure(|n| eprintln!("{}: {}", n.title, n.description));
//!
//! if let Submission::Completed(results) = submitter.submit("rust async").await {
//!     println!("About {} results", results.len());
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;

use crate::error::SubmitError;
use crate::types::{ErrorBody, Query, SearchRequest, SearchResult};

/// Title of the failure notification.
pub const FAILURE_TITLE: &str = "Search failed";

/// Description of the failure notification.
pub const FAILURE_DESCRIPTION: &str = "Unable to complete search. Please try again.";

/// Carries one query to the search proxy.
#[async_trait]
pub trait ProxyTransport: Send + Sync {
    /// Send the query and return the proxy's results.
    async fn invoke(&self, query: &Query) -> Result<Vec<SearchResult>, SubmitError>;
}

/// Transport that POSTs JSON to a proxy over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: None,
        }
    }

    /// Send `apikey` and `Authorization: Bearer` headers, as hosted function
    /// gateways expect.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Proxy success body as seen by the client. `results` may be absent.
#[derive(Debug, Deserialize)]
struct ProxyReply {
    #[serde(default)]
    results: Option<Vec<SearchResult>>,
}

#[async_trait]
impl ProxyTransport for HttpTransport {
    async fn invoke(&self, query: &Query) -> Result<Vec<SearchResult>, SubmitError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&SearchRequest {
                query: query.as_str(),
            });

        if let Some(key) = &self.api_key {
            request = request
                .header("apikey", key)
                .header(AUTHORIZATION, format!("Bearer {}", key));
        }

        let response = request
            .send()
            .await
            .map_err(|e| SubmitError::Transport(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| SubmitError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&bytes)
                .map(|body| body.error)
                .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).into_owned());
            return Err(SubmitError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let reply: ProxyReply =
            serde_json::from_slice(&bytes).map_err(|e| SubmitError::Malformed(e.to_string()))?;

        Ok(reply.results.unwrap_or_default())
    }
}

/// A transient, user-visible failure notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub at: DateTime<Utc>,
}

impl Notification {
    /// The notice shown for any failed search.
    pub fn search_failed() -> Self {
        Self {
            title: FAILURE_TITLE.to_string(),
            description: FAILURE_DESCRIPTION.to_string(),
            at: Utc::now(),
        }
    }
}

/// Outcome of one `submit` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Blank input: nothing was sent and the caller's state stays as it was.
    Skipped,
    /// The call finished. Empty on failure.
    Completed(Vec<SearchResult>),
}

type FailureCallback = Arc<dyn Fn(&Notification) + Send + Sync>;

/// Client-side query submitter.
#[derive(Clone)]
pub struct QuerySubmitter {
    transport: Arc<dyn ProxyTransport>,
    on_failure: Option<FailureCallback>,
}

impl QuerySubmitter {
    pub fn new(transport: impl ProxyTransport + 'static) -> Self {
        Self::with_transport(Arc::new(transport))
    }

    pub fn with_transport(transport: Arc<dyn ProxyTransport>) -> Self {
        Self {
            transport,
            on_failure: None,
        }
    }

    /// Register the callback that receives failure notifications.
    pub fn on_failure(mut self, callback: impl Fn(&Notification) + Send + Sync + 'static) -> Self {
        self.on_failure = Some(Arc::new(callback));
        self
    }

    /// Submit a query.
    ///
    /// Blank input issues no call. Any failure resolves to an empty list and
    /// fires the failure callback.
    pub async fn submit(&self, input: &str) -> Submission {
        let Some(query) = Query::from_input(input) else {
            return Submission::Skipped;
        };

        match self.transport.invoke(&query).await {
            Ok(results) => Submission::Completed(results),
            Err(err) => {
                tracing::error!("Search error: {}", err);
                if let Some(callback) = &self.on_failure {
                    callback(&Notification::search_failed());
                }
                Submission::Completed(Vec::new())
            }
        }
    }
}

impl fmt::Debug for QuerySubmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuerySubmitter")
            .field("on_failure", &self.on_failure.is_some())
            .finish()
    }
}

/// The state behind a search page: the typed query and the last results.
#[derive(Debug)]
pub struct SearchSession {
    submitter: QuerySubmitter,
    query: String,
    results: Vec<SearchResult>,
    has_searched: bool,
}

impl SearchSession {
    pub fn new(submitter: QuerySubmitter) -> Self {
        Self {
            submitter,
            query: String::new(),
            results: Vec::new(),
            has_searched: false,
        }
    }

    /// Replace the typed query text.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn has_searched(&self) -> bool {
        self.has_searched
    }

    /// Submit the current query text.
    ///
    /// Returns `false` when the query was blank and nothing changed.
    pub async fn search(&mut self) -> bool {
        if Query::from_input(&self.query).is_none() {
            return false;
        }
        self.has_searched = true;

        match self.submitter.submit(&self.query).await {
            Submission::Completed(results) => {
                self.results = results;
                true
            }
            Submission::Skipped => false,
        }
    }

    /// Back to the initial state: no query, no results, nothing searched.
    pub fn reset(&mut self) {
        self.query.clear();
        self.results.clear();
        self.has_searched = false;
    }
}
