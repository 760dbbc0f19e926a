//! Search providers for cleansearch.
//!
//! A provider is the third-party web search API the proxy calls. Its
//! response is ingested into an explicit optional-field structure
//! ([`ProviderResponse`]) and normalized exactly once by [`translate`].
//!
//! Ingestion never fails on well-formed JSON. Anything in the wrong shape
//! counts as missing: a `web` that is not an object or a `results` that is
//! not an array yields no results, and an entry that is not an object
//! becomes a result made entirely of defaults.
//!
//! ## Supported Providers
//!
//! | Provider | Credential header       | Module    |
//! |----------|-------------------------|-----------|
//! | Brave    | `X-Subscription-Token`  | [`brave`] |

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::ProxyError;
use crate::types::{Query, SearchResult, DEFAULT_CONTENT, DEFAULT_TITLE, DEFAULT_URL};

pub mod brave;

pub use brave::BraveProvider;

/// Trait that all search providers must implement.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Get the provider identifier (e.g., "brave").
    fn name(&self) -> &str;

    /// Run one web search.
    ///
    /// The credential is passed per call and must never be logged.
    async fn web_search(&self, query: &Query, api_key: &str)
        -> Result<ProviderResponse, ProxyError>;
}

/// Raw provider response, as ingested.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "Value")]
pub struct ProviderResponse {
    pub web: Option<WebResults>,
}

/// The `web` section of a provider response.
#[derive(Debug, Clone, Default)]
pub struct WebResults {
    pub results: Option<Vec<ProviderEntry>>,
}

/// One raw result entry. Any field may be missing.
#[derive(Debug, Clone, Default)]
pub struct ProviderEntry {
    pub title: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
}

impl From<Value> for ProviderResponse {
    fn from(value: Value) -> Self {
        let web = value.get("web").and_then(Value::as_object).map(|web| WebResults {
            results: web.get("results").and_then(Value::as_array).map(|entries| {
                entries.iter().map(ProviderEntry::from_value).collect()
            }),
        });
        Self { web }
    }
}

impl ProviderEntry {
    fn from_value(value: &Value) -> Self {
        match value.as_object() {
            Some(fields) => Self {
                title: non_empty_string(fields, "title"),
                url: non_empty_string(fields, "url"),
                description: non_empty_string(fields, "description"),
            },
            None => Self::default(),
        }
    }
}

impl ProviderResponse {
    /// Number of raw entries under `web.results`.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entries(&self) -> &[ProviderEntry] {
        self.web
            .as_ref()
            .and_then(|web| web.results.as_deref())
            .unwrap_or_default()
    }
}

impl From<ProviderEntry> for SearchResult {
    fn from(entry: ProviderEntry) -> Self {
        SearchResult {
            title: entry.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            url: entry.url.unwrap_or_else(|| DEFAULT_URL.to_string()),
            content: entry.description.unwrap_or_else(|| DEFAULT_CONTENT.to_string()),
        }
    }
}

/// Normalize a provider response into search results.
///
/// Provider order is preserved. An absent result list yields no results.
pub fn translate(response: ProviderResponse) -> Vec<SearchResult> {
    response
        .web
        .and_then(|web| web.results)
        .unwrap_or_default()
        .into_iter()
        .map(SearchResult::from)
        .collect()
}

/// Keep only non-empty strings; anything else counts as missing.
fn non_empty_string(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}
