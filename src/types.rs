//! Core types for cleansearch.
//!
//! This module defines the data that crosses the proxy boundary: the user's
//! query, the normalized search result, and the JSON bodies exchanged between
//! the query submitter and the search proxy.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Title used when the provider omits one.
pub const DEFAULT_TITLE: &str = "Untitled";

/// URL used when the provider omits one.
pub const DEFAULT_URL: &str = "";

/// Description used when the provider omits one.
pub const DEFAULT_CONTENT: &str = "No description available";

/// A user query, carried exactly as typed.
///
/// A `Query` is never empty. Whitespace is kept as-is all the way to the
/// provider. A `Query` only exists for the duration of one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Query(String);

impl Query {
    /// Wrap query text unchanged. Returns `None` for the empty string.
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.is_empty() {
            None
        } else {
            Some(Self(text))
        }
    }

    /// Accept user input worth submitting.
    ///
    /// Returns `None` when the input is blank after trimming; otherwise the
    /// input is kept untouched, surrounding whitespace included.
    pub fn from_input(input: &str) -> Option<Self> {
        if input.trim().is_empty() {
            None
        } else {
            Self::new(input)
        }
    }

    /// Get the query text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A normalized search result.
///
/// Every field is always populated, either with provider data or with the
/// documented default ([`DEFAULT_TITLE`], [`DEFAULT_URL`], [`DEFAULT_CONTENT`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Display text
    pub title: String,
    /// Absolute link, empty when the provider had none
    pub url: String,
    /// Short description
    pub content: String,
}

impl SearchResult {
    /// Create a new search result.
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            content: content.into(),
        }
    }

    /// The host part of the URL, without scheme or path.
    ///
    /// `https://www.rust-lang.org/learn` displays as `www.rust-lang.org`.
    pub fn display_host(&self) -> &str {
        let rest = self
            .url
            .strip_prefix("https://")
            .or_else(|| self.url.strip_prefix("http://"))
            .unwrap_or(&self.url);
        rest.split('/').next().unwrap_or_default()
    }
}

impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.title, self.url)
    }
}

/// Request body sent by the query submitter.
#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest<'a> {
    pub query: &'a str,
}

/// Successful proxy response body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
}

/// Error proxy response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
