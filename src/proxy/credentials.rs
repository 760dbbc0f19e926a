//! Provider credential sources.
//!
//! The proxy asks its credential source for the API key on every request.
//! Nothing here caches the key.

use std::fmt;

/// Environment variable holding the Brave API key.
pub const DEFAULT_API_KEY_ENV: &str = "BRAVE_SEARCH_API_KEY";

/// Supplies the provider API key.
pub trait CredentialSource: Send + Sync {
    /// Current API key, or `None` when not configured. Empty keys count as missing.
    fn api_key(&self) -> Option<String>;

    /// Where the key comes from, for log messages. Must not include the key.
    fn describe(&self) -> String;
}

/// Reads the key from an environment variable at call time.
#[derive(Debug, Clone)]
pub struct EnvCredential {
    var: String,
}

impl EnvCredential {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    pub fn var(&self) -> &str {
        &self.var
    }
}

impl Default for EnvCredential {
    fn default() -> Self {
        Self::new(DEFAULT_API_KEY_ENV)
    }
}

impl CredentialSource for EnvCredential {
    fn api_key(&self) -> Option<String> {
        std::env::var(&self.var).ok().filter(|key| !key.is_empty())
    }

    fn describe(&self) -> String {
        self.var.clone()
    }
}

/// A fixed key, mostly for tests and embedding.
#[derive(Clone, Default)]
pub struct StaticCredential(Option<String>);

impl StaticCredential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(Some(key.into()))
    }

    /// A source that never has a key.
    pub fn missing() -> Self {
        Self(None)
    }
}

impl fmt::Debug for StaticCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.0.is_some() { "set" } else { "missing" };
        write!(f, "StaticCredential({})", state)
    }
}

impl CredentialSource for StaticCredential {
    fn api_key(&self) -> Option<String> {
        self.0.clone().filter(|key| !key.is_empty())
    }

    fn describe(&self) -> String {
        "static credential".to_string()
    }
}
