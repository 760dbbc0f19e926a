//! Error types for cleansearch.
//!
//! This module defines all error types used throughout the system.

use axum::http::StatusCode;
use thiserror::Error;

/// Message returned when the request carries no usable query.
pub const MSG_QUERY_REQUIRED: &str = "Query parameter is required";

/// Message returned when the provider credential is missing.
pub const MSG_NOT_CONFIGURED: &str = "Search service not configured";

/// Message returned for any provider-side failure.
pub const MSG_SEARCH_FAILED: &str = "Search failed";

/// Message returned for faults that carry no message of their own.
pub const MSG_INTERNAL: &str = "Internal server error";

/// Errors that stop the gateway from starting or serving.
///
/// Per-request failures never surface here: the proxy turns them into
/// responses ([`ProxyError`]) and the submitter into notifications
/// ([`SubmitError`]).
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Server errors
    #[error("Server error: {0}")]
    Server(#[from] ServerError),
}

/// Result type alias for cleansearch.
pub type Result<T> = std::result::Result<T, Error>;

/// Per-request failures of the search proxy.
///
/// Every variant maps to exactly one HTTP status and one client-facing
/// message. Provider detail stays in the variant for server-side logging.
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("query missing or not a string")]
    MissingQuery,

    #[error("provider credential not configured")]
    NotConfigured,

    #[error("provider returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("provider unreachable: {0}")]
    Transport(String),

    #[error("{0}")]
    InvalidBody(String),

    #[error("{0}")]
    MalformedResponse(String),

    /// The HTTP layer refused the body before it reached the proxy, e.g.
    /// because it exceeded the size limit.
    #[error("request body rejected ({status}): {message}")]
    BodyRejected { status: u16, message: String },
}

impl ProxyError {
    /// HTTP status reported to the caller.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MissingQuery => StatusCode::BAD_REQUEST,
            ProxyError::BodyRejected { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message placed in the `error` field of the response body.
    pub fn client_message(&self) -> String {
        match self {
            ProxyError::MissingQuery => MSG_QUERY_REQUIRED.to_string(),
            ProxyError::NotConfigured => MSG_NOT_CONFIGURED.to_string(),
            ProxyError::Upstream { .. } | ProxyError::Transport(_) => {
                MSG_SEARCH_FAILED.to_string()
            }
            ProxyError::InvalidBody(msg)
            | ProxyError::MalformedResponse(msg)
            | ProxyError::BodyRejected { message: msg, .. } => {
                if msg.is_empty() {
                    MSG_INTERNAL.to_string()
                } else {
                    msg.clone()
                }
            }
        }
    }
}

/// Failures seen by the query submitter when talking to the proxy.
#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("proxy returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Errors related to Configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid config value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Errors related to the HTTP server.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Bind failed: {0}")]
    Bind(String),

    #[error("Serve failed: {0}")]
    Serve(String),
}
