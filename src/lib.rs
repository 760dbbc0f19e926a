//! # cleansearch
//!
//! Clean and simple web search.
//!
//! ## Overview
//!
//! cleansearch is a thin search front end split across a network boundary:
//!
//! - **Query Submitter** ([`client`]): validates a query and sends it to the proxy.
//! - **Search Proxy** ([`proxy`]): calls the search provider and normalizes
//!   its answer into [`SearchResult`] records.
//!
//! ```text
//! QuerySubmitter ──POST {query}──▶ SearchProxy ──GET──▶ Brave Search
//!        ◀──── {results} / {error} ────┘ ◀──── web.results ──┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use cleansearch::gateway::{Gateway, GatewayConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GatewayConfig::load_or_default("config.json")?;
//!     let gateway = Gateway::new(config)?;
//!     gateway.run().await?;
//!     Ok(())
//! }
//! ```

pub mod types;
pub mod error;
pub mod provider;
pub mod proxy;
pub mod client;
pub mod gateway;
pub mod cli;

// Re-export commonly used types
pub use types::{Query, SearchResult};
pub use error::{Error, Result};
pub use proxy::{ProxyRequest, ProxyResponse, SearchProxy};
pub use client::{QuerySubmitter, Submission};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
