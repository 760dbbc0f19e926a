//! Gateway module for cleansearch.
//!
//! The gateway hosts the search proxy: it turns a [`GatewayConfig`] into a
//! provider, a credential source and an HTTP server.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                   Gateway                     │
//! │  ┌────────────┐   ┌────────────────────────┐  │
//! │  │ SearchServer│──▶│      SearchProxy       │  │
//! │  │  (axum)     │   │ ┌──────────┐ ┌───────┐ │  │
//! │  └────────────┘   │ │ Provider │ │ Creds │ │  │
//! │                   │ └──────────┘ └───────┘ │  │
//! │                   └────────────────────────┘  │
//! └──────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod server;

pub use config::{GatewayConfig, LoggingConfig, ProviderConfig, ServerConfig};
pub use server::SearchServer;

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::provider::BraveProvider;
use crate::proxy::{EnvCredential, SearchProxy};

/// Main Gateway structure.
pub struct Gateway {
    config: GatewayConfig,
    proxy: SearchProxy,
}

impl Gateway {
    /// Create a gateway from a validated configuration.
    ///
    /// A missing API key is not an error here; it is reported per request.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        config.validate()?;

        let provider = BraveProvider::with_endpoint(
            config.provider.endpoint.clone(),
            config.provider.result_count,
        );
        let credentials = EnvCredential::new(config.provider.api_key_env.clone());
        let proxy = SearchProxy::new(Arc::new(provider), Arc::new(credentials));

        Ok(Self { config, proxy })
    }

    /// The proxy this gateway serves.
    pub fn proxy(&self) -> &SearchProxy {
        &self.proxy
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Start the gateway and serve until the listener fails.
    pub async fn run(&self) -> Result<()> {
        let server = SearchServer::new(
            self.proxy.clone(),
            &self.config.server.host,
            self.config.server.port,
            &self.config.server.path,
        )
        .with_body_limit(self.config.server.max_body_bytes);
        server.start().await.map_err(Error::from)
    }
}
