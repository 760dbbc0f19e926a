//! cleansearch CLI entry point.
//!
//! This is the main binary for cleansearch.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cleansearch::cli::{expand_path, render_notification, render_results, DEFAULT_CONFIG_PATH};
use cleansearch::client::{HttpTransport, QuerySubmitter, Submission};
use cleansearch::gateway::{Gateway, GatewayConfig};

/// Search the web, clean and simple.
#[derive(Parser)]
#[command(name = "cleansearch")]
#[command(about = "Search the web, clean and simple.")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(short, long, env = "CLEANSEARCH_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the search proxy
    Serve {
        /// Host to bind to
        #[arg(long, env = "CLEANSEARCH_HOST")]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long, env = "CLEANSEARCH_PORT")]
        port: Option<u16>,
    },

    /// Search through a running proxy
    Search {
        /// Search query
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Proxy URL (defaults to the configured local server)
        #[arg(long, env = "CLEANSEARCH_ENDPOINT")]
        endpoint: Option<String>,

        /// Key sent to the proxy as `apikey` and bearer token
        #[arg(long, env = "CLEANSEARCH_ANON_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current config
    Show,

    /// Validate config
    Validate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = expand_path(&cli.config);
    let mut config = GatewayConfig::load_or_default(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    // Initialize logging
    let log_level = if cli.verbose {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            let gateway = Gateway::new(config).context("Invalid configuration")?;
            if std::env::var(&gateway.config().provider.api_key_env).is_err() {
                tracing::warn!(
                    "{} is not set; searches will fail until it is",
                    gateway.config().provider.api_key_env
                );
            }
            gateway.run().await?;
        }

        Commands::Search {
            query,
            endpoint,
            api_key,
        } => {
            let query = query.join(" ");
            let endpoint = endpoint.unwrap_or_else(|| {
                format!("http://{}{}", config.server_addr(), config.server.path)
            });

            let mut transport = HttpTransport::new(endpoint);
            if let Some(key) = api_key {
                transport = transport.with_api_key(key);
            }

            let submitter = QuerySubmitter::new(transport)
                .on_failure(|n| eprintln!("{}", render_notification(n)));

            match submitter.submit(&query).await {
                Submission::Skipped => {
                    println!("Nothing to search for");
                }
                Submission::Completed(results) => {
                    print!("{}", render_results(&query, &results));
                }
            }
        }

        Commands::Config { action } => match action {
            ConfigCommands::Show => {
                println!("Config path: {}", config_path.display());
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
            ConfigCommands::Validate => {
                config.validate()?;
                println!("Configuration is valid");
            }
        },
    }

    Ok(())
}
