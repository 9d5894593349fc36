mod cli;

use unfurl::cache::{CacheStore, MemoryStore};
use unfurl::resolution::ResolutionService;
use unfurl::resolver::PageResolver;
use unfurl::{config, server};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "unfurl=trace,unfurl_core=debug,tower_http=debug".to_string()
        } else {
            "unfurl=debug,unfurl_core=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Serve { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(serve(host, port, cli.config.as_deref()))
        }
        Commands::Resolve { url, timeout_secs } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(resolve_once(&url, timeout_secs, cli.config.as_deref()))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("unfurl {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn serve(host: Option<String>, port: Option<u16>, config_path: Option<&Path>) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    // Override host/port from CLI if specified
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!("Starting unfurl server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    server::start_server(config).await
}

/// Resolve one URL against a throwaway in-memory cache and print the payload.
async fn resolve_once(
    url: &str,
    timeout_secs: Option<u64>,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;
    if let Some(secs) = timeout_secs {
        config.resolution.timeout_secs = secs;
    }

    let resolver = Arc::new(PageResolver::new(&config.resolution));
    let cache: Arc<dyn CacheStore> = Arc::new(MemoryStore::new());
    let service = ResolutionService::new(
        resolver,
        cache,
        Duration::from_secs(config.resolution.timeout_secs),
    );

    let resolution = service
        .resolve(url, false)
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    println!("{}", serde_json::to_string_pretty(&resolution.media)?);
    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!(
                "  Resolution timeout: {}s",
                config.resolution.timeout_secs
            );
            println!("  Document cache: {}", config.cache.document_dir.display());
            println!(
                "  Upstream purge: {}",
                if config.upstream.host.is_some() && config.upstream.token.is_some() {
                    "configured"
                } else {
                    "disabled"
                }
            );
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  Server: {}:{}", config.server.host, config.server.port);
        }
    }

    Ok(())
}
