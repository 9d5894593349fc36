use crate::cache::{ArtifactStore, CacheStore, MemoryStore};
use crate::config::Config;
use crate::resolution::ResolutionService;
use crate::resolver::{MediaResolver, PageResolver};
use crate::state::ServiceStats;
use crate::upstream::PurgeClient;
use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{header, Method},
    middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod request_id;
pub mod routes_media;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub resolution: Arc<ResolutionService>,
    pub cache: Arc<dyn CacheStore>,
    pub artifacts: Arc<ArtifactStore>,
    /// Present only when an upstream purge target is configured.
    pub purge: Option<Arc<PurgeClient>>,
    pub stats: Arc<ServiceStats>,
}

impl AppContext {
    /// Build the context with the bundled page resolver.
    pub fn from_config(config: Config) -> Self {
        let resolver = Arc::new(PageResolver::new(&config.resolution));
        Self::with_resolver(config, resolver)
    }

    /// Build the context around an explicit resolver backend.
    pub fn with_resolver(config: Config, resolver: Arc<dyn MediaResolver>) -> Self {
        let cache: Arc<dyn CacheStore> = Arc::new(MemoryStore::new());
        let deadline = Duration::from_secs(config.resolution.timeout_secs);
        let resolution = Arc::new(ResolutionService::new(resolver, cache.clone(), deadline));
        let artifacts = Arc::new(ArtifactStore::new(config.cache.document_dir.clone()));
        let purge = PurgeClient::from_config(&config.upstream).map(Arc::new);

        Self {
            config: Arc::new(config),
            resolution,
            cache,
            artifacts,
            purge,
            stats: Arc::new(ServiceStats::default()),
        }
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    // Responses are meant to be embedded cross-origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", routes_media::media_routes())
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn health_check(State(ctx): State<AppContext>) -> impl IntoResponse {
    let stats = ctx.stats.snapshot();
    let cached_entries = ctx.cache.len().await;

    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "cached_entries": cached_entries,
        "cache_hit_rate": stats.cache_hit_rate(),
        "stats": stats,
    }))
}

/// Start the HTTP server
pub async fn start_server(config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let ctx = AppContext::from_config(config);
    let app = create_router(ctx);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
