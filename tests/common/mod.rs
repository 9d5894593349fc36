//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which builds a full [`AppContext`] around a
//! caller-supplied resolver, with the document store pointed at a temp
//! directory. The [`with_server`] constructor starts Axum on a random port
//! for HTTP-level testing. [`StubResolver`] is the standard test double.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use unfurl::cache::{ArtifactStore, CacheStore, MemoryStore};
use unfurl::config::Config;
use unfurl::resolution::ResolutionService;
use unfurl::resolver::{MediaResolver, ResolveError};
use unfurl::server::{create_router, AppContext};
use unfurl::state::ServiceStats;
use unfurl::upstream::PurgeClient;
use unfurl_core::MediaData;

/// Test harness wrapping a fully-constructed [`AppContext`] backed by a
/// temp-dir document store.
pub struct TestHarness {
    pub ctx: AppContext,
    _doc_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new harness with default configuration and a long deadline.
    pub fn new(resolver: Arc<dyn MediaResolver>) -> Self {
        Self::with_deadline(resolver, Duration::from_secs(5))
    }

    /// Create a new harness with an explicit resolution deadline.
    pub fn with_deadline(resolver: Arc<dyn MediaResolver>, deadline: Duration) -> Self {
        Self::with_config(Config::default(), resolver, deadline)
    }

    /// Create a new harness with a custom configuration.
    pub fn with_config(
        mut config: Config,
        resolver: Arc<dyn MediaResolver>,
        deadline: Duration,
    ) -> Self {
        let doc_dir = tempfile::tempdir().expect("failed to create temp dir");
        config.cache.document_dir = doc_dir.path().join("documents");

        let cache: Arc<dyn CacheStore> = Arc::new(MemoryStore::new());
        let resolution = Arc::new(ResolutionService::new(resolver, cache.clone(), deadline));
        let artifacts = Arc::new(ArtifactStore::new(config.cache.document_dir.clone()));
        let purge = PurgeClient::from_config(&config.upstream).map(Arc::new);

        let ctx = AppContext {
            config: Arc::new(config),
            resolution,
            cache,
            artifacts,
            purge,
            stats: Arc::new(ServiceStats::default()),
        };

        Self {
            ctx,
            _doc_dir: doc_dir,
        }
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server(resolver: Arc<dyn MediaResolver>) -> (Self, SocketAddr) {
        Self::new(resolver).serve().await
    }

    /// Start an Axum server for an already-built harness.
    pub async fn serve(self) -> (Self, SocketAddr) {
        let app = create_router(self.ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (self, addr)
    }
}

/// Scripted resolver for driving the service without real network calls.
pub struct StubResolver {
    calls: AtomicUsize,
    behavior: Behavior,
}

pub enum Behavior {
    Ok(MediaData),
    Slow(Duration, MediaData),
    Fail(String),
    RateLimited(u64),
}

impl StubResolver {
    pub fn ok(media: MediaData) -> Arc<Self> {
        Self::with_behavior(Behavior::Ok(media))
    }

    pub fn slow(delay: Duration, media: MediaData) -> Arc<Self> {
        Self::with_behavior(Behavior::Slow(delay, media))
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Self::with_behavior(Behavior::Fail(message.to_string()))
    }

    pub fn rate_limited(reset_in: u64) -> Arc<Self> {
        Self::with_behavior(Behavior::RateLimited(reset_in))
    }

    fn with_behavior(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            behavior,
        })
    }

    /// How many times `resolve` has run.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaResolver for StubResolver {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn resolve(&self, _url: &str) -> Result<MediaData, ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Ok(media) => Ok(media.clone()),
            Behavior::Slow(delay, media) => {
                tokio::time::sleep(*delay).await;
                Ok(media.clone())
            }
            Behavior::Fail(message) => Err(ResolveError::Failed(message.clone())),
            Behavior::RateLimited(reset_in) => Err(ResolveError::RateLimited {
                reset_in: *reset_in,
            }),
        }
    }
}

/// A payload with enough fields set to make format output assertions.
pub fn sample_media(url: &str) -> MediaData {
    let mut media = MediaData::minimal(url);
    media.title = Some("Sample Page".into());
    media.description = Some("A description of the page".into());
    media.media_type = Some("item".into());
    media.provider_name = Some("example.com".into());
    media
}
