use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub resolution: ResolutionConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub upstream: UpstreamConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Base URL clients reach this service under, used when generating
    /// embed tags. Falls back to the request's Host header when unset.
    #[serde(default)]
    pub public_base_url: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    3200
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_base_url: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolutionConfig {
    /// Wall-clock budget for one resolution attempt, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Timeout for the resolver's own page fetch, in seconds.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Local budget for outbound resolutions per second.
    #[serde(default = "default_requests_per_sec")]
    pub requests_per_sec: u32,
}

fn default_timeout_secs() -> u64 {
    20
}
fn default_fetch_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    format!("unfurl/{}", env!("CARGO_PKG_VERSION"))
}
fn default_requests_per_sec() -> u32 {
    10
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            user_agent: default_user_agent(),
            requests_per_sec: default_requests_per_sec(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Directory generated documents are written to.
    #[serde(default = "default_document_dir")]
    pub document_dir: PathBuf,
}

fn default_document_dir() -> PathBuf {
    PathBuf::from("./cache/documents")
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            document_dir: default_document_dir(),
        }
    }
}

/// Edge-cache invalidation target. Purging is enabled only when both
/// `host` and `token` are present.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UpstreamConfig {
    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub token: Option<String>,

    /// Optional `user:password` pair when the purge endpoint sits behind
    /// basic auth.
    #[serde(default)]
    pub httpauth: Option<String>,
}
