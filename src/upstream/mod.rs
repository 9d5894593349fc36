//! Upstream edge-cache invalidation.
//!
//! When a forced refresh regenerates the static document, the edge cache in
//! front of this service still holds the previous response. [`PurgeClient`]
//! asks that upstream to drop its entries: once for the literal request URL
//! and once for the refresh-stripped variant, so the URL the refreshing
//! client used and the URL everyone else uses go stale together.

use std::time::Duration;

use anyhow::Result;
use reqwest::Client;

use crate::config::UpstreamConfig;

const CONNECTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the upstream edge-cache purge endpoint.
pub struct PurgeClient {
    client: Client,
    host: String,
    token: String,
    httpauth: Option<String>,
}

impl PurgeClient {
    /// Build a client from config. Purging is enabled only when both host
    /// and token are configured.
    pub fn from_config(config: &UpstreamConfig) -> Option<Self> {
        let (host, token) = match (&config.host, &config.token) {
            (Some(host), Some(token)) => (host.clone(), token.clone()),
            _ => return None,
        };

        let client = Client::builder()
            .timeout(CONNECTION_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client: {}", e);
                Client::new()
            });

        Some(Self {
            client,
            host: host.trim_end_matches('/').to_string(),
            token,
            httpauth: config.httpauth.clone(),
        })
    }

    /// Ask the upstream to drop its entry for `url`.
    pub async fn purge(&self, url: &str) -> Result<()> {
        let endpoint = format!("{}/purge", self.host);

        let mut request = self
            .client
            .delete(&endpoint)
            .query(&[("url", url)])
            .header("X-Purge-Token", &self.token);

        if let Some(ref auth) = self.httpauth {
            if let Some((user, password)) = auth.split_once(':') {
                request = request.basic_auth(user, Some(password));
            }
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Upstream purge failed ({}): {}", status, body);
        }

        Ok(())
    }

    /// Purge the literal request URL, then the refresh-stripped variant when
    /// stripping changed anything.
    ///
    /// Purge failures are logged and swallowed; the client's own request has
    /// already been answered from the fresh artifact.
    pub async fn purge_for_request(&self, request_url: &str) {
        if let Err(e) = self.purge(request_url).await {
            tracing::warn!(url = %request_url, "Upstream purge failed: {e}");
        }

        let stripped = strip_refresh_param(request_url);
        if stripped != request_url {
            if let Err(e) = self.purge(&stripped).await {
                tracing::warn!(url = %stripped, "Upstream purge failed: {e}");
            }
        }
    }
}

/// Remove the refresh parameter from a URL's query string.
///
/// Other parameters keep their order and encoding untouched; when the query
/// becomes empty the `?` is dropped as well.
pub fn strip_refresh_param(url: &str) -> String {
    let Some((base, query)) = url.split_once('?') else {
        return url.to_string();
    };

    let kept: Vec<&str> = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| *pair != "refresh" && !pair.starts_with("refresh="))
        .collect();

    if kept.is_empty() {
        base.to_string()
    } else {
        format!("{}?{}", base, kept.join("&"))
    }
}
