//! Generic HTML page resolver.
//!
//! Implements [`MediaResolver`] by fetching the target page and scanning it
//! for OpenGraph, Twitter-card, and plain HTML metadata.
//!
//! Features:
//! - Token-bucket budget for outbound fetches via [`governor`]; exhaustion
//!   surfaces as [`ResolveError::RateLimited`] with a retry hint.
//! - Configurable fetch timeout and user agent.
//! - First-tag-wins tag collection, matching how OpenGraph consumers read
//!   duplicated properties.
//!
//! This resolver exists so the binary works end to end against real pages.
//! No JavaScript execution, no per-site rules.

use std::collections::BTreeMap;
use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use governor::clock::{Clock, DefaultClock};
use governor::{Quota, RateLimiter};
use regex::Regex;
use tracing::debug;
use unfurl_core::MediaData;

use crate::config::ResolutionConfig;
use crate::resolver::{MediaResolver, ResolveError};

const DEFAULT_EMBED_WIDTH: u32 = 800;
const DEFAULT_EMBED_HEIGHT: u32 = 450;

/// Resolver backed by a plain HTTP fetch and metadata tag scan.
pub struct PageResolver {
    client: reqwest::Client,
    rate_limiter: governor::RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
    clock: DefaultClock,
    // Meta tags come in both attribute orders in the wild.
    meta_forward: Regex,
    meta_reverse: Regex,
    title_tag: Regex,
}

impl PageResolver {
    /// Create a new page resolver from the resolution config.
    pub fn new(config: &ResolutionConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .expect("failed to build reqwest client");

        let per_sec = NonZeroU32::new(config.requests_per_sec).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(per_sec));

        Self {
            client,
            rate_limiter,
            clock: DefaultClock::default(),
            meta_forward: Regex::new(
                r#"(?i)<meta\s[^>]*?(?:property|name)=["'](og:[^"']+|twitter:[^"']+|author)["'][^>]*?content=["']([^"']*)["']"#,
            )
            .expect("valid meta pattern"),
            meta_reverse: Regex::new(
                r#"(?i)<meta\s[^>]*?content=["']([^"']*)["'][^>]*?(?:property|name)=["'](og:[^"']+|twitter:[^"']+|author)["']"#,
            )
            .expect("valid meta pattern"),
            title_tag: Regex::new(r"(?is)<title[^>]*>([^<]*)</title>")
                .expect("valid title pattern"),
        }
    }

    /// Collect metadata tags from raw HTML, first occurrence winning.
    fn collect_tags(&self, html: &str) -> BTreeMap<String, String> {
        let mut tags = BTreeMap::new();

        for caps in self.meta_forward.captures_iter(html) {
            let key = caps[1].to_ascii_lowercase();
            tags.entry(key).or_insert_with(|| caps[2].to_string());
        }
        for caps in self.meta_reverse.captures_iter(html) {
            let key = caps[2].to_ascii_lowercase();
            tags.entry(key).or_insert_with(|| caps[1].to_string());
        }

        if let Some(caps) = self.title_tag.captures(html) {
            tags.entry("page:title".to_string())
                .or_insert_with(|| caps[1].trim().to_string());
        }

        tags
    }

    /// Shape collected tags into a [`MediaData`] payload.
    fn build_media(&self, url: &str, html: &str) -> MediaData {
        let tags = self.collect_tags(html);
        let pick = |keys: &[&str]| -> Option<String> {
            keys.iter()
                .find_map(|k| tags.get(*k).filter(|v| !v.is_empty()).cloned())
        };

        let mut media = MediaData::minimal(url);
        media.title = pick(&["og:title", "twitter:title", "page:title"]);
        media.description = pick(&["og:description", "twitter:description"]);
        media.thumbnail_url = pick(&["og:image", "og:image:url", "twitter:image"]);
        media.author_name = pick(&["author"]);
        media.media_type = Some(media_type_for(tags.get("og:type").map(String::as_str)));

        if let Ok(parsed) = reqwest::Url::parse(url) {
            if let Some(host) = parsed.host_str() {
                media.provider_url = Some(format!("{}://{}", parsed.scheme(), host));
                media.provider_name = pick(&["og:site_name"]).or_else(|| Some(host.to_string()));
            }
        }

        if let Some(video_url) = pick(&["og:video:secure_url", "og:video:url", "og:video"]) {
            let width = dimension(&tags, "og:video:width", DEFAULT_EMBED_WIDTH);
            let height = dimension(&tags, "og:video:height", DEFAULT_EMBED_HEIGHT);
            media.html = Some(format!(
                r#"<iframe src="{video_url}" width="{width}" height="{height}" frameborder="0" allowfullscreen></iframe>"#
            ));
        }

        media.parsed_at = Some(Utc::now());
        media
    }
}

/// Map an OpenGraph `og:type` value onto our coarse media type.
fn media_type_for(og_type: Option<&str>) -> String {
    match og_type {
        Some(t) if t.starts_with("video") => "video".to_string(),
        Some(t) if t.starts_with("article") => "article".to_string(),
        Some(t) if t.starts_with("profile") => "profile".to_string(),
        _ => "item".to_string(),
    }
}

fn dimension(tags: &BTreeMap<String, String>, key: &str, default: u32) -> u32 {
    tags.get(key)
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(default)
}

#[async_trait]
impl MediaResolver for PageResolver {
    fn name(&self) -> &'static str {
        "page"
    }

    async fn resolve(&self, url: &str) -> Result<MediaData, ResolveError> {
        if let Err(not_until) = self.rate_limiter.check() {
            let wait = not_until.wait_time_from(self.clock.now());
            return Err(ResolveError::RateLimited {
                reset_in: wait.as_secs().max(1),
            });
        }

        debug!(url = %url, "fetching page");

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ResolveError::Failed(format!("request failed: {e}")))?;

        let resp = resp
            .error_for_status()
            .map_err(|e| ResolveError::Failed(format!("upstream returned error: {e}")))?;

        let body = resp
            .text()
            .await
            .map_err(|e| ResolveError::Failed(format!("failed to read body: {e}")))?;

        Ok(self.build_media(url, &body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> PageResolver {
        PageResolver::new(&ResolutionConfig::default())
    }

    #[test]
    fn collects_opengraph_tags() {
        let html = r#"<html><head>
            <meta property="og:title" content="A Page">
            <meta property="og:description" content="About things">
            <meta property="og:image" content="https://cdn.example.com/t.png">
            <title>Fallback Title</title>
        </head></html>"#;

        let media = resolver().build_media("https://example.com/p", html);
        assert_eq!(media.title.as_deref(), Some("A Page"));
        assert_eq!(media.description.as_deref(), Some("About things"));
        assert_eq!(
            media.thumbnail_url.as_deref(),
            Some("https://cdn.example.com/t.png")
        );
    }

    #[test]
    fn title_tag_is_fallback() {
        let html = "<html><head><title> Just a Title </title></head></html>";
        let media = resolver().build_media("https://example.com", html);
        assert_eq!(media.title.as_deref(), Some("Just a Title"));
    }

    #[test]
    fn reversed_attribute_order() {
        let html = r#"<meta content="Reversed" property="og:title">"#;
        let media = resolver().build_media("https://example.com", html);
        assert_eq!(media.title.as_deref(), Some("Reversed"));
    }

    #[test]
    fn first_tag_wins() {
        let html = r#"
            <meta property="og:title" content="First">
            <meta property="og:title" content="Second">
        "#;
        let media = resolver().build_media("https://example.com", html);
        assert_eq!(media.title.as_deref(), Some("First"));
    }

    #[test]
    fn provider_derived_from_host() {
        let media = resolver().build_media("https://news.example.org/story", "<html></html>");
        assert_eq!(media.provider_name.as_deref(), Some("news.example.org"));
        assert_eq!(
            media.provider_url.as_deref(),
            Some("https://news.example.org")
        );
    }

    #[test]
    fn site_name_overrides_host() {
        let html = r#"<meta property="og:site_name" content="Example News">"#;
        let media = resolver().build_media("https://news.example.org/story", html);
        assert_eq!(media.provider_name.as_deref(), Some("Example News"));
    }

    #[test]
    fn video_pages_get_iframe_embed() {
        let html = r#"
            <meta property="og:type" content="video.other">
            <meta property="og:video:secure_url" content="https://example.com/embed/1">
            <meta property="og:video:width" content="640">
            <meta property="og:video:height" content="360">
        "#;
        let media = resolver().build_media("https://example.com/v/1", html);
        assert_eq!(media.media_type.as_deref(), Some("video"));
        let embed = media.html.unwrap();
        assert!(embed.contains("https://example.com/embed/1"));
        assert!(embed.contains("width=\"640\""));
        assert!(embed.contains("height=\"360\""));
    }

    #[test]
    fn media_type_mapping() {
        assert_eq!(media_type_for(Some("video.movie")), "video");
        assert_eq!(media_type_for(Some("article")), "article");
        assert_eq!(media_type_for(Some("profile")), "profile");
        assert_eq!(media_type_for(Some("website")), "item");
        assert_eq!(media_type_for(None), "item");
    }

    #[test]
    fn empty_tag_values_are_skipped() {
        let html = r#"
            <meta property="og:title" content="">
            <title>Real Title</title>
        "#;
        let media = resolver().build_media("https://example.com", html);
        assert_eq!(media.title.as_deref(), Some("Real Title"));
    }

    #[test]
    fn parsed_at_is_set() {
        let media = resolver().build_media("https://example.com", "<html></html>");
        assert!(media.parsed_at.is_some());
    }

    #[tokio::test]
    async fn budget_exhaustion_reports_retry_hint() {
        let config = ResolutionConfig {
            requests_per_sec: 1,
            ..Default::default()
        };
        let resolver = PageResolver::new(&config);

        // Burn the single slot, then the next check must fail with a hint.
        assert!(resolver.rate_limiter.check().is_ok());
        let err = resolver.resolve("https://example.com").await.unwrap_err();
        match err {
            ResolveError::RateLimited { reset_in } => assert!(reset_in >= 1),
            other => panic!("expected RateLimited, got {other:?}"),
        }
    }
}
