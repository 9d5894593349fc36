//! The media retrieval endpoint and its per-format render paths.
//!
//! One handler serves four output formats. The bare `/medias` route
//! negotiates the format from the `Accept` header and the `format` query
//! override; the suffixed aliases (`/medias.json`, `/medias.js`,
//! `/medias.html`, `/medias.oembed`) force one. The aliases matter beyond
//! convenience: embed tags point at `/medias.js`, and the script body derives
//! its iframe target by rewriting that suffix to `/medias.html`.

use crate::error::AppError;
use crate::render::{self, MediaFormat};
use crate::resolver::ResolveError;
use crate::server::AppContext;
use axum::{
    extract::{OriginalUri, Query, State},
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use unfurl_core::{Fingerprint, MediaError};

pub fn media_routes() -> Router<AppContext> {
    Router::new()
        .route("/medias", get(media_negotiated))
        .route("/medias.json", get(media_data))
        .route("/medias.js", get(media_script))
        .route("/medias.html", get(media_document))
        .route("/medias.oembed", get(media_oembed))
}

#[derive(Debug, Deserialize)]
struct MediaQuery {
    url: Option<String>,
    /// Boolean-valued: `1` or `true` force a refresh.
    refresh: Option<String>,
    format: Option<String>,
    maxwidth: Option<u32>,
    maxheight: Option<u32>,
}

async fn media_negotiated(
    State(ctx): State<AppContext>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    Query(params): Query<MediaQuery>,
) -> Response {
    let accept = headers.get(header::ACCEPT).and_then(|v| v.to_str().ok());
    let format = MediaFormat::negotiate(accept, params.format.as_deref());
    handle_media(ctx, uri, headers, params, format).await
}

async fn media_data(
    State(ctx): State<AppContext>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    Query(params): Query<MediaQuery>,
) -> Response {
    handle_media(ctx, uri, headers, params, MediaFormat::Data).await
}

async fn media_script(
    State(ctx): State<AppContext>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    Query(params): Query<MediaQuery>,
) -> Response {
    handle_media(ctx, uri, headers, params, MediaFormat::Script).await
}

async fn media_document(
    State(ctx): State<AppContext>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    Query(params): Query<MediaQuery>,
) -> Response {
    handle_media(ctx, uri, headers, params, MediaFormat::Document).await
}

async fn media_oembed(
    State(ctx): State<AppContext>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    Query(params): Query<MediaQuery>,
) -> Response {
    handle_media(ctx, uri, headers, params, MediaFormat::Oembed).await
}

async fn handle_media(
    ctx: AppContext,
    uri: Uri,
    headers: HeaderMap,
    params: MediaQuery,
    format: MediaFormat,
) -> Response {
    let url = match params
        .url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
    {
        Some(url) => url.to_string(),
        None => return AppError::from(unfurl_core::Error::MissingUrl).into_response(),
    };

    let refresh = matches!(params.refresh.as_deref(), Some("1") | Some("true"));
    let base = public_base(&ctx, &headers);

    match format {
        // Script never resolves; display work happens in the follow-up
        // data request the generated snippet issues.
        MediaFormat::Script => script_response(&request_url(&base, &uri)),
        MediaFormat::Data => render_data(&ctx, &url, refresh, &base).await,
        MediaFormat::Document => {
            render_document_format(&ctx, &url, refresh, &request_url(&base, &uri)).await
        }
        MediaFormat::Oembed => {
            render_oembed_format(&ctx, &url, refresh, params.maxwidth, params.maxheight).await
        }
    }
}

async fn render_data(ctx: &AppContext, url: &str, refresh: bool, base: &str) -> Response {
    match ctx.resolution.resolve(url, refresh).await {
        Ok(resolution) => {
            ctx.stats.record_resolution(resolution.source);
            let tag = render::embed_tag(base, url);
            Json(render::media_envelope(&resolution.media, &tag)).into_response()
        }
        Err(ResolveError::InvalidUrl(bad)) => {
            ctx.stats.record_error();
            AppError::from(unfurl_core::Error::invalid_url(bad)).into_response()
        }
        Err(ResolveError::RateLimited { reset_in }) => {
            ctx.stats.record_error();
            rate_limited_response(reset_in)
        }
        Err(ResolveError::Failed(message)) => {
            ctx.stats.record_error();
            tracing::warn!(url = %url, "Resolution failed: {message}");
            let media = ctx
                .resolution
                .minimal_data(url)
                .with_error(MediaError::unknown(message));
            let tag = render::embed_tag(base, url);
            Json(render::media_envelope(&media, &tag)).into_response()
        }
    }
}

async fn render_document_format(
    ctx: &AppContext,
    url: &str,
    refresh: bool,
    request_url: &str,
) -> Response {
    let fingerprint = Fingerprint::of_url(url);

    if refresh || !ctx.artifacts.exists(&fingerprint) {
        match ctx.resolution.resolve_keyed(&fingerprint, url, refresh).await {
            Ok(resolution) => {
                ctx.stats.record_resolution(resolution.source);
                let document = render::build_document(&resolution.media);
                if let Err(e) = ctx.artifacts.write_atomic(&fingerprint, &document) {
                    tracing::error!(fingerprint = %fingerprint, "Failed to write document: {e:#}");
                    return document_response(render::failure_document());
                }
                if refresh {
                    if let Some(purge) = &ctx.purge {
                        purge.purge_for_request(request_url).await;
                    }
                }
            }
            Err(ResolveError::InvalidUrl(bad)) => {
                ctx.stats.record_error();
                return AppError::from(unfurl_core::Error::invalid_url(bad)).into_response();
            }
            Err(e) => {
                ctx.stats.record_error();
                tracing::warn!(url = %url, "Document resolution failed: {e}");
                return document_response(render::failure_document());
            }
        }
    }

    match ctx.artifacts.read(&fingerprint) {
        Ok(content) => document_response(content),
        Err(e) => {
            tracing::error!(fingerprint = %fingerprint, "Failed to read document: {e:#}");
            document_response(render::failure_document())
        }
    }
}

async fn render_oembed_format(
    ctx: &AppContext,
    url: &str,
    refresh: bool,
    maxwidth: Option<u32>,
    maxheight: Option<u32>,
) -> Response {
    match ctx.resolution.resolve(url, refresh).await {
        Ok(resolution) => {
            ctx.stats.record_resolution(resolution.source);
            Json(render::oembed_envelope(&resolution.media, maxwidth, maxheight)).into_response()
        }
        Err(ResolveError::InvalidUrl(bad)) => {
            ctx.stats.record_error();
            AppError::from(unfurl_core::Error::invalid_url(bad)).into_response()
        }
        Err(ResolveError::RateLimited { reset_in }) => {
            ctx.stats.record_error();
            rate_limited_response(reset_in)
        }
        Err(ResolveError::Failed(message)) => {
            ctx.stats.record_error();
            tracing::warn!(url = %url, "Resolution failed: {message}");
            let media = ctx.resolution.minimal_data(url);
            Json(render::oembed_envelope(&media, maxwidth, maxheight)).into_response()
        }
    }
}

fn script_response(request_url: &str) -> Response {
    (
        [(header::CONTENT_TYPE, MediaFormat::Script.content_type())],
        render::script_body(request_url),
    )
        .into_response()
}

fn document_response(content: String) -> Response {
    (
        [(header::CONTENT_TYPE, MediaFormat::Document.content_type())],
        content,
    )
        .into_response()
}

fn rate_limited_response(reset_in: u64) -> Response {
    let body = render::error_envelope("Rate limit exceeded", "RATE_LIMITED", Some(reset_in));
    let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    if let Ok(value) = reset_in.to_string().parse() {
        response.headers_mut().insert(header::RETRY_AFTER, value);
    }
    response
}

/// Base URL this service is reachable under, for embed tags and the script
/// body's iframe target.
fn public_base(ctx: &AppContext, headers: &HeaderMap) -> String {
    if let Some(base) = &ctx.config.server.public_base_url {
        return base.trim_end_matches('/').to_string();
    }

    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    format!("http://{host}")
}

/// The full URL of the current request as the client sent it.
fn request_url(base: &str, uri: &Uri) -> String {
    format!("{base}{uri}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn public_base_prefers_config() {
        let mut config = Config::default();
        config.server.public_base_url = Some("https://unfurl.example.com/".into());
        let ctx = AppContext::from_config(config);

        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, "ignored.example.com".parse().unwrap());
        assert_eq!(public_base(&ctx, &headers), "https://unfurl.example.com");
    }

    #[test]
    fn public_base_falls_back_to_host_header() {
        let ctx = AppContext::from_config(Config::default());
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, "media.example.com:3200".parse().unwrap());
        assert_eq!(public_base(&ctx, &headers), "http://media.example.com:3200");
    }

    #[test]
    fn request_url_joins_base_and_uri() {
        let uri: Uri = "/api/medias.js?url=https%3A%2F%2Fx".parse().unwrap();
        assert_eq!(
            request_url("http://h", &uri),
            "http://h/api/medias.js?url=https%3A%2F%2Fx"
        );
    }
}
