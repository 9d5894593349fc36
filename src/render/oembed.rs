//! The oEmbed format (spec version 1.0).

use unfurl_core::MediaData;

const DEFAULT_WIDTH: u32 = 800;
const DEFAULT_HEIGHT: u32 = 200;

/// Shape a payload into an oEmbed envelope.
///
/// `maxwidth` and `maxheight` are consumer hints from the query string; when
/// absent the defaults apply. Payloads with embed markup are typed `rich`,
/// everything else is a plain `link`.
pub fn oembed_envelope(
    media: &MediaData,
    maxwidth: Option<u32>,
    maxheight: Option<u32>,
) -> serde_json::Value {
    let kind = if media.html.is_some() { "rich" } else { "link" };

    serde_json::json!({
        "type": kind,
        "version": "1.0",
        "title": media.title,
        "author_name": media.author_name,
        "author_url": media.author_url,
        "provider_name": media.provider_name,
        "provider_url": media.provider_url,
        "thumbnail_url": media.thumbnail_url,
        "html": media.html,
        "width": maxwidth.unwrap_or(DEFAULT_WIDTH),
        "height": maxheight.unwrap_or(DEFAULT_HEIGHT),
    })
}
