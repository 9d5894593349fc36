//! The static document format.
//!
//! Builds the self-contained HTML page stored in the artifact cache. Pages
//! with provider-supplied embed markup wrap that markup; everything else
//! gets a metadata card. Rendering failures never reach the client as
//! errors, [`failure_document`] is served instead.

use unfurl_core::MediaData;

/// Build the document for a resolved payload.
pub fn build_document(media: &MediaData) -> String {
    let title = media.title.as_deref().unwrap_or(&media.url);
    let body = match media.html {
        Some(ref embed) => embed_section(embed),
        None => card_section(media),
    };
    let notice = match media.error {
        Some(ref error) => format!(
            "\n  <p class=\"notice\">{}</p>",
            escape_html(&error.message)
        ),
        None => String::new(),
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title}</title>
</head>
<body>
  {body}{notice}
</body>
</html>
"#,
        title = escape_html(title),
        body = body,
        notice = notice,
    )
}

/// The generic page served when document rendering fails.
pub fn failure_document() -> String {
    r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>Could not parse this media</title>
</head>
<body>
  <p>Could not parse this media</p>
</body>
</html>
"#
    .to_string()
}

/// Provider embed markup is trusted as-is; it is the whole point of the page.
fn embed_section(embed: &str) -> String {
    format!("<div class=\"embed\">{embed}</div>")
}

fn card_section(media: &MediaData) -> String {
    let mut out = String::from("<div class=\"card\">");

    if let Some(ref title) = media.title {
        out.push_str(&format!("\n    <h1>{}</h1>", escape_html(title)));
    }
    if let Some(ref thumbnail) = media.thumbnail_url {
        out.push_str(&format!(
            "\n    <img src=\"{}\" alt=\"\">",
            escape_html(thumbnail)
        ));
    }
    if let Some(ref description) = media.description {
        out.push_str(&format!("\n    <p>{}</p>", escape_html(description)));
    }

    let link_text = media.provider_name.as_deref().unwrap_or(&media.url);
    out.push_str(&format!(
        "\n    <a href=\"{}\">{}</a>",
        escape_html(&media.url),
        escape_html(link_text)
    ));

    out.push_str("\n  </div>");
    out
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
