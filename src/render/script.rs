//! The JavaScript embedding format.
//!
//! The script format does not inline the payload. It emits a small snippet
//! that writes an iframe pointing at the document format for the same URL,
//! so embedding pages stay current without re-fetching the script.

/// Embed tag included in structured-data responses.
///
/// Points at the script format of the media endpoint on this service.
pub fn embed_tag(base_url: &str, target_url: &str) -> String {
    format!(
        r#"<script src="{}/api/medias.js?url={}" type="text/javascript"></script>"#,
        base_url.trim_end_matches('/'),
        urlencoded(target_url)
    )
}

/// Body of the script-format response.
///
/// `request_url` is the caller's own request URL; its fragment is stripped
/// before use since fragments are client-side state, then the document URL
/// is derived from it.
pub fn script_body(request_url: &str) -> String {
    let stripped = request_url.split('#').next().unwrap_or(request_url);
    let document_url = stripped.replacen("medias.js", "medias.html", 1);

    format!(
        "(function() {{\n  var requestUrl = \"{}\";\n  document.write('<iframe src=\"{}\" width=\"100%\" height=\"420\" frameborder=\"0\" allowfullscreen></iframe>');\n}})();\n",
        js_escape(stripped),
        js_escape(&document_url)
    )
}

/// Minimal percent-encoding for query parameter values.
fn urlencoded(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char);
            }
            _ => {
                out.push('%');
                out.push(char::from(HEX[(b >> 4) as usize]));
                out.push(char::from(HEX[(b & 0x0f) as usize]));
            }
        }
    }
    out
}

const HEX: [u8; 16] = *b"0123456789ABCDEF";

/// Escape a string for inclusion in a double-quoted JS literal.
fn js_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            // Keeps "</script>" from terminating the surrounding tag.
            '<' => out.push_str("\\x3C"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}
