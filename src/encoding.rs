//! Page transcoding.
//!
//! Fetched pages arrive as bytes. The encoding is picked in this order:
//! byte-order mark, `charset` parameter of the `Content-Type` header,
//! `<meta>` declaration in the first kilobyte, then UTF-8.

use std::sync::LazyLock;

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;

/// How far into the document `<meta>` declarations are looked for.
const META_SCAN_BYTES: usize = 1024;

/// `charset=` parameter, in a header value or a `<meta content>` attribute.
#[allow(clippy::expect_used)]
static CHARSET_PARAM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)charset\s*=\s*["']?([^"';\s>]+)"#).expect("valid regex")
});

/// A `<meta ...>` tag carrying a charset, either form.
#[allow(clippy::expect_used)]
static META_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<meta[^>]+charset[^>]*>").expect("valid regex"));

/// Where the chosen encoding was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingSource {
    ByteOrderMark,
    ContentType,
    MetaTag,
    Default,
}

/// Pick the encoding of an HTML body.
#[must_use]
pub fn detect_encoding(
    html: &[u8],
    content_type: Option<&str>,
) -> (&'static Encoding, EncodingSource) {
    if let Some((encoding, _)) = Encoding::for_bom(html) {
        return (encoding, EncodingSource::ByteOrderMark);
    }

    if let Some(encoding) = content_type.and_then(charset_in) {
        return (encoding, EncodingSource::ContentType);
    }

    let head = String::from_utf8_lossy(&html[..html.len().min(META_SCAN_BYTES)]);
    let from_meta = META_TAG_RE
        .find_iter(&head)
        .find_map(|tag| charset_in(tag.as_str()));
    if let Some(encoding) = from_meta {
        return (encoding, EncodingSource::MetaTag);
    }

    (UTF_8, EncodingSource::Default)
}

fn charset_in(text: &str) -> Option<&'static Encoding> {
    let label = CHARSET_PARAM_RE.captures(text)?.get(1)?.as_str();
    Encoding::for_label(label.as_bytes())
}

/// Decode an HTML body to UTF-8, replacing invalid sequences with U+FFFD.
///
/// ```
/// use rs_scraper_graph::encoding::transcode_to_utf8;
///
/// let latin1 = b"<p>caf\xe9</p>";
/// assert_eq!(transcode_to_utf8(latin1, Some("text/html; charset=ISO-8859-1")), "<p>caf\u{e9}</p>");
/// ```
#[must_use]
pub fn transcode_to_utf8(html: &[u8], content_type: Option<&str>) -> String {
    let (encoding, _) = detect_encoding(html, content_type);
    // decode() also strips a BOM matching the encoding.
    let (decoded, _, _) = encoding.decode(html);
    decoded.into_owned()
}
