use rs_scraper_graph::encoding::{detect_encoding, transcode_to_utf8, EncodingSource};
use rs_scraper_graph::{extract_text_bytes, Error, Language};

#[test]
fn utf8_content_handled_correctly() {
    let html = "<html><head><meta charset=\"utf-8\"></head>\
        <body><p>Special characters: é, ñ, ü, 中文</p></body></html>"
        .as_bytes();
    let text = transcode_to_utf8(html, None);
    assert!(text.contains("é, ñ, ü, 中文"));
}

#[test]
fn windows1252_meta_is_honoured() {
    let html = b"<html><head><meta charset=\"windows-1252\"></head><body><p>\x93quoted\x94</p></body></html>";
    let text = transcode_to_utf8(html, None);
    assert!(text.contains("\u{201c}quoted\u{201d}"));
}

#[test]
fn header_overrides_wrong_meta() {
    let html = b"<meta charset=\"utf-8\"><p>M\xFCnchen</p>";
    let (_, source) = detect_encoding(html, Some("text/html;charset=iso-8859-1"));
    assert_eq!(source, EncodingSource::ContentType);
    assert!(transcode_to_utf8(html, Some("text/html;charset=iso-8859-1")).contains("München"));
}

#[test]
fn invalid_utf8_is_replaced_not_rejected() {
    let html = b"<p>ok \xFF\xFE bytes</p>";
    let text = transcode_to_utf8(html, Some("text/html; charset=utf-8"));
    assert!(text.contains('\u{FFFD}'));
}

#[test]
fn bytes_entry_point_needs_content() {
    assert!(matches!(
        extract_text_bytes(b"   ", Language::En),
        Err(Error::MalformedInput(_))
    ));
}
