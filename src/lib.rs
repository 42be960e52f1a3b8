//! # rs-scraper-graph
//!
//! Finds the single most relevant piece of content on a web page: the most
//! information-dense passage in a given language, or the most prominent
//! image.
//!
//! The parsed document is mirrored into a scoring tree (one node per element
//! and per non-blank text fragment). Every node gets a score and the highest
//! one wins:
//!
//! - **Text mode**: `depth * breadth * density` for headings, paragraphs,
//!   list items, table cells, `article`, `section` and `blockquote`, where
//!   density is the character count of text in the target language
//! - **Image mode**: `(alt length + width * height) / (depth + 1)` for `img`
//!   elements, after fetching and measuring every distinct image once
//!
//! ## Quick Start
//!
//! ```rust
//! use rs_scraper_graph::{extract_text, Language};
//!
//! let html = r#"<html><body>
//!   <nav><li>Home</li></nav>
//!   <article><p>The quick brown fox jumps over the lazy dog while the farmer
//!   watches quietly from the porch of his old wooden house.</p></article>
//! </body></html>"#;
//!
//! let result = extract_text(html, Language::En)?;
//! assert_eq!(result.tag, "p");
//! # Ok::<(), rs_scraper_graph::Error>(())
//! ```
//!
//! Image mode and page scraping are async and go through an [`Extractor`],
//! whose fetcher and language classifier can be replaced (see [`testing`]).

mod error;
mod extract;
mod language;
mod options;
mod result;

/// DOM operations adapter over `dom_query`.
pub mod dom;

/// Character encoding detection and transcoding.
pub mod encoding;

/// Page and image fetching.
pub mod fetch;

/// Scoring tree, scorers and best-node resolution.
pub mod graph;

/// Image fetching and measurement.
pub mod resolver;

/// In-memory collaborators for tests.
pub mod testing;

/// URL validation and normalization.
pub mod url_utils;

// Public API - re-exports
pub use error::{Error, NotFoundReason, Result};
pub use extract::Extractor;
pub use fetch::{Fetch, FetchError, Fetched, HttpFetcher};
pub use language::{Language, LanguageClassifier, WhatlangClassifier};
pub use options::{Options, ScoringMode};
pub use resolver::{ImageMetadata, SizeSource};
pub use result::{ContentKind, ExtractResult};
pub use url_utils::Website;

/// Extracts the best text passage in `language`, using `whatlang`.
///
/// No network access is needed.
pub fn extract_text(html: &str, language: Language) -> Result<ExtractResult> {
    extract::extract_text_with(html, language, &WhatlangClassifier::default())
}

/// [`extract_text`] for raw bytes, decoded per BOM or `<meta>` charset.
///
/// ```rust
/// use rs_scraper_graph::{extract_text_bytes, Language};
///
/// let html = b"<html><head><meta charset=\"ISO-8859-1\"></head><body>\
///   <p>Le caf\xE9 du coin ouvre ses portes tous les matins \xE0 sept heures pour les habitants du quartier.</p>\
///   </body></html>";
/// let result = extract_text_bytes(html, Language::Fr)?;
/// assert!(result.content.contains("café"));
/// # Ok::<(), rs_scraper_graph::Error>(())
/// ```
pub fn extract_text_bytes(html: &[u8], language: Language) -> Result<ExtractResult> {
    let html = encoding::transcode_to_utf8(html, None);
    extract_text(&html, language)
}

/// Extracts the most prominent image of HTML served at `page_url`, with default options.
pub async fn extract_image(html: &str, page_url: &str) -> Result<ExtractResult> {
    Extractor::new(Options::default())?
        .extract(html, page_url, ScoringMode::Image)
        .await
}

/// Fetches `url` and extracts from it, with default options.
pub async fn scrape(url: &str, mode: ScoringMode) -> Result<ExtractResult> {
    Extractor::new(Options::default())?.scrape(url, mode).await
}
