//! Extraction pipeline.
//!
//! Text mode is a single synchronous pass: parse, build the tree while
//! scoring it, pick the best node. Image mode needs the network, so it
//! builds the tree first, resolves every distinct image once, then scores.
//!
//! The parsed document is not `Send`, so the futures returned by the image
//! and scrape entry points are not `Send` either; drive them on the current
//! task (`#[tokio::main]`, `block_on`, a `LocalSet`).

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::dom::{self, Document};
use crate::encoding;
use crate::error::{Error, Result};
use crate::fetch::{Fetch, FetchError, Fetched, HttpFetcher};
use crate::graph::{resolve_best, ImageScorer, ScoringTree, TextScorer};
use crate::language::{Language, LanguageClassifier, WhatlangClassifier};
use crate::options::{Options, ScoringMode};
use crate::resolver::ImageResolver;
use crate::result::ExtractResult;
use crate::url_utils::Website;

/// Media types accepted as HTML pages.
const HTML_MEDIA_TYPES: &[&str] = &["text/html", "application/xhtml+xml", "text/plain"];

/// Parse HTML, rejecting documents with nothing to score.
fn parse_document(html: &str) -> Result<Document> {
    if html.trim().is_empty() {
        return Err(Error::MalformedInput("document is empty".to_string()));
    }
    Ok(dom::parse(html))
}

fn log_outcome(tree: &ScoringTree<'_>, mode: ScoringMode) {
    let best = tree.best();
    debug!(
        mode = mode.name(),
        nodes = tree.len(),
        best_index = tree.best_index(),
        best_tag = best.tag_name(),
        best_score = best.score(),
        "scoring tree built"
    );
}

/// Text-mode extraction with an explicit classifier.
pub(crate) fn extract_text_with(
    html: &str,
    language: Language,
    classifier: &dyn LanguageClassifier,
) -> Result<ExtractResult> {
    let document = parse_document(html)?;
    let mode = ScoringMode::text(language);
    let scorer = TextScorer::new(language, classifier);
    let tree = ScoringTree::build_scored(&document, &scorer);
    log_outcome(&tree, mode);

    let best = resolve_best(tree.best(), mode)?;
    Ok(ExtractResult::from_node(best, mode))
}

/// Extracts the best text passage or image from pages.
///
/// Holds the configuration and the two collaborators: a [`Fetch`] for pages
/// and images, and a [`LanguageClassifier`] for text mode. Both default to
/// the real implementations and can be replaced for tests.
///
/// ```rust
/// use std::sync::Arc;
/// use rs_scraper_graph::{Extractor, Language, Options};
///
/// let extractor = Extractor::new(Options::default())?
///     .with_classifier(Arc::new(|_: &str| Some(Language::En)));
/// let result = extractor.extract_text("<p>Hello</p>", Language::En)?;
/// assert_eq!(result.tag, "p");
/// # Ok::<(), rs_scraper_graph::Error>(())
/// ```
pub struct Extractor {
    options: Options,
    fetcher: Arc<dyn Fetch>,
    classifier: Arc<dyn LanguageClassifier>,
}

impl Extractor {
    /// An extractor using `reqwest` and `whatlang`.
    pub fn new(options: Options) -> Result<Self> {
        let fetcher = Arc::new(HttpFetcher::new(&options)?);
        let classifier = Arc::new(WhatlangClassifier::new(options.require_reliable_language));
        Ok(Self {
            options,
            fetcher,
            classifier,
        })
    }

    #[must_use]
    pub fn with_fetcher(mut self, fetcher: Arc<dyn Fetch>) -> Self {
        self.fetcher = fetcher;
        self
    }

    #[must_use]
    pub fn with_classifier(mut self, classifier: Arc<dyn LanguageClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Most information-dense element whose text is in `language`.
    pub fn extract_text(&self, html: &str, language: Language) -> Result<ExtractResult> {
        extract_text_with(html, language, self.classifier.as_ref())
    }

    /// Extract from HTML that was served at `page_url`.
    ///
    /// `page_url` supplies the base URL image sources are resolved against.
    pub async fn extract(
        &self,
        html: &str,
        page_url: &str,
        mode: ScoringMode,
    ) -> Result<ExtractResult> {
        self.extract_with_cancel(html, page_url, mode, &CancellationToken::new())
            .await
    }

    /// [`extract`](Self::extract) that stops with [`Error::Cancelled`] when `cancel` fires.
    pub async fn extract_with_cancel(
        &self,
        html: &str,
        page_url: &str,
        mode: ScoringMode,
        cancel: &CancellationToken,
    ) -> Result<ExtractResult> {
        let website = Website::new(page_url)?;
        let result = match mode {
            ScoringMode::Text { language } => {
                if cancel.is_cancelled() {
                    return Err(Error::Cancelled);
                }
                self.extract_text(html, language)?
            }
            ScoringMode::Image => self.extract_image(html, &website, cancel).await?,
        };
        Ok(result.with_url(website.url().as_str()))
    }

    async fn extract_image(
        &self,
        html: &str,
        website: &Website,
        cancel: &CancellationToken,
    ) -> Result<ExtractResult> {
        let document = parse_document(html)?;
        let mut tree = ScoringTree::build(&document);

        let resolver = ImageResolver::new(Arc::clone(&self.fetcher), website.base_url())
            .with_fetch_timeout(self.options.fetch_timeout);
        let resolved = resolver
            .resolve_all(tree.image_sources(), self.options.image_concurrency, cancel)
            .await?;

        tree.score(&ImageScorer::new(&resolved));
        log_outcome(&tree, ScoringMode::Image);

        let best = resolve_best(tree.best(), ScoringMode::Image)?;
        Ok(ExtractResult::from_node(best, ScoringMode::Image))
    }

    /// Fetch a page and extract from it, bounded by `page_timeout`.
    pub async fn scrape(&self, url: &str, mode: ScoringMode) -> Result<ExtractResult> {
        self.scrape_with_cancel(url, mode, &CancellationToken::new())
            .await
    }

    /// [`scrape`](Self::scrape) that stops with [`Error::Cancelled`] when `cancel` fires.
    pub async fn scrape_with_cancel(
        &self,
        url: &str,
        mode: ScoringMode,
        cancel: &CancellationToken,
    ) -> Result<ExtractResult> {
        let work = self.scrape_page(url, mode, cancel);
        match self.options.page_timeout {
            Some(limit) => tokio::time::timeout(limit, work)
                .await
                .map_err(|_| Error::Timeout {
                    url: url.to_string(),
                    after: limit,
                })?,
            None => work.await,
        }
    }

    async fn scrape_page(
        &self,
        url: &str,
        mode: ScoringMode,
        cancel: &CancellationToken,
    ) -> Result<ExtractResult> {
        let website = Website::new(url)?;
        info!(url = %website.url(), mode = mode.name(), "scraping page");

        let fetched = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(Error::Cancelled),
            fetched = self.fetch_page(website.url().as_str()) => fetched,
        };
        let fetched = fetched.map_err(|source| Error::Fetch {
            url: website.url().to_string(),
            source,
        })?;

        if let Some(media_type) = fetched.media_type() {
            if !HTML_MEDIA_TYPES.contains(&media_type.as_str()) {
                return Err(Error::MalformedInput(format!(
                    "expected an HTML page, got '{media_type}'"
                )));
            }
        }

        let html = encoding::transcode_to_utf8(&fetched.body, fetched.content_type.as_deref());
        // Redirects move the page; images resolve against where it ended up.
        let page_url = if Website::new(&fetched.url).is_ok() {
            fetched.url.as_str()
        } else {
            website.url().as_str()
        };
        self.extract_with_cancel(&html, page_url, mode, cancel).await
    }

    async fn fetch_page(&self, url: &str) -> std::result::Result<Fetched, FetchError> {
        tokio::time::timeout(self.options.fetch_timeout, self.fetcher.fetch(url))
            .await
            .map_err(|_| FetchError::Timeout)?
    }

    /// Scrape several pages, at most `batch_concurrency` at a time.
    ///
    /// Results come back in input order, one per URL; a failing page never
    /// affects the others.
    pub async fn scrape_many<S>(
        &self,
        urls: &[S],
        mode: ScoringMode,
    ) -> Vec<(String, Result<ExtractResult>)>
    where
        S: AsRef<str>,
    {
        stream::iter(urls.iter().map(|u| u.as_ref().to_string()))
            .map(|url| async move {
                let result = self.scrape(&url, mode).await;
                (url, result)
            })
            .buffered(self.options.batch_concurrency.max(1))
            .collect()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotFoundReason;
    use crate::testing::{png_bytes, StaticFetcher};

    fn english() -> Arc<dyn LanguageClassifier> {
        Arc::new(|text: &str| (!text.is_empty()).then_some(Language::En))
    }

    fn extractor(fetcher: StaticFetcher) -> Extractor {
        Extractor::new(Options::default())
            .unwrap()
            .with_fetcher(Arc::new(fetcher))
            .with_classifier(english())
    }

    #[test]
    fn empty_document_is_malformed() {
        let extractor = extractor(StaticFetcher::new());
        assert!(matches!(
            extractor.extract_text("  \n ", Language::En),
            Err(Error::MalformedInput(_))
        ));
    }

    #[test]
    fn text_mode_picks_relevant_element() {
        let extractor = extractor(StaticFetcher::new());
        let result = extractor
            .extract_text("<div><p>short</p><p>a much longer paragraph</p></div>", Language::En)
            .unwrap();
        assert_eq!(result.tag, "p");
        assert_eq!(result.content, "a much longer paragraph");
        assert_eq!(result.url, None);
    }

    #[test]
    fn text_mode_without_target_language_is_not_found() {
        let extractor = extractor(StaticFetcher::new());
        let err = extractor
            .extract_text("<p>text</p>", Language::Fr)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::NotFound(NotFoundReason::NoTextInLanguage(Language::Fr))
        ));
    }

    #[tokio::test]
    async fn image_mode_resolves_against_page_base() {
        let fetcher = StaticFetcher::new()
            .with_body("https://ex.com/small.png", "image/png", png_bytes(4, 4))
            .with_body("https://ex.com/big.png", "image/png", png_bytes(40, 30));
        let extractor = extractor(fetcher);
        let html = r#"<img src="/small.png"><img src="big.png" alt="hero">"#;
        let result = extractor
            .extract(html, "https://ex.com/articles/1", ScoringMode::Image)
            .await
            .unwrap();
        assert_eq!(result.content, "https://ex.com/big.png");
        assert_eq!(result.url.as_deref(), Some("https://ex.com/articles/1"));
        let image = result.image.unwrap();
        assert_eq!((image.width, image.height), (40, 30));
    }

    #[tokio::test]
    async fn invalid_page_url_is_rejected() {
        let extractor = extractor(StaticFetcher::new());
        let result = extractor
            .extract("<p>x</p>", "not a url", ScoringMode::text(Language::En))
            .await;
        assert!(matches!(result, Err(Error::InvalidUrl { .. })));
    }

    #[tokio::test]
    async fn scrape_reports_http_errors() {
        let extractor = extractor(StaticFetcher::new().with_status("https://ex.com/gone", 410));
        let result = extractor
            .scrape("https://ex.com/gone", ScoringMode::text(Language::En))
            .await;
        assert!(matches!(
            result,
            Err(Error::Fetch {
                source: FetchError::Status { status: 410 },
                ..
            })
        ));
    }

    #[tokio::test]
    async fn scrape_rejects_non_html_content() {
        let extractor = extractor(StaticFetcher::new().with_body(
            "https://ex.com/file.pdf",
            "application/pdf",
            b"%PDF-1.7".to_vec(),
        ));
        let result = extractor
            .scrape("https://ex.com/file.pdf", ScoringMode::text(Language::En))
            .await;
        assert!(matches!(result, Err(Error::MalformedInput(_))));
    }

    #[tokio::test]
    async fn scrape_transcodes_declared_charset() {
        let extractor = extractor(StaticFetcher::new().with_body(
            "https://ex.com/latin",
            "text/html; charset=ISO-8859-1",
            b"<p>caf\xe9 cr\xe8me</p>".to_vec(),
        ));
        let result = extractor
            .scrape("https://ex.com/latin", ScoringMode::text(Language::En))
            .await
            .unwrap();
        assert_eq!(result.content, "caf\u{e9} cr\u{e8}me");
    }
}
