//! Configuration options for content extraction.
//!
//! The `Options` struct controls how pages and images are fetched and how
//! text is classified. `ScoringMode` selects what the extraction looks for.

use std::time::Duration;

use crate::language::Language;

/// What the extraction is looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringMode {
    /// The most information-dense passage in `language`.
    Text { language: Language },
    /// The most prominent `<img>`.
    Image,
}

impl ScoringMode {
    /// Text mode for `language`.
    #[must_use]
    pub fn text(language: Language) -> Self {
        Self::Text { language }
    }

    #[must_use]
    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image)
    }

    /// Short name used in results and logs: `"text"` or `"image"`.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Image => "image",
        }
    }
}

impl Default for ScoringMode {
    fn default() -> Self {
        Self::Text {
            language: Language::default(),
        }
    }
}

/// Configuration options for extraction.
///
/// All fields are public for easy configuration. Use `Default::default()`
/// for standard settings.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use rs_scraper_graph::{Language, Options};
///
/// let options = Options {
///     language: Language::De,
///     fetch_timeout: Duration::from_secs(5),
///     ..Options::default()
/// };
/// assert_eq!(options.image_concurrency, 8);
/// ```
#[derive(Debug, Clone)]
pub struct Options {
    /// Target language for text mode when none is given explicitly.
    ///
    /// Default: `Language::En`
    pub language: Language,

    /// Timeout applied to each individual fetch (page or image).
    ///
    /// A timed-out image counts as unmeasurable, it does not fail the page.
    ///
    /// Default: 10 seconds
    pub fetch_timeout: Duration,

    /// Deadline for a whole page scrape (page fetch, image resolution, scoring).
    ///
    /// `None` disables the deadline.
    ///
    /// Default: `Some(60 seconds)`
    pub page_timeout: Option<Duration>,

    /// Maximum number of image fetches in flight for one page.
    ///
    /// Default: `8`
    pub image_concurrency: usize,

    /// Maximum number of pages processed at once by `scrape_many`.
    ///
    /// Default: `4`
    pub batch_concurrency: usize,

    /// Maximum redirects followed per fetch.
    ///
    /// Default: `10`
    pub max_redirects: usize,

    /// Largest accepted response body, pages and images alike.
    ///
    /// Default: 20 MiB
    pub max_body_bytes: usize,

    /// User-Agent header sent with every request.
    pub user_agent: String,

    /// Treat language guesses the classifier flags as unreliable as "not target language".
    ///
    /// Default: `false`
    pub require_reliable_language: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            language: Language::En,
            fetch_timeout: Duration::from_secs(10),
            page_timeout: Some(Duration::from_secs(60)),
            image_concurrency: 8,
            batch_concurrency: 4,
            max_redirects: 10,
            max_body_bytes: 20 * 1024 * 1024,
            user_agent: concat!("rs-scraper-graph/", env!("CARGO_PKG_VERSION")).to_string(),
            require_reliable_language: false,
        }
    }
}

impl Options {
    /// Text mode for the configured language.
    #[must_use]
    pub fn text_mode(&self) -> ScoringMode {
        ScoringMode::text(self.language)
    }
}
