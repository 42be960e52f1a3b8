//! Error types for rs-scraper-graph.
//!
//! This module defines the error types returned by extraction operations.
//! Per-node failures (language detection, image fetch or decode) never show
//! up here: they are absorbed into sentinel scores where they happen.

use std::time::Duration;

use crate::fetch::FetchError;
use crate::graph::RELEVANT_TEXT_TAGS;
use crate::language::Language;

/// Error type for extraction operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The document could not be turned into a tree worth scoring.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// A page URL was not an absolute http(s) URL.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Fetching the page itself failed (transport error or non-success status).
    #[error("Failed to fetch the website {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },

    /// No node cleared the scoring threshold for the requested mode.
    #[error("{0}")]
    NotFound(NotFoundReason),

    /// A language code outside the supported set.
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// The whole extraction ran past its deadline.
    #[error("Extraction of {url} timed out after {after:?}")]
    Timeout { url: String, after: Duration },

    /// The caller cancelled the extraction.
    #[error("Extraction cancelled")]
    Cancelled,

    /// The HTTP client could not be built.
    #[error("HTTP client setup failed: {0}")]
    Client(String),
}

impl Error {
    /// Whether this is the expected "nothing qualified" outcome rather than a failure.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Why no winning node could be returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundReason {
    /// Image mode: no `img` resolved to a measurable image.
    NoQualifyingImage,
    /// Text mode: no relevant tag held text in the target language.
    NoTextInLanguage(Language),
}

impl std::fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoQualifyingImage => write!(
                f,
                "No qualifying image found on the webpage. Only 'img' tags are considered; other tags are ignored."
            ),
            Self::NoTextInLanguage(language) => write!(
                f,
                "No text in language '{}' found on the webpage. Only html tags ({}) are considered; other tags are ignored.",
                language.code(),
                RELEVANT_TEXT_TAGS.join(", ")
            ),
        }
    }
}

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;
