//! URL Utility Functions
//!
//! Page URL validation, base-URL derivation and the normalization applied to
//! image `src` values before they are fetched.

use url::Url;

use crate::error::{Error, Result};

/// A page being processed.
///
/// `base_url` (scheme + host, plus the port when one is given) is derived
/// once at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Website {
    url: Url,
    base_url: String,
}

impl Website {
    /// Validates an absolute http(s) URL.
    pub fn new(url: &str) -> Result<Self> {
        let trimmed = url.trim();
        let parsed = Url::parse(trimmed).map_err(|e| Error::InvalidUrl {
            url: trimmed.to_string(),
            reason: e.to_string(),
        })?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(Error::InvalidUrl {
                url: trimmed.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let base_url = base_url_of(&parsed).ok_or_else(|| Error::InvalidUrl {
            url: trimmed.to_string(),
            reason: "missing host".to_string(),
        })?;

        Ok(Self {
            url: parsed,
            base_url,
        })
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// `scheme://host[:port]`, without path, query or fragment.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn base_url_of(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}://{host}:{port}", url.scheme()),
        None => format!("{}://{host}", url.scheme()),
    })
}

/// Turn an image reference into an absolute URL.
///
/// - `//host/path` is always fetched over https
/// - `/path` is appended to `base_url`
/// - anything without a scheme is joined to `base_url` with `/`
/// - everything else is already absolute and returned as-is
///
/// ```
/// use rs_scraper_graph::url_utils::correct_relative_url;
///
/// assert_eq!(correct_relative_url("https://ex.com", "//cdn.co/a.png"), "https://cdn.co/a.png");
/// assert_eq!(correct_relative_url("https://ex.com", "/a.png"), "https://ex.com/a.png");
/// assert_eq!(correct_relative_url("https://ex.com", "a.png"), "https://ex.com/a.png");
/// ```
#[must_use]
pub fn correct_relative_url(base_url: &str, url: &str) -> String {
    let url = url.trim();
    let base = base_url.trim().trim_end_matches('/');

    if url.starts_with("//") {
        format!("https:{url}")
    } else if url.starts_with('/') {
        format!("{base}{url}")
    } else if scheme_of(url).is_none() {
        format!("{base}/{url}")
    } else {
        url.to_string()
    }
}

/// The scheme of a URL-like string, if it has one.
///
/// A scheme is an ASCII letter followed by letters, digits, `+`, `-` or `.`,
/// terminated by `:`.
fn scheme_of(s: &str) -> Option<&str> {
    let (scheme, _) = s.split_once(':')?;
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    chars
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        .then_some(scheme)
}

/// Whether a resolved image URL points at an SVG document.
///
/// Query string and fragment are ignored, so `icon.svg?v=3` counts.
#[must_use]
pub fn is_svg_url(url: &str) -> bool {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split(['?', '#']).next().unwrap_or(url).to_string(),
    };
    path.to_ascii_lowercase().ends_with(".svg")
}
