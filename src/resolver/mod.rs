//! Image resolution.
//!
//! Turns `img` `src` values into [`ImageMetadata`]: the URL is normalized
//! against the page's base URL, fetched, and measured. SVGs go through
//! [`svg`], everything else through [`raster`].
//!
//! Resolution never fails. Any problem (bad status, timeout, undecodable
//! bytes) is logged and produces metadata with a `(0, 0)` size, which the
//! image scorer treats as "not eligible".

pub mod raster;
pub mod svg;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::fetch::{Fetch, FetchError};
use crate::graph::ResolvedImages;
use crate::url_utils::{correct_relative_url, is_svg_url};

/// Where a measured size came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeSource {
    /// Nothing could be measured.
    #[default]
    Unresolved,
    /// Decoded raster image.
    Decoded,
    /// Integer `width`/`height` attributes on an SVG root.
    DeclaredSvg,
    /// Canvas size of a rasterized SVG.
    RasterizedSvg,
}

/// A fetched and measured image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImageMetadata {
    /// Absolute URL the image was fetched from.
    pub url: String,
    /// Raw image bytes (PNG for rasterized SVGs). Serialized as base64.
    #[serde(rename = "img_base64", serialize_with = "crate::result::serialize_base64")]
    pub payload: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub mime_type: Option<String>,
    pub size_source: SizeSource,
}

impl ImageMetadata {
    /// The `(0, 0)` sentinel for an image that could not be measured.
    #[must_use]
    pub fn unresolved(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Whether a usable size was obtained. A zero side means no area.
    #[must_use]
    pub fn is_measured(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Output of a measurement backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Measured {
    pub width: u32,
    pub height: u32,
    pub payload: Vec<u8>,
    pub mime_type: String,
    pub size_source: SizeSource,
}

/// Why one image could not be measured.
///
/// Only ever logged: [`ImageResolver::resolve`] converts it to the sentinel.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("cannot decode image: {0}")]
    Decode(String),

    #[error("cannot measure SVG: {0}")]
    Svg(String),
}

/// Fetches and measures the images of one page.
pub struct ImageResolver {
    fetcher: Arc<dyn Fetch>,
    base_url: String,
    fetch_timeout: Duration,
}

impl ImageResolver {
    /// A resolver for a page whose base URL (`scheme://host`) is `base_url`.
    pub fn new(fetcher: Arc<dyn Fetch>, base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url.into(),
            fetch_timeout: Duration::from_secs(10),
        }
    }

    #[must_use]
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve one `src` value. Failures yield [`ImageMetadata::unresolved`].
    pub async fn resolve(&self, src: &str) -> ImageMetadata {
        self.resolve_url(correct_relative_url(&self.base_url, src)).await
    }

    async fn resolve_url(&self, url: String) -> ImageMetadata {
        match self.measure(&url).await {
            Ok(measured) => {
                debug!(
                    url = %url,
                    width = measured.width,
                    height = measured.height,
                    source = ?measured.size_source,
                    "image measured"
                );
                ImageMetadata {
                    url,
                    payload: measured.payload,
                    width: measured.width,
                    height: measured.height,
                    mime_type: Some(measured.mime_type),
                    size_source: measured.size_source,
                }
            }
            Err(e) => {
                warn!(url = %url, error = %e, "image could not be measured");
                ImageMetadata::unresolved(url)
            }
        }
    }

    async fn measure(&self, url: &str) -> std::result::Result<Measured, ResolveError> {
        let fetched = tokio::time::timeout(self.fetch_timeout, self.fetcher.fetch(url))
            .await
            .map_err(|_| FetchError::Timeout)??;

        let vector = is_svg_url(url) || fetched.media_type().as_deref() == Some(svg::SVG_MIME);
        let body = fetched.body;
        tokio::task::spawn_blocking(move || {
            if vector {
                svg::measure(body)
            } else {
                raster::measure(body)
            }
        })
        .await
        .map_err(|e| ResolveError::Decode(e.to_string()))?
    }

    /// Resolve every `src`, fetching each distinct absolute URL once with at
    /// most `concurrency` fetches in flight. The map is keyed by raw `src`.
    ///
    /// Returns `Err(Error::Cancelled)` as soon as `cancel` fires; fetches
    /// still in flight are dropped.
    pub async fn resolve_all<I>(
        &self,
        sources: I,
        concurrency: usize,
        cancel: &CancellationToken,
    ) -> Result<ResolvedImages>
    where
        I: IntoIterator<Item = String>,
    {
        let sources: Vec<(String, String)> = sources
            .into_iter()
            .map(|src| {
                let url = correct_relative_url(&self.base_url, &src);
                (src, url)
            })
            .collect();
        let unique: Vec<String> = {
            let mut seen = HashSet::new();
            sources
                .iter()
                .filter(|(_, url)| seen.insert(url.as_str()))
                .map(|(_, url)| url.clone())
                .collect()
        };
        debug!(count = unique.len(), base_url = %self.base_url, "resolving images");

        let work = stream::iter(unique)
            .map(|url| async move {
                let metadata = self.resolve_url(url.clone()).await;
                (url, Arc::new(metadata))
            })
            .buffer_unordered(concurrency.max(1))
            .collect::<HashMap<_, _>>();

        let by_url = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(Error::Cancelled),
            by_url = work => by_url,
        };

        Ok(sources
            .into_iter()
            .filter_map(|(src, url)| by_url.get(&url).map(|metadata| (src, Arc::clone(metadata))))
            .collect())
    }
}
