//! Deterministic collaborators for tests and examples.
//!
//! [`StaticFetcher`] serves canned responses from memory and records every
//! request, so image resolution and page scraping can be exercised without
//! a network. [`png_bytes`] and [`jpeg_bytes`] produce real, decodable
//! images of a given size.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

use crate::fetch::{Fetch, FetchError, Fetched};

#[derive(Debug, Clone)]
enum Canned {
    Body {
        content_type: Option<String>,
        body: Vec<u8>,
    },
    Status(u16),
    Error(FetchError),
}

/// In-memory [`Fetch`] implementation.
///
/// Unknown URLs answer with a 404 status error.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    responses: HashMap<String, Canned>,
    delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
}

impl StaticFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` with the given content type.
    #[must_use]
    pub fn with_body(
        mut self,
        url: impl Into<String>,
        content_type: &str,
        body: impl Into<Vec<u8>>,
    ) -> Self {
        self.responses.insert(
            url.into(),
            Canned::Body {
                content_type: Some(content_type.to_string()),
                body: body.into(),
            },
        );
        self
    }

    /// Serve an HTML page as `text/html; charset=utf-8`.
    #[must_use]
    pub fn with_html(self, url: impl Into<String>, html: &str) -> Self {
        self.with_body(url, "text/html; charset=utf-8", html.as_bytes().to_vec())
    }

    /// Answer with a non-success status.
    #[must_use]
    pub fn with_status(mut self, url: impl Into<String>, status: u16) -> Self {
        self.responses.insert(url.into(), Canned::Status(status));
        self
    }

    /// Fail with a transport-level error.
    #[must_use]
    pub fn with_error(mut self, url: impl Into<String>, error: FetchError) -> Self {
        self.responses.insert(url.into(), Canned::Error(error));
        self
    }

    /// Sleep before answering every request.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every requested URL, in request order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// How many times `url` was requested.
    #[must_use]
    pub fn call_count(&self, url: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == url).count()
    }
}

#[async_trait]
impl Fetch for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<Fetched, FetchError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(url.to_string());
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.responses.get(url) {
            Some(Canned::Body { content_type, body }) => Ok(Fetched {
                url: url.to_string(),
                status: 200,
                content_type: content_type.clone(),
                body: body.clone(),
            }),
            Some(Canned::Status(status)) => Err(FetchError::Status { status: *status }),
            Some(Canned::Error(error)) => Err(error.clone()),
            None => Err(FetchError::Status { status: 404 }),
        }
    }
}

fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let pixels = RgbImage::from_pixel(width, height, Rgb([200, 40, 40]));
    let mut out = Cursor::new(Vec::new());
    match DynamicImage::ImageRgb8(pixels).write_to(&mut out, format) {
        Ok(()) => out.into_inner(),
        Err(_) => Vec::new(),
    }
}

/// A solid-colour PNG of the given size.
#[must_use]
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Png)
}

/// A solid-colour JPEG of the given size.
#[must_use]
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Jpeg)
}
