//! Result types for extraction output.
//!
//! An [`ExtractResult`] describes the winning node of a page: what it is,
//! how it scored, and its content (rendered text, or the resolved image).

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Serialize, Serializer};

use crate::graph::ScoringNode;
use crate::language::Language;
use crate::options::ScoringMode;
use crate::resolver::ImageMetadata;

/// Kind of content a result carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
    Image,
}

/// The best node of a page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractResult {
    /// Page URL, when the HTML came from one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    pub kind: ContentKind,

    /// Tag name of the winning element.
    pub tag: String,

    /// Rendered text (text mode) or absolute image URL (image mode).
    pub content: String,

    /// Target language, text mode only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,

    pub score: f64,
    pub depth: usize,
    pub breadth: usize,

    /// Fetched image, image mode only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageMetadata>,
}

impl ExtractResult {
    pub(crate) fn from_node(node: &ScoringNode<'_>, mode: ScoringMode) -> Self {
        let (kind, content, language, image) = match mode {
            ScoringMode::Text { language } => {
                (ContentKind::Text, node.rendered_text(), Some(language), None)
            }
            ScoringMode::Image => {
                let image = node.image().cloned();
                let content = image
                    .as_ref()
                    .map(|m| m.url.clone())
                    .or_else(|| node.attr("src"))
                    .unwrap_or_default();
                (ContentKind::Image, content, None, image)
            }
        };

        Self {
            url: None,
            kind,
            tag: node.tag_name().to_string(),
            content,
            language,
            score: node.score(),
            depth: node.depth(),
            breadth: node.breadth(),
            image,
        }
    }

    #[must_use]
    pub(crate) fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Human-readable success message.
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self.kind {
            ContentKind::Text => "Text content was successfully extracted from the page.",
            ContentKind::Image => "Image content was successfully extracted from the page.",
        }
    }

    #[must_use]
    pub fn is_image(&self) -> bool {
        self.kind == ContentKind::Image
    }

    /// Image bytes as standard base64, if this is an image result.
    #[must_use]
    pub fn image_base64(&self) -> Option<String> {
        self.image.as_ref().map(|m| STANDARD.encode(&m.payload))
    }
}

pub(crate) fn serialize_base64<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&STANDARD.encode(bytes))
}
