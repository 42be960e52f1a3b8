//! Text-mode scoring.
//!
//! A relevant element scores `depth * breadth * density`, where density is the
//! character count of its rendered text if that text is in the target
//! language. Everything else gets the sentinel.

use crate::language::{Language, LanguageClassifier};

use super::tree::{NodeKind, NodeScore, NodeScorer, ScoringNode, EXCLUDED};

/// Elements that can hold the winning passage.
pub const RELEVANT_TEXT_TAGS: &[&str] = &[
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "article",
    "section",
    "p",
    "blockquote",
    "li",
    "td",
    "th",
];

/// Density of text that is empty or not in the target language.
pub const NO_DENSITY: i64 = -1;

#[must_use]
pub fn is_relevant_text_tag(tag: &str) -> bool {
    RELEVANT_TEXT_TAGS.contains(&tag)
}

/// Scores relevant elements by the amount of target-language text they hold.
pub struct TextScorer<'c> {
    language: Language,
    classifier: &'c dyn LanguageClassifier,
}

impl<'c> TextScorer<'c> {
    #[must_use]
    pub fn new(language: Language, classifier: &'c dyn LanguageClassifier) -> Self {
        Self {
            language,
            classifier,
        }
    }

    #[must_use]
    pub fn language(&self) -> Language {
        self.language
    }

    /// Character count of `text` when it is in the target language, else [`NO_DENSITY`].
    #[must_use]
    pub fn text_density(&self, text: &str) -> i64 {
        if text.is_empty() || self.classifier.classify(text) != Some(self.language) {
            return NO_DENSITY;
        }
        i64::try_from(text.chars().count()).unwrap_or(i64::MAX)
    }
}

impl NodeScorer for TextScorer<'_> {
    fn score(&self, node: &ScoringNode<'_>) -> NodeScore {
        let relevant = matches!(node.kind(), NodeKind::Element(tag) if is_relevant_text_tag(tag));
        if !relevant {
            return NodeScore::excluded();
        }

        let density = self.text_density(&node.rendered_text());
        let value = if density > 0 {
            node.depth() as f64 * node.breadth() as f64 * density as f64
        } else {
            EXCLUDED
        };

        NodeScore {
            value,
            text_density: Some(density),
            image: None,
        }
    }
}
