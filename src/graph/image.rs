//! Image-mode scoring.
//!
//! Only `img` elements with a non-empty `src` take part. Their metadata must
//! already be resolved (see [`crate::resolver::ImageResolver`]); scoring
//! itself never touches the network.

use std::collections::HashMap;
use std::sync::Arc;

use crate::resolver::ImageMetadata;

use super::tree::{NodeScore, NodeScorer, ScoringNode};

/// Resolved metadata keyed by the raw (trimmed) `src` attribute.
pub type ResolvedImages = HashMap<String, Arc<ImageMetadata>>;

/// Scores `img` nodes by `(alt length + width * height) / (depth + 1)`.
pub struct ImageScorer<'r> {
    resolved: &'r ResolvedImages,
}

impl<'r> ImageScorer<'r> {
    #[must_use]
    pub fn new(resolved: &'r ResolvedImages) -> Self {
        Self { resolved }
    }
}

/// Alt-text weight: its length, or 1 when the attribute is missing.
fn alt_density(alt: Option<&str>) -> u64 {
    alt.map_or(1, |alt| alt.chars().count() as u64)
}

impl NodeScorer for ImageScorer<'_> {
    fn score(&self, node: &ScoringNode<'_>) -> NodeScore {
        if !node.is_element("img") {
            return NodeScore::excluded();
        }
        let Some(src) = node.attr("src") else {
            return NodeScore::excluded();
        };
        let src = src.trim();
        if src.is_empty() {
            return NodeScore::excluded();
        }
        let Some(metadata) = self.resolved.get(src) else {
            return NodeScore::excluded();
        };
        if !metadata.is_measured() {
            return NodeScore {
                image: Some(Arc::clone(metadata)),
                ..NodeScore::excluded()
            };
        }

        let alt = alt_density(node.attr("alt").as_deref());
        let area = u64::from(metadata.width) * u64::from(metadata.height);
        let value = (alt + area) as f64 / (node.depth() + 1) as f64;

        NodeScore {
            value,
            text_density: None,
            image: Some(Arc::clone(metadata)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom;
    use crate::graph::ScoringTree;
    use crate::resolver::SizeSource;

    fn measured(url: &str, width: u32, height: u32) -> Arc<ImageMetadata> {
        Arc::new(ImageMetadata {
            url: url.to_string(),
            payload: vec![1, 2, 3],
            width,
            height,
            mime_type: Some("image/png".to_string()),
            size_source: SizeSource::Decoded,
        })
    }

    #[test]
    fn alt_defaults_to_one() {
        assert_eq!(alt_density(None), 1);
        assert_eq!(alt_density(Some("")), 0);
        assert_eq!(alt_density(Some("héllo")), 5);
    }

    #[test]
    fn score_divides_area_plus_alt_by_depth_plus_one() {
        let mut resolved = ResolvedImages::new();
        resolved.insert("/a.png".into(), measured("https://ex.com/a.png", 10, 10));
        let doc = dom::parse(r#"<html><body><img src="/a.png" alt="abcd"></body></html>"#);
        let tree = ScoringTree::build_scored(&doc, &ImageScorer::new(&resolved));
        let img = tree.best();
        assert!(img.is_element("img"));
        // depth 3: (4 + 100) / 4
        assert_eq!(img.score(), 26.0);
        assert_eq!(img.image().map(|m| m.url.as_str()), Some("https://ex.com/a.png"));
    }

    #[test]
    fn unmeasured_image_is_excluded_but_keeps_metadata() {
        let mut resolved = ResolvedImages::new();
        resolved.insert(
            "/broken.png".into(),
            Arc::new(ImageMetadata::unresolved("https://ex.com/broken.png")),
        );
        let doc = dom::parse(r#"<img src="/broken.png" alt="big alt text">"#);
        let tree = ScoringTree::build_scored(&doc, &ImageScorer::new(&resolved));
        let img = tree.iter().find(|n| n.is_element("img")).unwrap();
        assert!(img.is_excluded());
        assert!(img.image().is_some());
        assert_eq!(tree.best_index(), 0);
    }

    #[test]
    fn zero_area_image_is_excluded() {
        let mut resolved = ResolvedImages::new();
        resolved.insert("line.svg".into(), measured("https://ex.com/line.svg", 0, 10));
        let doc = dom::parse(r#"<img src="line.svg" alt="abc">"#);
        let tree = ScoringTree::build_scored(&doc, &ImageScorer::new(&resolved));
        let img = tree.iter().find(|n| n.is_element("img")).unwrap();
        assert!(img.is_excluded());
        assert_eq!(tree.best_index(), 0);
    }

    #[test]
    fn images_without_src_or_resolution_are_excluded() {
        let resolved = ResolvedImages::new();
        let doc = dom::parse(r#"<img><img src=""><img src="/never-resolved.png"><p>text</p>"#);
        let tree = ScoringTree::build_scored(&doc, &ImageScorer::new(&resolved));
        assert!(tree.iter().all(|n| n.is_excluded()));
    }

    #[test]
    fn larger_image_wins_regardless_of_order() {
        let mut resolved = ResolvedImages::new();
        resolved.insert("small.png".into(), measured("https://ex.com/small.png", 10, 10));
        resolved.insert("big.png".into(), measured("https://ex.com/big.png", 300, 200));
        let doc = dom::parse(r#"<img src="small.png"><img src="big.png">"#);
        let tree = ScoringTree::build_scored(&doc, &ImageScorer::new(&resolved));
        assert_eq!(tree.best().attr("src").as_deref(), Some("big.png"));
    }
}
