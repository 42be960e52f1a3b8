//! Scoring graph.
//!
//! A [`ScoringTree`] mirrors the parsed document, one node per element and
//! per non-blank text fragment. A [`NodeScorer`] assigns every node a score
//! and the tree keeps the highest one as its best node. Two scorers exist:
//!
//! - [`TextScorer`]: `depth * breadth * density` for relevant text elements
//! - [`ImageScorer`]: `(alt + width * height) / (depth + 1)` for `img` elements
//!
//! Negative scores are sentinels for "not eligible"; [`resolve_best`] turns a
//! sentinel winner into [`Error::NotFound`](crate::Error::NotFound).

mod best;
mod image;
mod text;
mod tree;

pub use best::resolve_best;
pub use image::{ImageScorer, ResolvedImages};
pub use text::{is_relevant_text_tag, TextScorer, NO_DENSITY, RELEVANT_TEXT_TAGS};
pub use tree::{
    NodeIndex, NodeKind, NodeScore, NodeScorer, ScoringNode, ScoringTree, DOCUMENT_NODE_NAME,
    EXCLUDED, TEXT_NODE_NAME,
};
