//! Arena-backed scoring tree.
//!
//! The tree mirrors the parsed document: one [`ScoringNode`] per element and
//! per non-blank text fragment, stored in pre-order in a flat `Vec`. Nodes
//! refer to each other by index and read document content through a
//! borrowed `NodeRef`, so the document must outlive the tree.
//!
//! Construction is iterative (explicit stack), so deeply nested documents
//! cannot overflow the call stack.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::dom::{self, Document, NodeRef};
use crate::resolver::ImageMetadata;

/// Index of a node inside its [`ScoringTree`].
pub type NodeIndex = usize;

/// Reserved tag name of text fragments.
pub const TEXT_NODE_NAME: &str = "text";

/// Reserved tag name of the document root.
pub const DOCUMENT_NODE_NAME: &str = "[document]";

/// Score of a node that is not eligible to win. Any negative score means the same.
pub const EXCLUDED: f64 = -1.0;

/// What a scoring node stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element(String),
    Text,
}

impl NodeKind {
    fn of(source: &NodeRef<'_>) -> Self {
        if source.is_text() {
            return Self::Text;
        }
        match dom::tag_name(source) {
            Some(tag) => Self::Element(tag),
            None => Self::Document,
        }
    }

    /// Tag name, or the reserved name for text and document nodes.
    #[must_use]
    pub fn tag_name(&self) -> &str {
        match self {
            Self::Document => DOCUMENT_NODE_NAME,
            Self::Element(tag) => tag,
            Self::Text => TEXT_NODE_NAME,
        }
    }
}

/// Outcome of scoring one node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeScore {
    pub value: f64,
    /// Text mode only: character count, or `-1` for empty / wrong language.
    pub text_density: Option<i64>,
    /// Image mode only: the measured image behind an `img` node.
    pub image: Option<Arc<ImageMetadata>>,
}

impl NodeScore {
    /// Not eligible, nothing measured.
    #[must_use]
    pub fn excluded() -> Self {
        Self {
            value: EXCLUDED,
            text_density: None,
            image: None,
        }
    }
}

/// A scoring strategy applied to every node of the tree.
pub trait NodeScorer {
    fn score(&self, node: &ScoringNode<'_>) -> NodeScore;
}

/// One node of the scoring tree.
pub struct ScoringNode<'a> {
    kind: NodeKind,
    source: NodeRef<'a>,
    parent: Option<NodeIndex>,
    children: Vec<NodeIndex>,
    breadth: usize,
    depth: usize,
    text_density: Option<i64>,
    score: f64,
    image: Option<Arc<ImageMetadata>>,
}

impl<'a> ScoringNode<'a> {
    #[must_use]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    #[must_use]
    pub fn tag_name(&self) -> &str {
        self.kind.tag_name()
    }

    /// Whether this is an element with the given (lowercase) tag.
    #[must_use]
    pub fn is_element(&self, tag: &str) -> bool {
        matches!(&self.kind, NodeKind::Element(t) if t == tag)
    }

    /// The parsed node this scoring node mirrors.
    #[must_use]
    pub fn source(&self) -> NodeRef<'a> {
        self.source
    }

    #[must_use]
    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    /// Indices of scored children, in document order.
    #[must_use]
    pub fn children(&self) -> &[NodeIndex] {
        &self.children
    }

    /// Number of direct children in the document (1 for text fragments).
    ///
    /// Counts every child node, including whitespace text that never becomes
    /// a scoring node.
    #[must_use]
    pub fn breadth(&self) -> usize {
        self.breadth
    }

    /// Distance from the root; the root has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[must_use]
    pub fn text_density(&self) -> Option<i64> {
        self.text_density
    }

    #[must_use]
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Whether the score is a sentinel rather than a real score.
    #[must_use]
    pub fn is_excluded(&self) -> bool {
        self.score < 0.0
    }

    #[must_use]
    pub fn image(&self) -> Option<&ImageMetadata> {
        self.image.as_deref()
    }

    /// Visible text of the node, read from the document on demand.
    #[must_use]
    pub fn rendered_text(&self) -> String {
        dom::rendered_text(&self.source)
    }

    /// Attribute value, for element nodes.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<String> {
        if !matches!(self.kind, NodeKind::Element(_)) {
            return None;
        }
        dom::attr(&self.source, name).map(|v| v.to_string())
    }

    fn apply(&mut self, score: NodeScore) {
        self.score = score.value;
        self.text_density = score.text_density;
        self.image = score.image;
    }
}

impl fmt::Debug for ScoringNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScoringNode")
            .field("kind", &self.kind)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("breadth", &self.breadth)
            .field("depth", &self.depth)
            .field("text_density", &self.text_density)
            .field("score", &self.score)
            .field("image", &self.image.as_ref().map(|m| m.url.as_str()))
            .finish_non_exhaustive()
    }
}

/// Shadow tree of a parsed document, with the best-scoring node.
#[derive(Debug)]
pub struct ScoringTree<'a> {
    nodes: Vec<ScoringNode<'a>>,
    best: NodeIndex,
}

impl<'a> ScoringTree<'a> {
    /// Build the tree structure of a document, leaving every node unscored.
    #[must_use]
    pub fn build(document: &'a Document) -> Self {
        Self::from_root(document.root())
    }

    /// Build and score in a single pre-order pass.
    ///
    /// The best node is tracked while nodes are materialized: a node replaces
    /// the current best only with a strictly greater score, so ties go to the
    /// node seen first.
    #[must_use]
    pub fn build_scored<S>(document: &'a Document, scorer: &S) -> Self
    where
        S: NodeScorer + ?Sized,
    {
        Self::from_root_scored(document.root(), scorer)
    }

    /// Like [`build`](Self::build), starting from any node.
    #[must_use]
    pub fn from_root(root: NodeRef<'a>) -> Self {
        Self::materialize(root, |_| None)
    }

    /// Like [`build_scored`](Self::build_scored), starting from any node.
    #[must_use]
    pub fn from_root_scored<S>(root: NodeRef<'a>, scorer: &S) -> Self
    where
        S: NodeScorer + ?Sized,
    {
        Self::materialize(root, |node| Some(scorer.score(node)))
    }

    fn materialize<F>(root: NodeRef<'a>, mut score: F) -> Self
    where
        F: FnMut(&ScoringNode<'a>) -> Option<NodeScore>,
    {
        let mut tree = Self {
            nodes: Vec::new(),
            best: 0,
        };
        let mut stack: Vec<(NodeRef<'a>, Option<NodeIndex>, usize)> = vec![(root, None, 0)];

        while let Some((source, parent, depth)) = stack.pop() {
            let child_nodes = dom::child_nodes(&source);
            let mut node = ScoringNode {
                kind: NodeKind::of(&source),
                source,
                parent,
                children: Vec::new(),
                breadth: if source.is_text() { 1 } else { child_nodes.len() },
                depth,
                text_density: None,
                score: EXCLUDED,
                image: None,
            };
            if let Some(result) = score(&node) {
                node.apply(result);
            }

            let index = tree.nodes.len();
            let node_score = node.score;
            tree.nodes.push(node);
            if let Some(parent) = parent {
                tree.nodes[parent].children.push(index);
            }
            if node_score > tree.nodes[tree.best].score {
                tree.best = index;
            }

            if !source.is_text() {
                // Reversed so the first child is popped (and numbered) first.
                stack.extend(
                    child_nodes
                        .into_iter()
                        .rev()
                        .filter(dom::is_scorable_child)
                        .map(|child| (child, Some(index), depth + 1)),
                );
            }
        }

        tree
    }

    /// Score every node with `scorer`, replacing earlier scores.
    ///
    /// Nodes are visited in document pre-order and the best node is
    /// re-selected with the same strict-greater rule as
    /// [`build_scored`](Self::build_scored).
    pub fn score<S>(&mut self, scorer: &S) -> NodeIndex
    where
        S: NodeScorer + ?Sized,
    {
        self.best = 0;
        for index in 0..self.nodes.len() {
            let result = scorer.score(&self.nodes[index]);
            self.nodes[index].apply(result);
            if self.nodes[index].score > self.nodes[self.best].score {
                self.best = index;
            }
        }
        self.best
    }

    #[must_use]
    pub fn root(&self) -> &ScoringNode<'a> {
        &self.nodes[0]
    }

    #[must_use]
    pub fn node(&self, index: NodeIndex) -> Option<&ScoringNode<'a>> {
        self.nodes.get(index)
    }

    /// The highest-scoring node (the root while nothing scores above it).
    #[must_use]
    pub fn best(&self) -> &ScoringNode<'a> {
        &self.nodes[self.best]
    }

    #[must_use]
    pub fn best_index(&self) -> NodeIndex {
        self.best
    }

    /// Number of nodes, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree has at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in document pre-order.
    pub fn iter(&self) -> impl Iterator<Item = &ScoringNode<'a>> {
        self.nodes.iter()
    }

    /// Scored children of a node, in document order.
    pub fn children_of(&self, index: NodeIndex) -> impl Iterator<Item = &ScoringNode<'a>> {
        self.nodes
            .get(index)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|&child| &self.nodes[child])
    }

    /// Distinct, non-empty `src` values of `img` nodes, in document order.
    #[must_use]
    pub fn image_sources(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.nodes
            .iter()
            .filter(|node| node.is_element("img"))
            .filter_map(|node| node.attr("src"))
            .map(|src| src.trim().to_string())
            .filter(|src| !src.is_empty() && seen.insert(src.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedScore(f64);

    impl NodeScorer for FixedScore {
        fn score(&self, _node: &ScoringNode<'_>) -> NodeScore {
            NodeScore {
                value: self.0,
                text_density: None,
                image: None,
            }
        }
    }

    /// Scores `p` nodes by the number in their `data-score` attribute.
    struct AttrScore;

    impl NodeScorer for AttrScore {
        fn score(&self, node: &ScoringNode<'_>) -> NodeScore {
            let value = node
                .attr("data-score")
                .and_then(|v| v.parse().ok())
                .unwrap_or(EXCLUDED);
            NodeScore {
                value,
                text_density: None,
                image: None,
            }
        }
    }

    fn tags(tree: &ScoringTree<'_>) -> Vec<String> {
        tree.iter().map(|n| n.tag_name().to_string()).collect()
    }

    #[test]
    fn root_is_document_at_depth_zero() {
        let doc = dom::parse("<p>x</p>");
        let tree = ScoringTree::build(&doc);
        assert_eq!(tree.root().kind(), &NodeKind::Document);
        assert_eq!(tree.root().tag_name(), DOCUMENT_NODE_NAME);
        assert_eq!(tree.root().depth(), 0);
        assert_eq!(tree.root().parent(), None);
    }

    #[test]
    fn nodes_are_stored_in_pre_order() {
        let doc = dom::parse("<html><head></head><body><div><p>a</p><span>b</span></div><ul><li>c</li></ul></body></html>");
        let tree = ScoringTree::build(&doc);
        assert_eq!(
            tags(&tree),
            vec![
                "[document]", "html", "head", "body", "div", "p", "text", "span", "text", "ul", "li",
                "text",
            ]
        );
    }

    #[test]
    fn depth_is_parent_depth_plus_one() {
        let doc = dom::parse("<div><section><p>deep <b>text</b></p></section></div>");
        let tree = ScoringTree::build(&doc);
        for node in tree.iter().skip(1) {
            let parent = tree.node(node.parent().unwrap()).unwrap();
            assert_eq!(node.depth(), parent.depth() + 1);
        }
        let b = tree.iter().find(|n| n.is_element("b")).unwrap();
        // document > html > body > div > section > p > b
        assert_eq!(b.depth(), 6);
    }

    #[test]
    fn every_child_appears_once_under_its_parent() {
        let doc = dom::parse("<ul><li>1</li><li>2</li><li>3</li></ul>");
        let tree = ScoringTree::build(&doc);
        for (index, node) in tree.iter().enumerate().skip(1) {
            let parent = node.parent().unwrap();
            let occurrences = tree
                .node(parent)
                .unwrap()
                .children()
                .iter()
                .filter(|&&c| c == index)
                .count();
            assert_eq!(occurrences, 1);
        }
        let ul = tree.iter().position(|n| n.is_element("ul")).unwrap();
        let items: Vec<_> = tree.children_of(ul).map(|n| n.rendered_text()).collect();
        assert_eq!(items, vec!["1", "2", "3"]);
    }

    #[test]
    fn whitespace_text_is_skipped_but_counted_in_breadth() {
        let doc = dom::parse("<div>\n  <p>one</p>\n  <p>two</p>\n</div>");
        let tree = ScoringTree::build(&doc);
        let div = tree.iter().position(|n| n.is_element("div")).unwrap();
        assert_eq!(tree.node(div).unwrap().breadth(), 5);
        assert_eq!(tree.children_of(div).count(), 2);
        assert!(tree.children_of(div).all(|n| n.is_element("p")));
    }

    #[test]
    fn text_nodes_have_breadth_one() {
        let doc = dom::parse("<p>hello</p>");
        let tree = ScoringTree::build(&doc);
        let text = tree.iter().find(|n| n.kind() == &NodeKind::Text).unwrap();
        assert_eq!(text.breadth(), 1);
        assert!(text.children().is_empty());
        assert_eq!(text.rendered_text(), "hello");
        assert_eq!(text.attr("src"), None);
    }

    #[test]
    fn unscored_tree_has_root_as_best() {
        let doc = dom::parse("<p>x</p>");
        let tree = ScoringTree::build(&doc);
        assert_eq!(tree.best_index(), 0);
        assert!(tree.best().is_excluded());
        assert!(tree.iter().all(ScoringNode::is_excluded));
    }

    #[test]
    fn equal_scores_keep_the_root() {
        let doc = dom::parse("<p>a</p><p>b</p>");
        let tree = ScoringTree::build_scored(&doc, &FixedScore(5.0));
        assert_eq!(tree.best_index(), 0);
    }

    #[test]
    fn strictly_greater_score_replaces_best() {
        let doc = dom::parse(r#"<p data-score="3">a</p><div><p data-score="7">b</p></div><p data-score="7">c</p>"#);
        let tree = ScoringTree::build_scored(&doc, &AttrScore);
        assert_eq!(tree.best().score(), 7.0);
        assert_eq!(tree.best().rendered_text(), "b");
    }

    #[test]
    fn rescoring_matches_single_pass() {
        let html = r#"<p data-score="1">a</p><p data-score="9">b</p><p data-score="9">c</p>"#;
        let doc = dom::parse(html);
        let single = ScoringTree::build_scored(&doc, &AttrScore);
        let mut two_phase = ScoringTree::build(&doc);
        let best = two_phase.score(&AttrScore);
        assert_eq!(best, single.best_index());
        assert_eq!(two_phase.best().rendered_text(), "b");
    }

    #[test]
    fn image_sources_are_unique_and_ordered() {
        let doc = dom::parse(
            r#"<img src="/b.png"><div><img src=" /a.png "><img src=""><img></div><img src="/b.png">"#,
        );
        let tree = ScoringTree::build(&doc);
        assert_eq!(tree.image_sources(), vec!["/b.png".to_string(), "/a.png".to_string()]);
    }

    #[test]
    fn deep_nesting_does_not_overflow() {
        let depth = 5_000;
        let html = format!("{}<p>bottom</p>{}", "<div>".repeat(depth), "</div>".repeat(depth));
        let doc = dom::parse(&html);
        let tree = ScoringTree::build(&doc);
        assert!(tree.len() > 3);
        assert!(tree.iter().any(|n| n.is_element("p")));
    }
}
