//! DOM Operations Adapter
//!
//! Thin layer over `dom_query` exposing exactly what the scoring tree needs:
//! node classification, tag names, attribute lookup, ordered children and
//! rendered text. Parsing is permissive: malformed markup always yields a
//! best-effort tree.

// Re-export core types for external use
pub use dom_query::{Document, NodeRef};

// Re-export StrTendril for external use
pub use tendril::StrTendril;

/// Elements whose text content is never rendered.
const NON_RENDERED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Parse an HTML string into a document.
#[inline]
#[must_use]
pub fn parse(html: &str) -> Document {
    Document::from(html)
}

/// Lowercase tag name of an element node.
#[must_use]
pub fn tag_name(node: &NodeRef<'_>) -> Option<String> {
    if !node.is_element() {
        return None;
    }
    node.node_name().map(|t| t.to_ascii_lowercase())
}

/// Attribute value of an element node.
#[inline]
#[must_use]
pub fn attr(node: &NodeRef<'_>, name: &str) -> Option<StrTendril> {
    node.attr(name)
}

/// All direct child nodes, in document order (elements, text, comments).
#[inline]
#[must_use]
pub fn child_nodes<'a>(node: &NodeRef<'a>) -> Vec<NodeRef<'a>> {
    node.children()
}

/// Whether a node is a text node holding only whitespace.
#[must_use]
pub fn is_blank_text(node: &NodeRef<'_>) -> bool {
    node.is_text() && node.text().trim().is_empty()
}

/// Whether a child node takes part in the scoring tree.
///
/// Elements always do; text only when it has non-whitespace content.
/// Comments, doctypes and processing instructions never do.
#[must_use]
pub fn is_scorable_child(node: &NodeRef<'_>) -> bool {
    node.is_element() || (node.is_text() && !is_blank_text(node))
}

/// Visible text of a node and its descendants.
///
/// Text fragments are joined with a single space in document order and the
/// result is trimmed; whitespace inside the text is kept as written.
/// Contents of `script`, `style`, `noscript` and `template` are skipped.
#[must_use]
pub fn rendered_text(node: &NodeRef<'_>) -> String {
    if node.is_text() {
        return node.text().trim().to_string();
    }

    let mut out = String::new();
    let mut first = true;
    let mut stack: Vec<NodeRef<'_>> = node.children().into_iter().rev().collect();

    while let Some(current) = stack.pop() {
        if current.is_text() {
            if !first {
                out.push(' ');
            }
            out.push_str(&current.text());
            first = false;
        } else if current.is_element() {
            let hidden = tag_name(&current)
                .is_some_and(|tag| NON_RENDERED_ELEMENTS.contains(&tag.as_str()));
            if !hidden {
                stack.extend(current.children().into_iter().rev());
            }
        }
    }

    out.trim().to_string()
}
