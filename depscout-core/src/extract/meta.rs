use crate::model::Provenance;
use depscout_scanner::{Document, NodeId, RenderedPage};
use sha2::{Digest, Sha256};

const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6", "strong", "b"];
const HEADING_CLASSES: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

fn is_heading_tag(doc: &Document, id: NodeId) -> bool {
    doc.tag(id).is_some_and(|tag| HEADING_TAGS.contains(&tag))
}

fn is_heading(doc: &Document, id: NodeId) -> bool {
    is_heading_tag(doc, id) || HEADING_CLASSES.iter().any(|class| doc.has_class(id, class))
}

/// Text of the heading closest before `start`.
///
/// Preceding siblings are inspected nearest first; within a sibling the last
/// heading in document order wins, and the sibling itself counts when its tag
/// is a heading tag. With no hit the search moves up to the parent and stops
/// below the document root.
pub fn nearest_heading(doc: &Document, start: NodeId) -> Option<String> {
    let mut element = start;
    while let Some(parent) = doc.parent_element(element) {
        let siblings = doc.element_children(parent);
        let index = siblings.iter().position(|s| *s == element).unwrap_or(0);

        for sibling in siblings[..index].iter().rev() {
            let mut headings: Vec<NodeId> = doc
                .descendants(*sibling)
                .into_iter()
                .filter(|d| is_heading(doc, *d) && !doc.normalized_text(*d).is_empty())
                .collect();
            if is_heading_tag(doc, *sibling) {
                headings.push(*sibling);
            }

            if let Some(last) = headings.last() {
                let text = doc.normalized_text(*last);
                return (!text.is_empty()).then_some(text);
            }
        }
        element = parent;
    }
    None
}

/// `NODENAME[name="value" ...]` for an element.
pub fn selector_signature(doc: &Document, id: NodeId) -> String {
    let attrs = doc
        .attrs(id)
        .iter()
        .map(|(name, value)| format!("{}=\"{}\"", name, value))
        .collect::<Vec<_>>()
        .join(" ");
    format!("{}[{}]", doc.node_name(id), attrs)
}

pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

/// `text` is the element text exactly as it should be hashed.
pub fn provenance(
    page: &RenderedPage,
    id: NodeId,
    text: &str,
    nearest_heading: Option<String>,
) -> Provenance {
    Provenance {
        dom_selector_signature: selector_signature(&page.document, id),
        content_hash: content_hash(text),
        page_url: page.url.clone(),
        page_title: page.title(),
        nearest_heading,
    }
}
