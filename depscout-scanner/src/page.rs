use crate::dom::{Document, NodeId};
use std::collections::HashSet;
use url::Url;

/// A loaded page: its URL and the element tree it rendered to.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub url: String,
    pub document: Document,
}

impl RenderedPage {
    pub fn new(url: impl Into<String>, document: Document) -> Self {
        Self {
            url: url.into(),
            document,
        }
    }

    pub fn from_html(url: impl Into<String>, html: &str) -> Self {
        Self::new(url, Document::parse(html))
    }

    pub fn title(&self) -> String {
        self.document.title()
    }

    /// All elements with the given tag, in document order.
    pub fn query_all(&self, tag: &str) -> Vec<NodeId> {
        self.document.find_all(tag)
    }

    /// Resolves an `href` against the page URL. Only http(s) targets are kept,
    /// and the fragment is dropped.
    pub fn resolve_href(&self, href: &str) -> Option<String> {
        resolve_url(&self.url, href)
    }

    /// Absolute hrefs of the anchors under `scope`, in document order.
    pub fn links_within(&self, scope: NodeId) -> Vec<String> {
        self.document
            .find_all_within(scope, "a")
            .into_iter()
            .filter_map(|a| self.document.attr(a, "href"))
            .filter_map(|href| self.resolve_href(href))
            .collect()
    }

    /// Every distinct absolute http(s) URL reachable through an anchor on the
    /// page, first-seen order.
    pub fn links(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.links_within(self.document.root())
            .into_iter()
            .filter(|link| seen.insert(link.clone()))
            .collect()
    }
}

pub fn resolve_url(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    // Skip empty, javascript:, mailto:, tel:, etc.
    if href.is_empty()
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with('#')
    {
        return None;
    }

    let base_url = Url::parse(base).ok()?;
    let mut resolved = base_url.join(href).ok()?;
    if !resolved.scheme().starts_with("http") {
        return None;
    }

    resolved.set_fragment(None);
    Some(resolved.to_string())
}
