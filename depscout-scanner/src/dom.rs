//! Owned element tree for rendered pages.
//!
//! `scraper::Html` is not `Send`, so a loaded page is converted once into this
//! arena and every heuristic (heading search, hashing, table normalisation)
//! runs against it as plain data.

use scraper::{Html, Node};

/// Handle to a node inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeKind {
    Root,
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

/// Elements whose text never contributes to rendered text.
const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Elements that break lines when rendered.
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "li", "ul", "ol", "tr", "table", "section", "article", "header", "footer",
    "h1", "h2", "h3", "h4", "h5", "h6", "pre", "blockquote", "dl", "dt", "dd",
];

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
}

impl Document {
    pub fn parse(html: &str) -> Self {
        let parsed = Html::parse_document(html);
        let mut document = Document {
            nodes: vec![NodeData {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Root,
            }],
        };

        // (scraper node, parent id in our arena)
        let mut stack: Vec<_> = parsed
            .tree
            .root()
            .children()
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .map(|child| (child, document.root()))
            .collect();

        while let Some((node, parent)) = stack.pop() {
            let kind = match node.value() {
                Node::Element(element) => {
                    let mut attrs: Vec<(String, String)> = element
                        .attrs()
                        .map(|(name, value)| (name.to_string(), value.to_string()))
                        .collect();
                    // scraper's attribute order is not guaranteed
                    attrs.sort();
                    NodeKind::Element {
                        tag: element.name().to_ascii_lowercase(),
                        attrs,
                    }
                }
                Node::Text(text) => NodeKind::Text(String::from(&**text)),
                _ => continue,
            };

            let is_element = matches!(kind, NodeKind::Element { .. });
            let id = document.push(parent, kind);
            if is_element {
                let children: Vec<_> = node.children().collect();
                for child in children.into_iter().rev() {
                    stack.push((child, id));
                }
            }
        }

        document
    }

    fn push(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            parent: Some(parent),
            children: Vec::new(),
            kind,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Lower-cased tag name, `None` for the root and text nodes.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    /// DOM-style `nodeName` (upper-cased tag).
    pub fn node_name(&self, id: NodeId) -> String {
        self.tag(id).map(str::to_ascii_uppercase).unwrap_or_default()
    }

    pub fn attrs(&self, id: NodeId) -> &[(String, String)] {
        match &self.nodes[id.0].kind {
            NodeKind::Element { attrs, .. } => attrs,
            _ => &[],
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attrs(id)
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attr(id, "class")
            .map(|classes| classes.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    /// Parent, if it is an element (mirrors `parentElement`).
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.nodes[id.0].parent?;
        self.tag(parent).map(|_| parent)
    }

    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes[id.0]
            .children
            .iter()
            .copied()
            .filter(|child| self.tag(*child).is_some())
            .collect()
    }

    /// Element descendants of `id` in document order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.element_children(id).into_iter().rev().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.element_children(next).into_iter().rev());
        }
        out
    }

    /// Every element with the given tag under `scope`, in document order.
    pub fn find_all_within(&self, scope: NodeId, tag: &str) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|id| self.tag(*id) == Some(tag))
            .collect()
    }

    pub fn find_all(&self, tag: &str) -> Vec<NodeId> {
        self.find_all_within(self.root(), tag)
    }

    /// Rendered text of a node, approximating `innerText`: hidden elements are
    /// skipped, `<br>` and block elements break lines, cells are tab separated.
    pub fn text(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.0].kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element { tag, .. } if HIDDEN_TAGS.contains(&tag.as_str()) => {}
            NodeKind::Element { tag, .. } if tag == "br" => out.push('\n'),
            _ => {
                for child in &self.nodes[id.0].children {
                    self.collect_text(*child, out);
                    if let Some(tag) = self.tag(*child) {
                        if BLOCK_TAGS.contains(&tag) {
                            out.push('\n');
                        } else if tag == "td" || tag == "th" {
                            out.push('\t');
                        }
                    }
                }
            }
        }
    }

    /// Text of the node with [`normalize_text`] applied.
    pub fn normalized_text(&self, id: NodeId) -> String {
        normalize_text(&self.text(id))
    }

    /// Contents of the first `<title>`, trimmed.
    pub fn title(&self) -> String {
        self.find_all("title")
            .first()
            .map(|id| {
                let mut raw = String::new();
                for child in &self.nodes[id.0].children {
                    if let NodeKind::Text(text) = &self.nodes[child.0].kind {
                        raw.push_str(text);
                    }
                }
                raw.trim().to_string()
            })
            .unwrap_or_default()
    }
}

/// Drops everything but ASCII word characters, whitespace, commas and hyphens,
/// then collapses runs of whitespace into single spaces.
pub fn normalize_text(s: &str) -> String {
    let kept: String = s
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || c.is_whitespace() || *c == ',' || *c == '-')
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_document_order() {
        let doc = Document::parse("<html><body><p>one</p><div><p>two</p></div><p>three</p></body></html>");
        let texts: Vec<String> = doc.find_all("p").into_iter().map(|p| doc.text(p)).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_parent_element_stops_at_html() {
        let doc = Document::parse("<html><body><p>x</p></body></html>");
        let html = doc.find_all("html")[0];
        let body = doc.find_all("body")[0];
        assert_eq!(doc.parent_element(body), Some(html));
        assert_eq!(doc.parent_element(html), None);
    }

    #[test]
    fn test_text_skips_scripts_and_breaks_lines() {
        let doc = Document::parse("<div>Foo<br>Bar<script>var x = 1;</script></div>");
        let div = doc.find_all("div")[0];
        assert_eq!(doc.text(div), "Foo\nBar");
        assert_eq!(doc.normalized_text(div), "Foo Bar");
    }

    #[test]
    fn test_normalize_text_strips_symbols() {
        assert_eq!(normalize_text("  Token (USDC)  \n  v2.1 "), "Token USDC v21");
        assert_eq!(normalize_text("Ethereum, BSC"), "Ethereum, BSC");
        assert_eq!(normalize_text("!!!"), "");
    }

    #[test]
    fn test_attrs_and_classes() {
        let doc = Document::parse(r#"<span class="h3 title" id="x">Hi</span>"#);
        let span = doc.find_all("span")[0];
        assert!(doc.has_class(span, "h3"));
        assert!(!doc.has_class(span, "h2"));
        assert_eq!(doc.attr(span, "id"), Some("x"));
        assert_eq!(doc.node_name(span), "SPAN");
    }

    #[test]
    fn test_title() {
        let doc = Document::parse("<html><head><title> Ethereum Deployments </title></head><body></body></html>");
        assert_eq!(doc.title(), "Ethereum Deployments");
        assert_eq!(Document::parse("<p>no title</p>").title(), "");
    }
}
