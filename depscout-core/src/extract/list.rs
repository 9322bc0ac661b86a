use super::meta;
use crate::chain::chain_id_from_links;
use crate::model::DeploymentRecord;
use depscout_scanner::{NodeId, RenderedPage};
use regex::Regex;
use std::sync::LazyLock;

static LIST_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+:0x[a-fA-F0-9]{40}$").unwrap());

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Text with everything but word characters and colons removed.
fn compact(text: &str) -> String {
    text.chars().filter(|c| is_word_char(*c) || *c == ':').collect()
}

pub fn is_list_item(text: &str) -> bool {
    LIST_ITEM_RE.is_match(&compact(text))
}

/// Splits `name:address` element text into its parts. Separator characters
/// inside the name are folded to single underscores.
pub fn parse_list_item(text: &str) -> Option<(String, String)> {
    if !is_list_item(text) {
        return None;
    }

    let mut folded = String::new();
    for c in text.chars().filter(|c| !c.is_whitespace()) {
        let c = if is_word_char(c) || c == ':' { c } else { '_' };
        if c == '_' && folded.ends_with('_') {
            continue;
        }
        folded.push(c);
    }

    let mut parts = folded.split(':');
    let name = parts.next()?.to_string();
    let address = parts.next()?.to_lowercase().replace('_', "");
    Some((name, address))
}

fn record_from_element(page: &RenderedPage, element: NodeId) -> Option<DeploymentRecord> {
    let text = page.document.text(element);
    let (name, address) = parse_list_item(&text)?;

    let links = page.links_within(element);
    let chain_id = chain_id_from_links(links.iter().map(String::as_str), &address);
    let heading = meta::nearest_heading(&page.document, element);

    Some(
        DeploymentRecord::new(address)
            .with_name(Some(name))
            .with_chain_id(chain_id)
            .with_provenance(meta::provenance(page, element, text.trim(), heading)),
    )
}

/// `name:address` pairs written out in `<li>` and `<p>` elements.
pub fn extract_from_lists(page: &RenderedPage) -> Vec<DeploymentRecord> {
    page.query_all("li")
        .into_iter()
        .chain(page.query_all("p"))
        .filter_map(|element| record_from_element(page, element))
        .collect()
}
