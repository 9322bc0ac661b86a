//! Sorting a page's outbound links into social profiles and a documentation
//! home candidate.

use crate::model::CrawlResult;
use tracing::trace;
use url::Url;

const TWITTER_PREFIX: &str = "https://twitter.com/";
const GITHUB_PREFIX: &str = "https://github.com/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkKind {
    Discord(String),
    Twitter(String),
    Github(String),
    Telegram(String),
    Documentation(String),
    Other,
}

/// First path segment after `prefix`, cut at `/`, `?` or `#`.
fn handle_after<'a>(link: &'a str, prefix: &str) -> Option<&'a str> {
    let start = link.find(prefix)? + prefix.len();
    let rest = &link[start..];
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let handle = &rest[..end];
    (!handle.is_empty()).then_some(handle)
}

/// Classifies one link; the first matching rule wins.
pub fn classify_link(link: &str) -> LinkKind {
    if link.contains("discord") {
        LinkKind::Discord(link.to_string())
    } else if link.contains(TWITTER_PREFIX) {
        match handle_after(link, TWITTER_PREFIX) {
            Some(handle) => LinkKind::Twitter(format!("{}{}", TWITTER_PREFIX, handle)),
            None => LinkKind::Other,
        }
    } else if link.starts_with(GITHUB_PREFIX) {
        match handle_after(link, GITHUB_PREFIX) {
            Some(org) => LinkKind::Github(format!("{}{}", GITHUB_PREFIX, org)),
            None => LinkKind::Other,
        }
    } else if link.contains("t.me") || link.contains("telegram") {
        LinkKind::Telegram(link.to_string())
    } else if link.contains("docs") || link.contains("documentation") || link.contains("dev") {
        LinkKind::Documentation(link.to_string())
    } else {
        LinkKind::Other
    }
}

/// Folds every link of a page into the result.
pub fn classify_links<'a, I>(links: I, result: &mut CrawlResult)
where
    I: IntoIterator<Item = &'a str>,
{
    for link in links {
        match classify_link(link) {
            LinkKind::Discord(link) => {
                result.discord.insert(link);
            }
            LinkKind::Twitter(link) => {
                result.twitter.insert(link);
            }
            LinkKind::Github(link) => {
                result.github.insert(link);
            }
            LinkKind::Telegram(link) => {
                result.telegram.insert(link);
            }
            LinkKind::Documentation(link) => {
                let merged = match result.documentation_home.take() {
                    Some(current) => common_base_url(&current, &link),
                    None => link,
                };
                trace!("Documentation home candidate: {}", merged);
                result.documentation_home = Some(merged);
            }
            LinkKind::Other => {}
        }
    }
}

/// Merges two documentation home candidates.
///
/// Candidates on different origins keep the first; on the same origin the
/// result is the origin plus the path segments both share.
pub fn common_base_url(first: &str, second: &str) -> String {
    let (Ok(a), Ok(b)) = (Url::parse(first), Url::parse(second)) else {
        return first.to_string();
    };
    if a.origin() != b.origin() {
        return first.to_string();
    }

    let common: Vec<&str> = a
        .path()
        .split('/')
        .zip(b.path().split('/'))
        .take_while(|(x, y)| x == y)
        .map(|(x, _)| x)
        .collect();
    let path = common.join("/");

    match a.join(if path.is_empty() { "/" } else { &path }) {
        Ok(url) => url.to_string(),
        Err(_) => first.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_order() {
        assert_eq!(
            classify_link("https://discord.gg/docs"),
            LinkKind::Discord("https://discord.gg/docs".to_string())
        );
        assert_eq!(
            classify_link("https://twitter.com/acme/status/42?s=20"),
            LinkKind::Twitter("https://twitter.com/acme".to_string())
        );
        assert_eq!(
            classify_link("https://github.com/acme-labs/contracts/tree/main"),
            LinkKind::Github("https://github.com/acme-labs".to_string())
        );
        assert_eq!(
            classify_link("https://t.me/acme"),
            LinkKind::Telegram("https://t.me/acme".to_string())
        );
        assert_eq!(
            classify_link("https://acme.dev/"),
            LinkKind::Documentation("https://acme.dev/".to_string())
        );
        assert_eq!(classify_link("https://acme.io/blog"), LinkKind::Other);
    }

    #[test]
    fn test_github_must_be_a_prefix() {
        assert_eq!(
            classify_link("https://example.com/?ref=https://github.com/acme"),
            LinkKind::Other
        );
    }

    #[test]
    fn test_bare_profile_hosts_are_discarded() {
        assert_eq!(classify_link("https://twitter.com/"), LinkKind::Other);
        assert_eq!(classify_link("https://github.com/"), LinkKind::Other);
    }

    #[test]
    fn test_common_base_url() {
        assert_eq!(
            common_base_url("https://acme.io/docs/intro", "https://acme.io/docs/api/router"),
            "https://acme.io/docs"
        );
        assert_eq!(
            common_base_url("https://acme.io/docs/intro", "https://acme.io/guide"),
            "https://acme.io/"
        );
        assert_eq!(
            common_base_url("https://docs.acme.io/intro", "https://acme.io/docs"),
            "https://docs.acme.io/intro"
        );
    }

    #[test]
    fn test_classify_links_merges_doc_candidates() {
        let mut result = CrawlResult::new("https://acme.io");
        classify_links(
            [
                "https://acme.io/docs/start",
                "https://twitter.com/acme",
                "https://acme.io/docs/contracts",
                "https://twitter.com/acme/",
                "https://acme.io/about",
            ],
            &mut result,
        );
        assert_eq!(result.documentation_home.as_deref(), Some("https://acme.io/docs"));
        assert_eq!(result.twitter.len(), 1);
        assert!(result.has_socials());
    }
}
