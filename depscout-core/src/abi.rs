use depscout_scanner::{FetchOutcome, Fetcher};
use futures::future::join_all;
use serde_json::Value;
use tracing::debug;
use url::Url;

/// Result of trying one link as an ABI source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiOutcome {
    Found(String),
    NotFound,
    /// The link answered with something that is not an ABI.
    Invalid,
}

/// Rewrites `github.com/<owner>/<repo>/(blob|raw)/<path>` to the raw content
/// host. Other links are returned unchanged.
pub fn raw_github_url(link: &str) -> String {
    let Ok(url) = Url::parse(link) else {
        return link.to_string();
    };
    if url.scheme() != "https" || url.host_str() != Some("github.com") {
        return link.to_string();
    }

    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|part| !part.is_empty()).collect())
        .unwrap_or_default();
    let [owner, repo, rest @ ..] = segments.as_slice() else {
        return link.to_string();
    };

    let rest = match rest.first() {
        Some(&"blob") | Some(&"raw") => &rest[1..],
        _ => rest,
    };
    format!(
        "https://raw.githubusercontent.com/{}/{}/{}",
        owner,
        repo,
        rest.join("/")
    )
}

/// Accepts a body as an ABI when it is a JSON array with at least one
/// `"type": "function"` entry, returning it re-serialized.
pub fn parse_abi(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let entries = value.as_array()?;
    let has_function = entries
        .iter()
        .any(|entry| entry.get("type").and_then(Value::as_str) == Some("function"));
    if !has_function {
        return None;
    }
    serde_json::to_string(&value).ok()
}

pub async fn resolve_abi<F: Fetcher>(fetcher: &F, link: &str) -> AbiOutcome {
    let target = raw_github_url(link);
    match fetcher.fetch(&target).await {
        FetchOutcome::Body(body) => match parse_abi(&body) {
            Some(abi) => AbiOutcome::Found(abi),
            None => AbiOutcome::Invalid,
        },
        FetchOutcome::NotFound => AbiOutcome::NotFound,
        FetchOutcome::Failed(reason) => {
            debug!("ABI fetch failed for {}: {}", target, reason);
            AbiOutcome::NotFound
        }
    }
}

/// Tries every link concurrently; the first link (in the given order) that
/// validates wins.
pub async fn abi_from_links<F: Fetcher>(fetcher: &F, links: &[String]) -> Option<String> {
    if links.is_empty() {
        return None;
    }

    let outcomes = join_all(links.iter().map(|link| resolve_abi(fetcher, link))).await;
    outcomes.into_iter().find_map(|outcome| match outcome {
        AbiOutcome::Found(abi) => Some(abi),
        AbiOutcome::NotFound | AbiOutcome::Invalid => None,
    })
}
