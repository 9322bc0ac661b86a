//! Crawl frontier for a single root URL.
//!
//! A run first widens outward from the root looking for social profiles and a
//! documentation home, then walks the documentation space depth first,
//! extracting deployments from every page it loads.

use crate::classify::classify_links;
use crate::dedup::merge_contracts;
use crate::extract::extract_contracts;
use crate::model::CrawlResult;
use depscout_scanner::{Fetcher, Navigation, RenderedPage, Renderer, ScanError};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::{Host, Url};

/// Links containing any of these are never followed inside documentation.
pub const EXCLUDED_LINK_KEYWORDS: &[&str] = &[
    "discord",
    "twitter",
    "facebook",
    "reddit",
    "youtube",
    "github",
    "medium",
    "fb",
    "t.me",
    "telegram",
    "instagram",
    "linkedin",
    "bodis",
    "google",
    "cookie",
];

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Deepest documentation hop followed from the documentation home.
    pub max_depth: usize,
    /// Navigations allowed per root.
    pub max_visits_per_run: usize,
    /// Roots crawled at once by a batch.
    pub concurrency: usize,
    /// Share one visited set across all roots of a batch.
    pub share_visited: bool,
    pub timeout_secs: u64,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_depth: 10,
            max_visits_per_run: 1000,
            concurrency: 40,
            share_visited: true,
            timeout_secs: 30,
        }
    }
}

/// Visited URLs that may be shared between concurrently running roots.
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    inner: Arc<Mutex<HashSet<String>>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `url` as visited. Returns false when it already was.
    pub async fn insert_new(&self, url: &str) -> bool {
        let mut visited = self.inner.lock().await;
        if visited.contains(url) {
            false
        } else {
            visited.insert(url.to_string());
            true
        }
    }

    pub async fn contains(&self, url: &str) -> bool {
        self.inner.lock().await.contains(url)
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}

/// Next URL to try during home discovery: the origin when `url` is not one
/// already, else the parent domain when the host is a domain name with at
/// least three labels. IP hosts have no parent.
pub fn next_home_candidate(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let origin = parsed.origin().ascii_serialization();
    if origin != url {
        return Some(origin);
    }

    let Some(Host::Domain(domain)) = parsed.host() else {
        return None;
    };
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 3 {
        return None;
    }
    Some(format!("{}://{}", parsed.scheme(), labels[1..].join(".")))
}

fn host_with_port(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(match parsed.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

/// Same host, or the same second-level label (`docs.foo.io` ~ `blog.foo.com`).
pub fn is_related(a: &str, b: &str) -> bool {
    let (Some(host_a), Some(host_b)) = (host_with_port(a), host_with_port(b)) else {
        return false;
    };
    if host_a == host_b {
        return true;
    }

    let labels_a: Vec<&str> = host_a.split('.').collect();
    let labels_b: Vec<&str> = host_b.split('.').collect();
    if labels_a.len() < 2 || labels_b.len() < 2 {
        return false;
    }
    labels_a[labels_a.len() - 2] == labels_b[labels_b.len() - 2]
}

fn is_documentation_url(url: &str) -> bool {
    url.contains("docs") || url.contains("documentation")
}

fn is_excluded(link: &str) -> bool {
    EXCLUDED_LINK_KEYWORDS.iter().any(|keyword| link.contains(keyword))
}

/// State of one root's crawl.
pub struct CrawlContext<'a, R, F> {
    renderer: &'a mut R,
    fetcher: &'a F,
    shared: &'a VisitedSet,
    config: &'a CrawlConfig,
    visited: HashSet<String>,
    pub result: CrawlResult,
}

impl<'a, R: Renderer, F: Fetcher> CrawlContext<'a, R, F> {
    pub fn new(
        root_url: &str,
        renderer: &'a mut R,
        fetcher: &'a F,
        shared: &'a VisitedSet,
        config: &'a CrawlConfig,
    ) -> Self {
        Self {
            renderer,
            fetcher,
            shared,
            config,
            visited: HashSet::new(),
            result: CrawlResult::new(root_url),
        }
    }

    /// URLs navigated by this run.
    pub fn visited(&self) -> &HashSet<String> {
        &self.visited
    }

    /// Loads `url` unless it was seen before or the run is out of visits.
    async fn crawl_single_url(&mut self, url: &str) -> Option<RenderedPage> {
        if self.visited.contains(url) || self.visited.len() >= self.config.max_visits_per_run {
            return None;
        }
        if !self.shared.insert_new(url).await {
            debug!("Already visited {}", url);
            return None;
        }
        self.visited.insert(url.to_string());

        match self.renderer.navigate(url).await {
            Navigation::Loaded(page) => Some(page),
            Navigation::NotFound => {
                debug!("Not found: {}", url);
                None
            }
            Navigation::Failed(reason) => {
                debug!("Failed to load {}: {}", url, reason);
                None
            }
        }
    }

    /// Widens from `url` toward its origin and parent domains until both a
    /// social link and a documentation home are known.
    pub async fn crawl_home(&mut self, url: &str) {
        let mut tried = HashSet::new();
        let mut next = Some(url.to_string());
        while let Some(url) = next.take() {
            if !tried.insert(url.clone()) {
                debug!("Home discovery exhausted at {}", url);
                return;
            }

            if let Some(page) = self.crawl_single_url(&url).await {
                let links = page.links();
                classify_links(links.iter().map(String::as_str), &mut self.result);
            }

            if self.result.has_socials() && self.result.documentation_home.is_some() {
                debug!("Home discovery done at {}", url);
                return;
            }
            next = next_home_candidate(&url);
        }
    }

    /// Depth-first walk of the documentation space below `start`.
    pub async fn crawl_docs(&mut self, start: &str) {
        let mut stack: Vec<(String, usize)> = vec![(start.to_string(), 0)];

        while let Some((url, depth)) = stack.pop() {
            if depth > self.config.max_depth || !is_documentation_url(&url) {
                continue;
            }

            let Some(page) = self.crawl_single_url(&url).await else {
                continue;
            };

            let found = extract_contracts(&page, self.fetcher).await;
            if !found.is_empty() {
                debug!("{} record(s) on {}", found.len(), url);
                let existing = std::mem::take(&mut self.result.contracts);
                self.result.contracts = merge_contracts(existing, found);
            }

            let children: Vec<String> = page
                .links()
                .into_iter()
                .filter(|link| !is_excluded(link) && is_related(&url, link))
                .collect();
            // reversed so the first link is explored first
            stack.extend(children.into_iter().rev().map(|link| (link, depth + 1)));
        }
    }

    pub async fn run(&mut self) -> Result<(), ScanError> {
        let root = self.result.root_url.clone();
        Url::parse(&root)?;

        self.crawl_home(&root).await;
        if let Some(home) = self.result.documentation_home.clone() {
            info!("Documentation home for {}: {}", root, home);
            self.crawl_docs(&home).await;
        }
        Ok(())
    }
}

/// Crawls one root and returns whatever was found, even if the run stopped
/// early. The renderer is always closed.
pub async fn crawl_root<R: Renderer, F: Fetcher>(
    mut renderer: R,
    fetcher: &F,
    root_url: &str,
    shared: &VisitedSet,
    config: &CrawlConfig,
) -> CrawlResult {
    info!("Crawling {}", root_url);

    let (outcome, result, visits) = {
        let mut context = CrawlContext::new(root_url, &mut renderer, fetcher, shared, config);
        let outcome = context.run().await;
        let visits = context.visited().len();
        (outcome, context.result, visits)
    };

    if let Err(e) = outcome {
        warn!("Error crawling {}: {}", root_url, e);
    }
    renderer.close().await;

    info!(
        "Crawled {} ({} page(s), {} contract(s))",
        root_url,
        visits,
        result.contracts.len()
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_home_candidate() {
        assert_eq!(
            next_home_candidate("https://sub.example.com/page?x=1"),
            Some("https://sub.example.com".to_string())
        );
        assert_eq!(
            next_home_candidate("https://sub.example.com"),
            Some("https://example.com".to_string())
        );
        assert_eq!(next_home_candidate("https://example.com"), None);
        assert_eq!(
            next_home_candidate("http://a.b.example.com:8080"),
            Some("http://b.example.com".to_string())
        );
        assert_eq!(next_home_candidate("not a url"), None);
        assert_eq!(next_home_candidate("http://192.168.1.1"), None);
        assert_eq!(
            next_home_candidate("http://192.168.1.1/app"),
            Some("http://192.168.1.1".to_string())
        );
        assert_eq!(next_home_candidate("http://[::1]:8080"), None);
    }

    #[test]
    fn test_is_related() {
        assert!(is_related("https://docs.foo.io", "https://blog.foo.com"));
        assert!(is_related("https://foo.io/a", "https://foo.io/b"));
        assert!(!is_related("https://foo.io", "https://bar.io"));
        assert!(!is_related("http://localhost/a", "http://otherhost/b"));
        assert!(is_related("http://localhost:8080/a", "http://localhost:8080/b"));
    }

    #[test]
    fn test_exclusions() {
        assert!(is_excluded("https://docs.foo.io/cookie-policy"));
        assert!(is_excluded("https://medium.com/@foo"));
        assert!(!is_excluded("https://docs.foo.io/contracts"));
    }

    #[tokio::test]
    async fn test_visited_set_insert_new() {
        let visited = VisitedSet::new();
        assert!(visited.insert_new("https://a.io").await);
        assert!(!visited.insert_new("https://a.io").await);
        assert!(visited.contains("https://a.io").await);
        assert_eq!(visited.len().await, 1);
    }
}
