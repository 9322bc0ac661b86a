use crate::crawl::{CrawlConfig, VisitedSet, crawl_root};
use crate::model::CrawlResult;
use crate::report::ResultStore;
use depscout_scanner::{Fetcher, Renderer, ScanError};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};
use tracing::{debug, info, warn};

/// Options for a batch of root URLs.
pub struct BatchOptions {
    pub urls: Vec<String>,
    pub config: CrawlConfig,
    /// Skip roots that already have a persisted result.
    pub resume: bool,
}

/// Callback for reporting batch progress
pub type BatchProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Callback for each completed root
pub type BatchResultCallback = Arc<dyn Fn(&CrawlResult) + Send + Sync>;

/// Roots still to crawl, in input order, without duplicates.
pub fn pending_roots(urls: &[String], crawled: &HashSet<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.iter()
        .filter(|url| !crawled.contains(*url) && seen.insert(url.to_string()))
        .cloned()
        .collect()
}

/// Crawls every root, at most `config.concurrency` at a time, writing the
/// store after each completed root.
///
/// `make_renderer` is called once per root; each renderer is closed when its
/// root finishes. Returns the results of this batch in completion order.
pub async fn execute_batch<R, F, M>(
    options: BatchOptions,
    mut make_renderer: M,
    fetcher: Arc<F>,
    store: ResultStore,
    progress_callback: Option<BatchProgressCallback>,
    result_callback: Option<BatchResultCallback>,
) -> Result<Vec<CrawlResult>, ScanError>
where
    R: Renderer + 'static,
    F: Fetcher + 'static,
    M: FnMut() -> R,
{
    let BatchOptions {
        urls,
        config,
        resume,
    } = options;

    let queue = if resume {
        pending_roots(&urls, &store.crawled_roots())
    } else {
        pending_roots(&urls, &HashSet::new())
    };
    let skipped = urls.len() - queue.len();
    if skipped > 0 {
        info!("Skipping {} root(s) already crawled or duplicated", skipped);
    }

    let total = queue.len();
    let concurrency = config.concurrency.max(1);
    info!("Crawling {} root(s), {} at a time", total, concurrency);

    let config = Arc::new(config);
    let shared = VisitedSet::new();
    let store = Arc::new(Mutex::new(store));
    let results = Arc::new(Mutex::new(Vec::new()));
    let semaphore = Arc::new(Semaphore::new(concurrency));
    let mut handles = Vec::with_capacity(total);

    for (idx, url) in queue.into_iter().enumerate() {
        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| ScanError::Other(format!("Semaphore closed: {}", e)))?;

        if let Some(ref callback) = progress_callback {
            callback(format!("Crawling root {}/{}: {}", idx + 1, total, url));
        }

        let renderer = make_renderer();
        let fetcher = fetcher.clone();
        let config = config.clone();
        let visited = if config.share_visited {
            shared.clone()
        } else {
            VisitedSet::new()
        };
        let store = store.clone();
        let results = results.clone();
        let result_cb = result_callback.clone();

        handles.push(tokio::spawn(async move {
            let result = crawl_root(renderer, fetcher.as_ref(), &url, &visited, &config).await;
            drop(permit);

            if let Some(ref callback) = result_cb {
                callback(&result);
            }

            {
                let mut store = store.lock().await;
                store.push(result.clone());
                if let Err(e) = store.save() {
                    warn!("Failed to write results after {}: {}", url, e);
                }
            }
            results.lock().await.push(result);
            debug!("Finished root {}", url);
        }));
    }

    for handle in handles {
        if let Err(e) = handle.await {
            warn!("Crawl task failed: {}", ScanError::from(e));
        }
    }

    let results = std::mem::take(&mut *results.lock().await);
    info!(
        "Batch complete. {} root(s) crawled, {} page(s) in the shared visited set",
        results.len(),
        shared.len().await
    );
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_roots_skips_crawled_and_duplicates() {
        let urls = vec![
            "https://a.io".to_string(),
            "https://b.io".to_string(),
            "https://a.io".to_string(),
            "https://c.io".to_string(),
        ];
        let crawled = HashSet::from(["https://b.io".to_string()]);
        assert_eq!(
            pending_roots(&urls, &crawled),
            vec!["https://a.io".to_string(), "https://c.io".to_string()]
        );
    }
}
