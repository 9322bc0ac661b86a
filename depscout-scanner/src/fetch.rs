use reqwest::{Client, StatusCode};
use std::future::Future;
use tracing::debug;

/// Outcome of fetching a raw document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Body(Vec<u8>),
    NotFound,
    Failed(String),
}

/// Outbound fetches of non-page documents (ABI files).
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = FetchOutcome> + Send;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Fetcher for HttpFetcher {
    // The body is returned whatever the status; callers validate content.
    async fn fetch(&self, url: &str) -> FetchOutcome {
        debug!("Fetching {}", url);
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => return FetchOutcome::Failed(e.to_string()),
        };

        if matches!(response.status(), StatusCode::NOT_FOUND | StatusCode::GONE) {
            return FetchOutcome::NotFound;
        }

        match response.bytes().await {
            Ok(bytes) => FetchOutcome::Body(bytes.to_vec()),
            Err(e) => FetchOutcome::Failed(e.to_string()),
        }
    }
}
