use crate::error::Result;
use crate::page::RenderedPage;
use reqwest::{Client, StatusCode};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

pub const USER_AGENT: &str = "depscout/0.1 (https://github.com/trapdoorsec/depscout)";

/// Outcome of loading a page.
#[derive(Debug, Clone)]
pub enum Navigation {
    Loaded(RenderedPage),
    /// The target answered but the page does not exist.
    NotFound,
    /// Transport error, unusable status, or a body that is not a page.
    Failed(String),
}

/// One rendering surface. A crawl of a single root owns exactly one and
/// closes it when done.
pub trait Renderer: Send {
    fn navigate(&mut self, url: &str) -> impl Future<Output = Navigation> + Send;

    fn close(&mut self) -> impl Future<Output = ()> + Send;
}

/// Builds the shared HTTP client used by the renderer and fetcher.
pub fn build_client(timeout_secs: u64) -> Result<Client> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs((timeout_secs / 2).max(1)))
        .pool_max_idle_per_host(50)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()?;
    Ok(client)
}

/// Renders pages by fetching their static HTML.
pub struct HttpRenderer {
    client: Client,
    closed: bool,
}

impl HttpRenderer {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            closed: false,
        }
    }
}

impl Renderer for HttpRenderer {
    async fn navigate(&mut self, url: &str) -> Navigation {
        if self.closed {
            return Navigation::Failed("page is closed".to_string());
        }

        debug!("Navigating to {}", url);
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => return Navigation::Failed(e.to_string()),
        };

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            return Navigation::NotFound;
        }
        if !status.is_success() {
            return Navigation::Failed(format!("HTTP {}", status.as_u16()));
        }

        // A missing content type is given the benefit of the doubt
        let is_html = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("html"))
            .unwrap_or(true);
        if !is_html {
            return Navigation::Failed("not an HTML page".to_string());
        }

        let final_url = response.url().to_string();
        match response.text().await {
            Ok(body) => Navigation::Loaded(RenderedPage::from_html(final_url, &body)),
            Err(e) => Navigation::Failed(e.to_string()),
        }
    }

    async fn close(&mut self) {
        self.closed = true;
    }
}
