// Shared fixtures for integration tests

#![allow(dead_code)]

use depscout_scanner::{FetchOutcome, Fetcher, Navigation, RenderedPage, Renderer};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Serves fixed HTML per URL and records every navigation.
#[derive(Clone, Default)]
pub struct StaticRenderer {
    pages: Arc<HashMap<String, String>>,
    log: Arc<Mutex<Vec<String>>>,
    closed: Arc<AtomicBool>,
}

impl StaticRenderer {
    pub fn new(pages: &[(&str, &str)]) -> Self {
        Self {
            pages: Arc::new(
                pages
                    .iter()
                    .map(|(url, html)| (url.to_string(), html.to_string()))
                    .collect(),
            ),
            ..Default::default()
        }
    }

    pub fn visits(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Renderer for StaticRenderer {
    async fn navigate(&mut self, url: &str) -> Navigation {
        self.log.lock().unwrap().push(url.to_string());
        match self.pages.get(url) {
            Some(html) => Navigation::Loaded(RenderedPage::from_html(url, html)),
            None => Navigation::NotFound,
        }
    }

    async fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Fetcher backed by a map; unknown URLs are not found.
#[derive(Default)]
pub struct StaticFetcher {
    bodies: HashMap<String, FetchOutcome>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, url: &str, body: &str) -> Self {
        self.bodies
            .insert(url.to_string(), FetchOutcome::Body(body.as_bytes().to_vec()));
        self
    }
}

impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        self.bodies.get(url).cloned().unwrap_or(FetchOutcome::NotFound)
    }
}

/// `<a>` tags for each href.
pub fn anchors(hrefs: &[&str]) -> String {
    hrefs
        .iter()
        .map(|href| format!(r#"<a href="{}">{}</a>"#, href, href))
        .collect()
}

pub fn page(title: &str, body: &str) -> String {
    format!(
        "<html><head><title>{}</title></head><body>{}</body></html>",
        title, body
    )
}
