// Tests for result persistence and batch crawls

mod common;

use common::{StaticFetcher, StaticRenderer, anchors, page};
use depscout_core::{BatchOptions, CrawlConfig, CrawlResult, DeploymentRecord, ResultStore, execute_batch};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn found(root: &str) -> CrawlResult {
    let mut result = CrawlResult::new(root);
    result.contracts.push(
        DeploymentRecord::new("0xCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCC")
            .with_name(Some("Pool".to_string()))
            .with_chain_id(Some(10)),
    );
    result
}

fn read_store(path: &std::path::Path) -> Vec<CrawlResult> {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

// ============================================================================
// Result Store Tests
// ============================================================================

#[test]
fn test_load_missing_file_is_empty() {
    let dir = TempDir::new().unwrap();
    let store = ResultStore::load(dir.path().join("results.json"));
    assert!(store.is_empty());
}

#[test]
fn test_load_corrupt_file_is_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("results.json");
    fs::write(&path, "{ not json").unwrap();

    let store = ResultStore::load(&path);
    assert!(store.is_empty());
    assert_eq!(store.path(), path.as_path());
}

#[test]
fn test_save_leaves_out_empty_results() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("results.json");

    let mut store = ResultStore::new(&path);
    store.push(found("https://optimistic.io"));
    store.push(CrawlResult::new("https://nothing.io"));
    store.save().unwrap();

    let saved = read_store(&path);
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].root_url, "https://optimistic.io");
    assert_eq!(saved[0].contracts[0].chain_id, Some(10));

    let reloaded = ResultStore::load(&path);
    assert_eq!(reloaded.len(), 1);
    assert!(reloaded.crawled_roots().contains("https://optimistic.io"));
}

#[test]
fn test_backup_copies_existing_results() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("crawled-protocols.json");

    let mut store = ResultStore::new(&path);
    store.push(found("https://optimistic.io"));
    store.save().unwrap();

    let store = ResultStore::load(&path);
    let backup = store.backup().unwrap();

    assert_eq!(backup, dir.path().join("crawled-protocols-backup.json"));
    assert_eq!(read_store(&backup).len(), 1);
}

// ============================================================================
// Batch Tests
// ============================================================================

fn acme_renderer() -> StaticRenderer {
    let home = page("Acme", &anchors(&["https://github.com/acme", "https://docs.acme.io/"]));
    let docs = page(
        "Acme Docs",
        "<p>Router: 0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA</p>",
    );
    StaticRenderer::new(&[
        ("https://acme.io", home.as_str()),
        ("https://docs.acme.io/", docs.as_str()),
    ])
}

#[tokio::test]
async fn test_batch_writes_store_and_skips_crawled_roots() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("results.json");

    let mut existing = ResultStore::new(&path);
    existing.push(found("https://optimistic.io"));
    existing.save().unwrap();

    let observer = acme_renderer();
    let renderer = observer.clone();
    let options = BatchOptions {
        urls: vec![
            "https://optimistic.io".to_string(),
            "https://acme.io".to_string(),
            "https://acme.io".to_string(),
        ],
        config: CrawlConfig::default(),
        resume: true,
    };

    let results = execute_batch(
        options,
        move || renderer.clone(),
        Arc::new(StaticFetcher::new()),
        ResultStore::load(&path),
        None,
        None,
    )
    .await
    .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].root_url, "https://acme.io");
    assert!(!observer.visits().contains(&"https://optimistic.io".to_string()));
    assert!(observer.is_closed());

    let saved = read_store(&path);
    assert_eq!(saved.len(), 2);
    assert_eq!(saved[0].root_url, "https://optimistic.io");
    assert_eq!(saved[1].root_url, "https://acme.io");
    assert_eq!(saved[1].documentation_home.as_deref(), Some("https://docs.acme.io/"));
    assert_eq!(saved[1].contracts[0].name.as_deref(), Some("Router"));
}

#[tokio::test]
async fn test_batch_without_resume_recrawls_everything() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("results.json");

    let mut existing = ResultStore::new(&path);
    existing.push(found("https://acme.io"));
    existing.save().unwrap();

    let observer = acme_renderer();
    let renderer = observer.clone();
    let options = BatchOptions {
        urls: vec!["https://acme.io".to_string()],
        config: CrawlConfig::default(),
        resume: false,
    };

    let results = execute_batch(
        options,
        move || renderer.clone(),
        Arc::new(StaticFetcher::new()),
        ResultStore::new(&path),
        None,
        None,
    )
    .await
    .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(observer.visits()[0], "https://acme.io");
    assert_eq!(read_store(&path).len(), 1);
}
