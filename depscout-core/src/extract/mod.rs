//! Deployment extraction from rendered pages.
//!
//! Tables are read first, in document order, then `name:address` list items.
//! Nothing here fails: elements that do not look like deployments simply
//! contribute no records.

pub mod list;
pub mod meta;
pub mod strategy;
pub mod table;

use crate::model::DeploymentRecord;
use depscout_scanner::{Fetcher, RenderedPage};
use futures::future::join_all;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

pub use list::extract_from_lists;
pub use strategy::{TableStrategy, determine_strategy};
pub use table::{Cell, TableModel, extract_from_table, extract_records, infer_chain_id_and_name};

static ADDRESS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"0x[a-fA-F0-9]{40}").unwrap());

/// First address-shaped substring, lower-cased.
pub fn find_address(text: &str) -> Option<String> {
    ADDRESS_RE
        .find(text)
        .map(|m| m.as_str().to_lowercase())
}

/// All deployment records on a page, tables before lists.
pub async fn extract_contracts<F: Fetcher>(page: &RenderedPage, fetcher: &F) -> Vec<DeploymentRecord> {
    let tables = page.query_all("table");
    let from_tables: Vec<DeploymentRecord> = join_all(
        tables
            .iter()
            .map(|table| extract_from_table(page, *table, fetcher)),
    )
    .await
    .into_iter()
    .flatten()
    .collect();

    let from_lists = extract_from_lists(page);
    debug!(
        "{}: {} table record(s), {} list record(s)",
        page.url,
        from_tables.len(),
        from_lists.len()
    );

    from_tables.into_iter().chain(from_lists).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_address() {
        assert_eq!(
            find_address("deployed at 0xABCDEF0000000000000000000000000000000001 on mainnet"),
            Some("0xabcdef0000000000000000000000000000000001".to_string())
        );
        assert_eq!(find_address("0x1234"), None);
    }
}
