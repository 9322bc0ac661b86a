//! Deployment tables.
//!
//! An HTML table is first flattened into a [`TableModel`] grid. Tables without
//! a single address are rejected outright; the rest go through the strategies
//! in [`super::strategy`], retried on the transposed grid when the direct
//! reading yields nothing.

use super::{meta, strategy};
use crate::chain::chain_id_from_text;
use crate::model::DeploymentRecord;
use depscout_scanner::{Fetcher, NodeId, RenderedPage, normalize_text};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Text(String),
    Link { text: String, href: String },
}

impl Cell {
    pub fn text(&self) -> &str {
        match self {
            Cell::Text(text) | Cell::Link { text, .. } => text,
        }
    }

    pub fn href(&self) -> Option<&str> {
        match self {
            Cell::Text(_) => None,
            Cell::Link { href, .. } => Some(href),
        }
    }

    /// A link cell counts as content even with empty text.
    fn is_present(&self) -> bool {
        match self {
            Cell::Text(text) => !text.is_empty(),
            Cell::Link { .. } => true,
        }
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Cell::Text(text.to_string())
    }
}

/// Rectangular grid of normalised cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableModel {
    rows: Vec<Vec<Cell>>,
}

impl TableModel {
    /// Pads every row to the widest one and drops rows without content.
    pub fn new(raw_rows: Vec<Vec<Cell>>) -> Self {
        let raw_rows: Vec<Vec<Cell>> = raw_rows.into_iter().filter(|row| !row.is_empty()).collect();
        let width = raw_rows.iter().map(Vec::len).max().unwrap_or(0);

        let rows = raw_rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Text(String::new()));
                row
            })
            .filter(|row| row.iter().any(Cell::is_present))
            .collect();

        Self { rows }
    }

    /// Convenience for plain-text grids.
    pub fn from_text(rows: &[&[&str]]) -> Self {
        Self::new(
            rows.iter()
                .map(|row| row.iter().map(|cell| Cell::from(*cell)).collect())
                .collect(),
        )
    }

    /// Reads a `<table>` element. Header cells win over data cells within a
    /// row; a cell with an anchor keeps the anchor's absolute href.
    pub fn from_element(page: &RenderedPage, table: NodeId) -> Self {
        let doc = &page.document;
        let rows = doc
            .find_all_within(table, "tr")
            .into_iter()
            .filter(|tr| owning_table(page, *tr) == Some(table))
            .map(|tr| {
                let children = doc.element_children(tr);
                let headers: Vec<NodeId> = children
                    .iter()
                    .copied()
                    .filter(|c| doc.tag(*c) == Some("th"))
                    .collect();
                let cells = if headers.is_empty() {
                    children
                        .into_iter()
                        .filter(|c| doc.tag(*c) == Some("td"))
                        .collect()
                } else {
                    headers
                };

                cells
                    .into_iter()
                    .map(|cell| {
                        let text = normalize_text(&doc.text(cell));
                        let href = doc
                            .find_all_within(cell, "a")
                            .first()
                            .and_then(|a| doc.attr(*a, "href"))
                            .and_then(|href| page.resolve_href(href));
                        match href {
                            Some(href) => Cell::Link { text, href },
                            None => Cell::Text(text),
                        }
                    })
                    .collect()
            })
            .collect();

        Self::new(rows)
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn header(&self) -> Option<&[Cell]> {
        self.rows.first().map(Vec::as_slice)
    }

    pub fn body(&self) -> &[Vec<Cell>] {
        self.rows.get(1..).unwrap_or(&[])
    }

    pub fn width(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    /// True when any cell holds something shaped like an address.
    pub fn has_address(&self) -> bool {
        self.rows
            .iter()
            .flatten()
            .any(|cell| super::find_address(cell.text()).is_some())
    }

    /// Rows become columns, for tables whose header is the first column.
    pub fn transpose(&self) -> TableModel {
        let rows = (0..self.width())
            .map(|col| self.rows.iter().map(|row| row[col].clone()).collect())
            .collect();
        TableModel { rows }
    }
}

fn owning_table(page: &RenderedPage, id: NodeId) -> Option<NodeId> {
    let doc = &page.document;
    let mut current = doc.parent_element(id);
    while let Some(node) = current {
        if doc.tag(node) == Some("table") {
            return Some(node);
        }
        current = doc.parent_element(node);
    }
    None
}

/// Strategy extraction with the transposed retry.
pub async fn extract_records<F: Fetcher>(table: &TableModel, fetcher: &F) -> Vec<DeploymentRecord> {
    match strategy::extract_with_strategy(table, fetcher).await {
        Some(records) if !records.is_empty() => records,
        _ => {
            debug!("No records from rows, retrying transposed table");
            strategy::extract_with_strategy(&table.transpose(), fetcher)
                .await
                .unwrap_or_default()
        }
    }
}

/// Extracts deployments from one `<table>` element of a page.
pub async fn extract_from_table<F: Fetcher>(
    page: &RenderedPage,
    table: NodeId,
    fetcher: &F,
) -> Vec<DeploymentRecord> {
    let model = TableModel::from_element(page, table);
    if !model.has_address() {
        return Vec::new();
    }

    let mut records = extract_records(&model, fetcher).await;
    if records.is_empty() {
        return Vec::new();
    }

    let provenance = meta::provenance(page, table, &page.document.text(table), None);
    for record in &mut records {
        record.provenance = Some(provenance.clone());
    }

    infer_chain_id_and_name(records, &page.title(), || {
        meta::nearest_heading(&page.document, table)
    })
}

fn has_chain_id_and_name(records: &[DeploymentRecord]) -> bool {
    records.iter().any(|r| r.chain_id.is_some()) && records.iter().any(|r| r.name.is_some())
}

fn has_no_chain_id(records: &[DeploymentRecord]) -> bool {
    records.iter().all(|r| r.chain_id.is_none())
}

fn has_no_name(records: &[DeploymentRecord]) -> bool {
    records.iter().all(|r| r.name.is_none())
}

/// Fills in a table-wide chain id from the page title or nearest heading, or,
/// when the chain is already known, a table-wide name from the nearest heading.
pub fn infer_chain_id_and_name(
    mut records: Vec<DeploymentRecord>,
    page_title: &str,
    nearest_heading: impl FnOnce() -> Option<String>,
) -> Vec<DeploymentRecord> {
    if has_chain_id_and_name(&records) {
        return records;
    }

    if has_no_chain_id(&records)
        && let Some(chain_id) = chain_id_from_text(page_title)
    {
        for record in &mut records {
            record.chain_id = Some(chain_id);
        }
    }

    if has_chain_id_and_name(&records) {
        return records;
    }

    let Some(heading) = nearest_heading() else {
        return records;
    };

    for record in &mut records {
        if let Some(provenance) = record.provenance.as_mut() {
            provenance.nearest_heading = Some(heading.clone());
        }
    }

    // The heading names the table only when the chain came from elsewhere.
    if has_no_chain_id(&records) {
        if let Some(chain_id) = chain_id_from_text(&heading) {
            for record in &mut records {
                record.chain_id = Some(chain_id);
            }
        }
    } else if has_no_name(&records) {
        for record in &mut records {
            record.name = Some(heading.clone());
        }
    }

    records
}
