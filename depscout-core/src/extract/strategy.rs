//! Table strategies.
//!
//! Both strategies only read the grid row-wise; column-oriented tables are
//! handled by transposing before a second attempt.

use super::find_address;
use super::table::{Cell, TableModel};
use crate::abi::abi_from_links;
use crate::chain::{chain_id_from_link, chain_id_from_links, chain_id_from_text, mentions_chain};
use crate::model::DeploymentRecord;
use depscout_scanner::Fetcher;
use tracing::trace;

const NAME_COLUMN_KEYWORDS: &[&str] = &["contract", "name", "token"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableStrategy {
    /// One column per chain (or comma-separated chain list) holding addresses.
    ContractNetwork,
    /// An address column plus a name column, chain unspecified.
    ContractAddress,
}

fn column_containing(header: &[Cell], keyword: &str) -> Option<usize> {
    header
        .iter()
        .position(|cell| cell.text().to_lowercase().contains(keyword))
}

/// Name column by keyword priority, not by position.
fn name_column(header: &[Cell]) -> Option<usize> {
    NAME_COLUMN_KEYWORDS
        .iter()
        .find_map(|keyword| column_containing(header, keyword))
}

fn network_columns(header: &[Cell]) -> Vec<usize> {
    header
        .iter()
        .enumerate()
        .filter(|(_, cell)| mentions_chain(cell.text()))
        .map(|(index, _)| index)
        .collect()
}

pub fn is_contract_network_table(table: &TableModel) -> bool {
    table
        .header()
        .is_some_and(|header| !network_columns(header).is_empty())
}

pub fn is_contract_address_table(table: &TableModel) -> bool {
    table.header().is_some_and(|header| {
        column_containing(header, "address").is_some() && name_column(header).is_some()
    })
}

pub fn determine_strategy(table: &TableModel) -> Option<TableStrategy> {
    if is_contract_network_table(table) {
        Some(TableStrategy::ContractNetwork)
    } else if is_contract_address_table(table) {
        Some(TableStrategy::ContractAddress)
    } else {
        None
    }
}

/// `None` when no strategy fits the grid.
pub async fn extract_with_strategy<F: Fetcher>(
    table: &TableModel,
    fetcher: &F,
) -> Option<Vec<DeploymentRecord>> {
    match determine_strategy(table)? {
        TableStrategy::ContractNetwork => contract_network_strategy(table, fetcher).await,
        TableStrategy::ContractAddress => contract_address_strategy(table, fetcher).await,
    }
}

async fn abi_from_row<F: Fetcher>(fetcher: &F, row: &[Cell]) -> Option<String> {
    let links: Vec<String> = row
        .iter()
        .filter_map(|cell| cell.href().map(str::to_string))
        .collect();
    abi_from_links(fetcher, &links).await
}

/// Link of a link cell, or the text of a plain one.
fn cell_link(cell: &Cell) -> &str {
    cell.href().unwrap_or(cell.text())
}

/// Reads tables shaped like
///
/// | Contract | Ethereum, Arbitrum | BSC   |
/// | -------- | ------------------ | ----- |
/// | Router   | 0x123...           | 0x456 |
///
/// Cells without an address are skipped, as are chain tokens that resolve
/// to no chain id.
pub async fn contract_network_strategy<F: Fetcher>(
    table: &TableModel,
    fetcher: &F,
) -> Option<Vec<DeploymentRecord>> {
    let header = table.header()?;
    let columns = network_columns(header);
    if columns.is_empty() {
        return None;
    }
    let name_index = name_column(header);

    let mut records = Vec::new();
    for row in table.body() {
        let name_cell = name_index.map(|index| &row[index]);
        let name = name_cell.map(|cell| cell.text().to_string());
        let mut row_abi: Option<Option<String>> = None;

        for &column in &columns {
            let address_cell = &row[column];
            let Some(address) = find_address(address_cell.text()) else {
                continue;
            };

            let networks = header[column]
                .text()
                .split(',')
                .map(str::trim)
                .filter(|token| !token.is_empty());

            for network in networks {
                let chain_id = chain_id_from_text(network)
                    .or_else(|| chain_id_from_link(cell_link(address_cell), &address))
                    .or_else(|| name_cell.and_then(|cell| chain_id_from_link(cell_link(cell), &address)));
                let Some(chain_id) = chain_id else {
                    trace!("No chain for network column {:?}", network);
                    continue;
                };

                let abi = match &row_abi {
                    Some(abi) => abi.clone(),
                    None => {
                        let abi = abi_from_row(fetcher, row).await;
                        row_abi = Some(abi.clone());
                        abi
                    }
                };

                records.push(
                    DeploymentRecord::new(address.clone())
                        .with_name(name.clone())
                        .with_chain_id(Some(chain_id))
                        .with_abi(abi),
                );
            }
        }
    }

    Some(records)
}

/// Reads tables shaped like
///
/// | Contract | Address  |
/// | -------- | -------- |
/// | Router   | 0x123... |
///
/// The chain is only known when a cell in the row links to an explorer page
/// for the row's address.
pub async fn contract_address_strategy<F: Fetcher>(
    table: &TableModel,
    fetcher: &F,
) -> Option<Vec<DeploymentRecord>> {
    let header = table.header()?;
    let address_index = column_containing(header, "address")?;
    let name_index = name_column(header)?;

    let mut records = Vec::new();
    for row in table.body() {
        let Some(address) = find_address(row[address_index].text()) else {
            continue;
        };

        let chain_id = chain_id_from_links(row.iter().map(cell_link), &address);
        let abi = abi_from_row(fetcher, row).await;

        records.push(
            DeploymentRecord::new(address)
                .with_name(Some(row[name_index].text().to_string()))
                .with_chain_id(chain_id)
                .with_abi(abi),
        );
    }

    Some(records)
}
