use crate::model::DeploymentRecord;
use std::collections::HashSet;

/// Keeps the first record for every `chainId:address` and `name:chainId` key,
/// preserving input order. Records lacking a chain id or a name are never
/// treated as duplicates.
pub fn unique_contracts<I>(records: I) -> Vec<DeploymentRecord>
where
    I: IntoIterator<Item = DeploymentRecord>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut unique = Vec::new();

    for record in records {
        let (Some(chain_id), Some(name)) = (record.chain_id, record.name.as_deref()) else {
            unique.push(record);
            continue;
        };

        let chain_address_key = format!("{}:{}", chain_id, record.address);
        let name_chain_key = format!("{}:{}", name, chain_id);
        if seen.contains(&chain_address_key) || seen.contains(&name_chain_key) {
            continue;
        }

        seen.insert(chain_address_key);
        seen.insert(name_chain_key);
        unique.push(record);
    }

    unique
}

/// Merges freshly extracted records into an existing set; existing records
/// come first so earlier finds win.
pub fn merge_contracts(
    existing: Vec<DeploymentRecord>,
    found: Vec<DeploymentRecord>,
) -> Vec<DeploymentRecord> {
    unique_contracts(existing.into_iter().chain(found))
}
