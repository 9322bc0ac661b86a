use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Where on a page a record was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    /// `NODENAME[attr="value" ...]` of the source element.
    pub dom_selector_signature: String,
    /// Hex SHA-256 of the element's rendered text.
    pub content_hash: String,
    pub page_url: String,
    pub page_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nearest_heading: Option<String>,
}

/// One smart-contract deployment found on a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Lower-cased `0x` + 40 hex digits.
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    /// Serialized JSON ABI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,
}

impl DeploymentRecord {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            name: None,
            address: address.into().to_lowercase(),
            chain_id: None,
            abi: None,
            provenance: None,
        }
    }

    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name.filter(|n| !n.is_empty());
        self
    }

    pub fn with_chain_id(mut self, chain_id: Option<u64>) -> Self {
        self.chain_id = chain_id;
        self
    }

    pub fn with_abi(mut self, abi: Option<String>) -> Self {
        self.abi = abi;
        self
    }

    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = Some(provenance);
        self
    }
}

/// Everything discovered for one root URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlResult {
    pub root_url: String,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub github: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub twitter: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub telegram: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub discord: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation_home: Option<String>,
    #[serde(default)]
    pub contracts: Vec<DeploymentRecord>,
}

impl CrawlResult {
    pub fn new(root_url: impl Into<String>) -> Self {
        Self {
            root_url: root_url.into(),
            ..Default::default()
        }
    }

    pub fn has_socials(&self) -> bool {
        !self.github.is_empty()
            || !self.twitter.is_empty()
            || !self.telegram.is_empty()
            || !self.discord.is_empty()
    }

    /// A result is only persisted when it found something.
    pub fn is_worth_persisting(&self) -> bool {
        self.has_socials() || self.documentation_home.is_some() || !self.contracts.is_empty()
    }
}
