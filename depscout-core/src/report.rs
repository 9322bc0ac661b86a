// Result persistence and crawl reports

use crate::model::CrawlResult;
use depscout_scanner::ScanError;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// The persisted JSON array of crawl results.
#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    path: PathBuf,
    results: Vec<CrawlResult>,
}

impl ResultStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            results: Vec::new(),
        }
    }

    /// Reads existing results. A missing or unreadable file yields an empty
    /// store at the same path.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let results = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Vec<CrawlResult>>(&content) {
                Ok(results) => results,
                Err(e) => {
                    warn!("Ignoring unreadable results in {}: {}", path.display(), e);
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        };
        debug!("Loaded {} result(s) from {}", results.len(), path.display());
        Self { path, results }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn results(&self) -> &[CrawlResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// `<stem>-backup.json` next to the store file.
    pub fn backup_path(&self) -> PathBuf {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "results".to_string());
        self.path.with_file_name(format!("{}-backup.json", stem))
    }

    /// Writes the currently loaded results to the backup file.
    pub fn backup(&self) -> Result<PathBuf, ScanError> {
        let backup = self.backup_path();
        write_results(&backup, &self.results)?;
        Ok(backup)
    }

    pub fn push(&mut self, result: CrawlResult) {
        self.results.push(result);
    }

    /// Roots that already have a persisted result.
    pub fn crawled_roots(&self) -> HashSet<String> {
        self.results
            .iter()
            .filter(|r| r.is_worth_persisting())
            .map(|r| r.root_url.clone())
            .collect()
    }

    /// Rewrites the whole file. Results that found nothing are left out.
    pub fn save(&self) -> Result<(), ScanError> {
        write_results(&self.path, &self.results)
    }
}

fn write_results(path: &Path, results: &[CrawlResult]) -> Result<(), ScanError> {
    let kept: Vec<&CrawlResult> = results.iter().filter(|r| r.is_worth_persisting()).collect();
    let json = serde_json::to_string_pretty(&kept)?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, json)?;
    Ok(())
}

fn chain_label(chain_id: Option<u64>) -> String {
    match chain_id {
        Some(id) => format!("chain {}", id),
        None => "unknown chain".to_string(),
    }
}

/// Generate a crawl report from results
pub fn generate_crawl_report(results: &[CrawlResult]) -> String {
    let found: Vec<&CrawlResult> = results.iter().filter(|r| r.is_worth_persisting()).collect();

    let mut report = String::new();
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    report.push_str("# Summary:\n");
    report.push_str(&format!("  Roots crawled: {}\n", results.len()));
    report.push_str(&format!("  Roots with findings: {}\n", found.len()));
    report.push_str(&format!(
        "  Roots with socials: {}\n",
        found.iter().filter(|r| r.has_socials()).count()
    ));
    report.push_str(&format!(
        "  Documentation homes: {}\n",
        found.iter().filter(|r| r.documentation_home.is_some()).count()
    ));

    let mut by_chain: BTreeMap<Option<u64>, usize> = BTreeMap::new();
    for record in found.iter().flat_map(|r| r.contracts.iter()) {
        *by_chain.entry(record.chain_id).or_default() += 1;
    }
    let total_contracts: usize = by_chain.values().sum();
    report.push_str(&format!("  Contracts found: {}\n", total_contracts));
    for (chain_id, count) in &by_chain {
        report.push_str(&format!("    {}: {}\n", chain_label(*chain_id), count));
    }

    report.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    for result in found {
        report.push_str(&format!("## {}\n", result.root_url));
        if let Some(ref home) = result.documentation_home {
            report.push_str(&format!("  docs: {}\n", home));
        }
        for (label, links) in [
            ("github", &result.github),
            ("twitter", &result.twitter),
            ("telegram", &result.telegram),
            ("discord", &result.discord),
        ] {
            for link in links {
                report.push_str(&format!("  {}: {}\n", label, link));
            }
        }
        for record in &result.contracts {
            report.push_str(&format!(
                "  [{}] {} {}\n",
                chain_label(record.chain_id),
                record.name.as_deref().unwrap_or("-"),
                record.address
            ));
        }
        report.push('\n');
    }

    report
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    fs::write(path, content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backup_path() {
        let store = ResultStore::new("/tmp/out/crawled-protocols.json");
        assert_eq!(
            store.backup_path(),
            PathBuf::from("/tmp/out/crawled-protocols-backup.json")
        );
    }

    #[test]
    fn test_crawled_roots_ignore_empty_results() {
        let mut store = ResultStore::new("unused.json");
        store.push(CrawlResult::new("https://empty.io"));
        let mut found = CrawlResult::new("https://found.io");
        found.documentation_home = Some("https://docs.found.io".to_string());
        store.push(found);

        let roots = store.crawled_roots();
        assert_eq!(roots.len(), 1);
        assert!(roots.contains("https://found.io"));
    }
}
