pub mod abi;
pub mod batch;
pub mod chain;
pub mod classify;
pub mod crawl;
pub mod dedup;
pub mod extract;
pub mod model;
pub mod report;

use colored::Colorize;

pub use batch::{BatchOptions, BatchProgressCallback, BatchResultCallback, execute_batch};
pub use crawl::{CrawlConfig, CrawlContext, VisitedSet, crawl_root, is_related, next_home_candidate};
pub use dedup::{merge_contracts, unique_contracts};
pub use extract::extract_contracts;
pub use model::{CrawlResult, DeploymentRecord, Provenance};
pub use report::{ResultStore, generate_crawl_report};

pub fn print_banner() {
    let banner = r#"
     _                                 _
  __| | ___ _ __  ___  ___ ___  _   _| |_
 / _` |/ _ \ '_ \/ __|/ __/ _ \| | | | __|
| (_| |  __/ |_) \__ \ (_| (_) | |_| | |_
 \__,_|\___| .__/|___/\___\___/ \__,_|\__|
           |_|
"#;
    println!("{}", banner.cyan());
    println!(
        "  {} v{}\n",
        "contract deployment discovery".dimmed(),
        env!("CARGO_PKG_VERSION")
    );
}
