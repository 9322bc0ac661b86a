// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    crawl_config_from_args, load_urls_from_file, load_urls_from_source, parse_url_line,
    resolve_output_path,
};

// Re-export batch functionality from depscout-core
pub use depscout_core::{
    BatchOptions, BatchProgressCallback, CrawlConfig, ResultStore, execute_batch,
    generate_crawl_report,
};
