use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use colored::Colorize;
use depscout_core::{
    BatchOptions, BatchProgressCallback, BatchResultCallback, CrawlConfig, CrawlResult, ResultStore,
    execute_batch, extract_contracts, generate_crawl_report, report::save_report,
};
use depscout_scanner::{HttpFetcher, HttpRenderer, Navigation, Renderer, build_client};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use url::Url;

// Helper functions for crawl handler

/// Load URLs from either a file or a single URL argument
pub fn load_urls_from_source(url: Option<&Url>, hosts_file: Option<&PathBuf>) -> Result<Vec<String>> {
    if let Some(hosts_file_path) = hosts_file {
        load_urls_from_file(hosts_file_path)
    } else if let Some(url) = url {
        Ok(vec![url.as_str().to_string()])
    } else {
        bail!("Either --url or --hosts-file must be provided")
    }
}

/// Load and parse URLs from a file
pub fn load_urls_from_file(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read hosts file {}", path.display()))?;

    let urls: Vec<String> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| parse_url_line(line.trim()))
        .collect();

    if urls.is_empty() {
        bail!("No valid URLs found in {}", path.display());
    }

    Ok(urls)
}

/// Parse a single line as a URL, trying to add https:// if needed
pub fn parse_url_line(line: &str) -> Option<String> {
    if let Ok(url) = Url::parse(line)
        && matches!(url.scheme(), "http" | "https")
    {
        return Some(line.to_string());
    }

    let with_scheme = format!("https://{}", line);
    if Url::parse(&with_scheme).is_ok_and(|url| url.host_str().is_some()) {
        return Some(with_scheme);
    }

    eprintln!("{} Skipping invalid URL '{}'", "⚠".yellow(), line);
    None
}

/// Expands `~` in the output path.
pub fn resolve_output_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// Builds the crawl configuration from `crawl` arguments.
pub fn crawl_config_from_args(args: &ArgMatches) -> CrawlConfig {
    let defaults = CrawlConfig::default();
    CrawlConfig {
        max_depth: args
            .get_one::<usize>("max-depth")
            .copied()
            .unwrap_or(defaults.max_depth),
        max_visits_per_run: args
            .get_one::<usize>("max-visits")
            .copied()
            .unwrap_or(defaults.max_visits_per_run),
        concurrency: args
            .get_one::<usize>("concurrency")
            .copied()
            .unwrap_or(defaults.concurrency),
        share_visited: !args.get_flag("isolated"),
        timeout_secs: args
            .get_one::<u64>("timeout")
            .copied()
            .unwrap_or(defaults.timeout_secs),
    }
}

fn spinner(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn print_summary(results: &[CrawlResult]) {
    let found = results.iter().filter(|r| r.is_worth_persisting()).count();
    let contracts: usize = results.iter().map(|r| r.contracts.len()).sum();
    println!(
        "{} {} root(s) crawled, {} with findings, {} contract(s)",
        "✓".green().bold(),
        results.len().to_string().bright_white(),
        found.to_string().bright_white(),
        contracts.to_string().cyan()
    );
}

pub async fn handle_crawl(sub_matches: &ArgMatches, quiet: bool) -> Result<()> {
    let url = sub_matches.get_one::<Url>("url");
    let hosts_file = sub_matches.get_one::<PathBuf>("hosts-file");
    let output = sub_matches
        .get_one::<String>("output")
        .map(|raw| resolve_output_path(raw))
        .unwrap_or_else(|| PathBuf::from("crawled-protocols.json"));
    let report_path = sub_matches.get_one::<PathBuf>("report");
    let fresh = sub_matches.get_flag("fresh");
    let config = crawl_config_from_args(sub_matches);

    let urls = load_urls_from_source(url, hosts_file)?;

    let store = if fresh {
        ResultStore::new(&output)
    } else {
        let store = ResultStore::load(&output);
        if !store.is_empty() {
            let backup = store.backup().context("Failed to back up existing results")?;
            if !quiet {
                println!(
                    "{} Backed up {} existing result(s) to {}",
                    "→".blue(),
                    store.len(),
                    backup.display().to_string().bright_white()
                );
            }
        }
        store
    };

    if !quiet {
        println!("\nCrawling {} project(s)", urls.len());
        println!("Concurrency: {}", config.concurrency);
        println!("Max depth: {}", config.max_depth);
        println!(
            "Visited set: {}",
            if config.share_visited { "shared" } else { "per project" }
        );
        println!("Output: {}\n", output.display());
    }

    let client = build_client(config.timeout_secs).context("Failed to create HTTP client")?;
    let fetcher = Arc::new(HttpFetcher::new(client.clone()));

    let pb = Arc::new(spinner(quiet));
    pb.set_message("Starting crawl...");

    let completed = Arc::new(AtomicUsize::new(0));
    let total = urls.len();
    let pb_progress = pb.clone();
    let progress_callback: BatchProgressCallback = Arc::new(move |msg: String| {
        pb_progress.set_message(msg);
    });
    let pb_result = pb.clone();
    let completed_clone = completed.clone();
    let result_callback: BatchResultCallback = Arc::new(move |result: &CrawlResult| {
        let done = completed_clone.fetch_add(1, Ordering::Relaxed) + 1;
        if result.is_worth_persisting() {
            pb_result.println(format!(
                "  {} {} ({} contract(s))",
                "✓".green(),
                result.root_url,
                result.contracts.len()
            ));
        }
        pb_result.set_message(format!("Crawled {}/{} projects", done, total));
    });

    let options = BatchOptions {
        urls,
        config,
        resume: !fresh,
    };
    let results = execute_batch(
        options,
        move || HttpRenderer::new(client.clone()),
        fetcher,
        store,
        Some(progress_callback),
        Some(result_callback),
    )
    .await
    .context("Crawl failed")?;

    pb.finish_and_clear();
    if !quiet {
        println!("\n{} Crawl complete!\n", "✓".green().bold());
    }

    let report = generate_crawl_report(&results);
    match report_path {
        Some(path) => {
            save_report(&report, path)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            if !quiet {
                println!("Report saved to {}", path.display());
            }
        }
        None if !quiet => print!("{}", report),
        None => {}
    }

    print_summary(&results);
    Ok(())
}

pub async fn handle_extract(sub_matches: &ArgMatches) -> Result<()> {
    let url = sub_matches
        .get_one::<Url>("url")
        .context("--url is required")?;
    let timeout = sub_matches.get_one::<u64>("timeout").copied().unwrap_or(30);

    let client = build_client(timeout).context("Failed to create HTTP client")?;
    let fetcher = HttpFetcher::new(client.clone());
    let mut renderer = HttpRenderer::new(client);

    let navigation = renderer.navigate(url.as_str()).await;
    renderer.close().await;

    let page = match navigation {
        Navigation::Loaded(page) => page,
        Navigation::NotFound => bail!("{} was not found", url),
        Navigation::Failed(reason) => bail!("Failed to load {}: {}", url, reason),
    };

    let records = extract_contracts(&page, &fetcher).await;
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}
