pub mod config;
pub mod db;
pub mod models;
pub mod scraping;
mod utils;

use std::sync::atomic::AtomicBool;

use tracing::info;

use config::ScrapeConfig;
use db::Store;
use scraping::base::HttpFetcher;
use scraping::RunSummary;

/// Runs one harvest: opens the store, drives the pagination loop, and
/// releases the connection when done, on every termination path.
pub fn run(config: &ScrapeConfig, cancel: &AtomicBool) -> anyhow::Result<RunSummary> {
    let fetcher = HttpFetcher::new(config)?;
    let mut store = match &config.database_path {
        Some(path) => Store::open(path, config.write_mode)?,
        None => Store::open_default(config.write_mode)?,
    };

    let summary = scraping::run_harvest(&fetcher, &mut store, config, cancel);
    info!(
        pages = summary.pages_processed,
        stored = summary.records_stored,
        skipped = summary.items_skipped,
        "harvest finished"
    );
    Ok(summary)
}
