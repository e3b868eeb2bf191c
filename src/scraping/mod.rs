pub mod agenda;
pub mod base;
pub mod dates;
pub mod images;

use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tracing::{info, warn};

use crate::config::ScrapeConfig;
use crate::models::EventRecord;

pub use agenda::PageOutcome;
pub use dates::DateParseError;

/// Page-level failure: network error, timeout, or a non-2xx response. Ends
/// the run; there is no retry policy.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request for {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("non-success status {status} for {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("unable to read response body for {url}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Item-level storage failure. Logged and skipped; never ends the run.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct SinkError(#[from] anyhow::Error);

pub trait PageFetcher {
    fn fetch_page(&self, page: u32) -> Result<String, FetchError>;
}

/// One write operation, atomic per record. The persistence schema behind it
/// is opaque to the pipeline.
pub trait RecordSink {
    fn store(&mut self, record: &EventRecord) -> Result<(), SinkError>;
}

/// Why a run stopped. `Exhausted` is the normal end of the listing;
/// `Aborted` carries the fetch failure so callers can tell the two apart.
#[derive(Debug)]
pub enum Termination {
    Exhausted,
    PageLimit,
    Cancelled,
    Aborted(FetchError),
}

#[derive(Debug)]
pub struct RunSummary {
    pub pages_processed: u32,
    pub records_stored: u64,
    pub items_skipped: u64,
    pub termination: Termination,
}

/// Drives sequential page fetch + parse from the configured start page.
/// Pages are strictly sequential: page n+1 is only requested after page n
/// produced records. The cancel flag is observed between pages, so a stopped
/// run leaves every already-stored record durable.
pub fn run_harvest<F, S>(
    fetcher: &F,
    sink: &mut S,
    config: &ScrapeConfig,
    cancel: &AtomicBool,
) -> RunSummary
where
    F: PageFetcher + ?Sized,
    S: RecordSink + ?Sized,
{
    let mut pages_processed = 0u32;
    let mut records_stored = 0u64;
    let mut items_skipped = 0u64;
    let mut page = config.start_page;

    let termination = loop {
        if cancel.load(Ordering::Relaxed) {
            info!(page, "cancellation requested, stopping");
            break Termination::Cancelled;
        }
        if let Some(cap) = config.max_pages {
            if page > cap {
                info!(cap, "page cap reached");
                break Termination::PageLimit;
            }
        }

        let html = match fetcher.fetch_page(page) {
            Ok(html) => html,
            Err(err) => {
                warn!(page, error = %err, "page fetch failed");
                break Termination::Aborted(err);
            }
        };

        match agenda::parse_listing(&html, config) {
            PageOutcome::Empty => {
                info!(page, "no agenda items found, listing exhausted");
                break Termination::Exhausted;
            }
            PageOutcome::Records { records, skipped } => {
                pages_processed += 1;
                items_skipped += skipped as u64;
                for record in &records {
                    match sink.store(record) {
                        Ok(()) => records_stored += 1,
                        Err(err) => {
                            warn!(event = %record.name, error = %err, "failed to store record");
                            items_skipped += 1;
                        }
                    }
                }
                info!(page, count = records.len(), "processed listing page");
                page += 1;
            }
        }
    };

    RunSummary {
        pages_processed,
        records_stored,
        items_skipped,
        termination,
    }
}
