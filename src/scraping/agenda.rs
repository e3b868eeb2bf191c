use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::warn;

use super::dates::{self, DateParseError};
use super::{base, images};
use crate::config::ScrapeConfig;
use crate::models::EventRecord;

pub const DEFAULT_NAME: &str = "Unnamed Event";
pub const DEFAULT_LOCATION: &str = "Unknown Location";
const DEFAULT_DATE_PART: &str = "Unknown";

static ITEM_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.c-agenda-item").expect("agenda item selector"));
static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h3.agenda-item__title").expect("agenda title selector"));
static DAY_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.agenda-item__date-day").expect("agenda day selector"));
static MONTH_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.agenda-item__date-month").expect("agenda month selector"));
static LOCATION_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("div.agenda-item__subtitle.u-text--small").expect("agenda location selector")
});
static TICKET_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.agenda-item__link").expect("agenda ticket selector"));

/// Result of parsing one listing page. `Empty` is the end-of-data sentinel
/// and is distinct from a page whose items all failed extraction.
#[derive(Debug)]
pub enum PageOutcome {
    Empty,
    Records {
        records: Vec<EventRecord>,
        skipped: usize,
    },
}

/// Splits a fetched document into agenda items and runs the extraction
/// sub-pipeline on each. Item-level failures are logged and skipped; the
/// page still reports the remaining valid records.
pub fn parse_listing(html: &str, config: &ScrapeConfig) -> PageOutcome {
    let document = Html::parse_document(html);
    let items: Vec<ElementRef<'_>> = document.select(&ITEM_SELECTOR).collect();
    if items.is_empty() {
        return PageOutcome::Empty;
    }

    let mut records = Vec::with_capacity(items.len());
    let mut skipped = 0;
    for item in &items {
        match extract_event(item, config) {
            Ok(record) => records.push(record),
            Err(err) => {
                warn!(error = %err, "skipping agenda item");
                skipped += 1;
            }
        }
    }
    PageOutcome::Records { records, skipped }
}

/// Soft extraction: every missing node yields a named default instead of
/// failing the item. Only an unparseable date rejects the whole item.
fn extract_event(
    item: &ElementRef<'_>,
    config: &ScrapeConfig,
) -> Result<EventRecord, DateParseError> {
    let name =
        base::first_text(item, &TITLE_SELECTOR).unwrap_or_else(|| DEFAULT_NAME.to_string());
    let raw_day =
        base::first_text(item, &DAY_SELECTOR).unwrap_or_else(|| DEFAULT_DATE_PART.to_string());
    let raw_month =
        base::first_text(item, &MONTH_SELECTOR).unwrap_or_else(|| DEFAULT_DATE_PART.to_string());
    let location = base::first_text(item, &LOCATION_SELECTOR)
        .unwrap_or_else(|| DEFAULT_LOCATION.to_string());
    let ticket_link = base::first_attr(item, &TICKET_SELECTOR, "href")
        .and_then(|href| base::absolute_url(&config.base_url, Some(href)));

    let starts_at = dates::normalize(&raw_day, &raw_month)?;
    let event_picture = Some(images::resolve(
        item,
        &config.base_url,
        &config.default_image_url,
    ));

    Ok(EventRecord {
        name,
        raw_day,
        raw_month,
        starts_at,
        location,
        event_type: config.event_type.clone(),
        description: config.description.clone(),
        ticket_link,
        event_picture,
    })
}
