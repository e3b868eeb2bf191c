use chrono::{DateTime, Datelike, Local, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

const TIMEZONE: Tz = chrono_tz::Europe::Amsterdam;

// Listing markup carries no time of day; assume a typical evening start.
const DEFAULT_EVENT_TIME: &str = "20:00";

static DAY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{1,2}").expect("day regex"));

/// Dutch month abbreviations as they appear on the site, mapped to names
/// chrono can parse.
const MONTHS: [(&str, &str); 12] = [
    ("jan", "January"),
    ("feb", "February"),
    ("mrt", "March"),
    ("apr", "April"),
    ("mei", "May"),
    ("jun", "June"),
    ("jul", "July"),
    ("aug", "August"),
    ("sep", "September"),
    ("okt", "October"),
    ("nov", "November"),
    ("dec", "December"),
];

#[derive(Debug, Error)]
pub enum DateParseError {
    #[error("no day number in {0:?}")]
    Day(String),
    #[error("unparseable event date {0:?}")]
    Compose(String),
}

/// Expands a month abbreviation. Unknown tokens pass through unchanged and
/// surface as a `Compose` error when the full date fails to parse.
fn map_month(raw: &str) -> String {
    let needle = raw.trim().to_lowercase();
    MONTHS
        .iter()
        .find(|(abbr, _)| *abbr == needle)
        .map(|(_, full)| (*full).to_string())
        .unwrap_or_else(|| raw.trim().to_string())
}

/// Turns the scraped day/month pair into a concrete UTC timestamp, assuming
/// the current calendar year and the default start time.
pub fn normalize(raw_day: &str, raw_month: &str) -> Result<DateTime<Utc>, DateParseError> {
    let day = DAY_RE
        .find(raw_day)
        .ok_or_else(|| DateParseError::Day(raw_day.to_string()))?
        .as_str();
    let month = map_month(raw_month);
    let year = Local::now().year();

    let composed = format!("{day} {month} {year} {DEFAULT_EVENT_TIME}");
    let naive = NaiveDateTime::parse_from_str(&composed, "%d %B %Y %H:%M")
        .map_err(|_| DateParseError::Compose(composed.clone()))?;

    match TIMEZONE.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(dt, _) => Ok(dt.with_timezone(&Utc)),
        LocalResult::None => Err(DateParseError::Compose(composed)),
    }
}
