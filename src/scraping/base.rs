use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use scraper::{ElementRef, Selector};

use super::{FetchError, PageFetcher};
use crate::config::ScrapeConfig;

const USER_AGENT: &str = "AgendaScrape/0.1 (+https://github.com/mike/agenda-scrape)";

pub fn clean_text(input: &str) -> String {
    input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

pub fn inner_text(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<Vec<_>>().join(" "))
}

/// Optional field lookup: missing nodes and whitespace-only text both come
/// back as None so every call site supplies its own default.
pub fn first_text(element: &ElementRef<'_>, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .next()
        .map(|node| {
            let cleaned = inner_text(node);
            if cleaned.is_empty() {
                None
            } else {
                Some(cleaned)
            }
        })
        .flatten()
}

pub fn first_attr(element: &ElementRef<'_>, selector: &Selector, attr: &str) -> Option<String> {
    element
        .select(selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(str::to_string)
}

pub fn absolute_url(base: &str, href: Option<String>) -> Option<String> {
    let href = href?;
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href);
    }
    let base_url = reqwest::Url::parse(base).ok()?;
    base_url.join(&href).ok().map(|u| u.to_string())
}

/// Blocking page fetcher for the listing endpoint. Timeouts are mandatory so
/// a stalled request fails the run instead of hanging it.
pub struct HttpFetcher {
    client: Client,
    listing_url: String,
}

impl HttpFetcher {
    pub fn new(config: &ScrapeConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .context("building http client")?;
        let listing_url = format!(
            "{}{}",
            config.base_url.trim_end_matches('/'),
            config.listing_path
        );
        Ok(Self {
            client,
            listing_url,
        })
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch_page(&self, page: u32) -> Result<String, FetchError> {
        let url = format!("{}?page={}", self.listing_url, page);
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|source| FetchError::Request {
                url: url.clone(),
                source,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { url, status });
        }
        response.text().map_err(|source| FetchError::Body {
            url: url.clone(),
            source,
        })
    }
}
