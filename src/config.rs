use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::utils;

/// How the store handles a record whose natural key is already present.
/// `Insert` reproduces the historical behavior: re-running the harvest over
/// the same pages accumulates duplicate rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    #[default]
    Insert,
    Upsert,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    pub base_url: String,
    pub listing_path: String,
    pub start_page: u32,
    /// Highest page number to fetch. None runs until an empty page.
    pub max_pages: Option<u32>,
    pub event_type: String,
    /// Boilerplate description attached to every record, if any.
    pub description: Option<String>,
    /// Placeholder used when an item carries no resolvable image.
    pub default_image_url: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub write_mode: WriteMode,
    /// Overrides the per-user data directory location.
    pub database_path: Option<PathBuf>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.mojo.nl".to_string(),
            listing_path: "/agenda".to_string(),
            start_page: 1,
            max_pages: None,
            event_type: "Music".to_string(),
            description: None,
            default_image_url: "https://www.mojo.nl/media/default-event.jpg".to_string(),
            connect_timeout_secs: 10,
            request_timeout_secs: 20,
            write_mode: WriteMode::default(),
            database_path: None,
        }
    }
}

impl ScrapeConfig {
    /// Loads the config from `path` when given, otherwise from the default
    /// location, falling back to defaults when no file exists there.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => read_config(path),
            None => {
                let path = utils::config_path();
                if path.exists() {
                    read_config(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

fn read_config(path: &Path) -> anyhow::Result<ScrapeConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("unable to read config {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("invalid config {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let parsed: ScrapeConfig =
            serde_json::from_str(r#"{"max_pages": 5, "write_mode": "upsert"}"#)
                .expect("parse partial config");
        assert_eq!(parsed.max_pages, Some(5));
        assert_eq!(parsed.write_mode, WriteMode::Upsert);
        assert_eq!(parsed.base_url, "https://www.mojo.nl");
        assert_eq!(parsed.start_page, 1);
    }
}
