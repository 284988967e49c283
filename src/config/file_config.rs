use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub base_url: Option<String>,
    pub auth_token: Option<String>,
    pub request_timeout_sec: Option<u64>,

    // Feature configs
    pub feed: Option<FeedConfig>,
    pub badge: Option<BadgeConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct FeedConfig {
    pub page_size: Option<usize>,
    pub preview_size: Option<usize>,
    /// "all", "unread" or "type:<kind>"
    pub initial_filter: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct BadgeConfig {
    pub enabled: Option<bool>,
    pub poll_interval_secs: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
