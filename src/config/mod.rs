mod file_config;

pub use file_config::{BadgeConfig, FeedConfig, FileConfig};

use crate::notifications::{FeedFilter, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use anyhow::{anyhow, bail, Result};
use reqwest::Url;
use std::time::Duration;

pub const DEFAULT_REQUEST_TIMEOUT_SEC: u64 = 30;
pub const DEFAULT_PREVIEW_SIZE: usize = 5;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub base_url: Option<String>,
    pub auth_token: Option<String>,
    pub request_timeout_sec: u64,
    pub page_size: usize,
    pub poll_interval_secs: u64,
    pub disable_badge: bool,
    pub initial_filter: Option<FeedFilter>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            auth_token: None,
            request_timeout_sec: DEFAULT_REQUEST_TIMEOUT_SEC,
            page_size: DEFAULT_PAGE_SIZE,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            disable_badge: false,
            initial_filter: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Core settings
    pub base_url: String,
    pub auth_token: Option<String>,
    pub request_timeout_sec: u64,

    // Feature configs (with defaults)
    pub feed: FeedSettings,
    pub badge: BadgeSettings,
}

#[derive(Debug, Clone)]
pub struct FeedSettings {
    pub page_size: usize,
    /// Entries shown in the dropdown preview.
    pub preview_size: usize,
    pub initial_filter: FeedFilter,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            preview_size: DEFAULT_PREVIEW_SIZE,
            initial_filter: FeedFilter::All,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BadgeSettings {
    pub enabled: bool,
    pub poll_interval_secs: u64,
}

impl BadgeSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl Default for BadgeSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let base_url = file
            .base_url
            .or_else(|| cli.base_url.clone())
            .ok_or_else(|| {
                anyhow!("base_url must be specified via --base-url or in config file")
            })?;
        validate_base_url(&base_url)?;

        let auth_token = file.auth_token.or_else(|| cli.auth_token.clone());
        let request_timeout_sec = file.request_timeout_sec.unwrap_or(cli.request_timeout_sec);
        if request_timeout_sec == 0 {
            bail!("request_timeout_sec must be greater than 0");
        }

        // Feed settings - merge file config with CLI values and defaults
        let feed_file = file.feed.unwrap_or_default();
        let page_size = feed_file.page_size.unwrap_or(cli.page_size);
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            bail!(
                "page_size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE,
                page_size
            );
        }
        let initial_filter = match feed_file.initial_filter {
            Some(s) => s.parse::<FeedFilter>().map_err(|e| anyhow!(e))?,
            None => cli.initial_filter.unwrap_or_default(),
        };
        let feed = FeedSettings {
            page_size,
            preview_size: feed_file.preview_size.unwrap_or(DEFAULT_PREVIEW_SIZE),
            initial_filter,
        };

        let badge_file = file.badge.unwrap_or_default();
        let badge = BadgeSettings {
            enabled: badge_file.enabled.unwrap_or(!cli.disable_badge),
            poll_interval_secs: badge_file
                .poll_interval_secs
                .unwrap_or(cli.poll_interval_secs),
        };
        if badge.poll_interval_secs == 0 {
            bail!("poll_interval_secs must be greater than 0");
        }

        Ok(Self {
            base_url,
            auth_token,
            request_timeout_sec,
            feed,
            badge,
        })
    }
}

fn validate_base_url(base_url: &str) -> Result<()> {
    let url = Url::parse(base_url).map_err(|e| anyhow!("Invalid base_url {:?}: {}", base_url, e))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => bail!("base_url must use http or https, got {}", other),
    }
}
