//! Application configuration, read from the environment.
//!
//! Keys are matched case-insensitively against the field names, so
//! `DATABASE_URL` fills `database_url`. Durations accept plain seconds
//! (`300`) or a value with a unit (`500ms`, `30s`, `5m`, `1h`).

use crate::globalsearch::{GLOBALSEARCH_URL, NavigatorOptions};
use crate::notify::join::{DEFAULT_SEND_URL, JoinOptions};
use crate::scraper::watch::WatchOptions;
use anyhow::Context;
use figment::Figment;
use figment::providers::{Env, Serialized};
use fundu::{DurationParser, TimeUnit};
use serde::{Deserialize, Deserializer};
use std::time::Duration;

#[derive(custom_debug_derive::Debug, Clone, Deserialize)]
pub struct Config {
    /// Postgres connection string.
    #[debug(with = "crate::fmt::redacted")]
    pub database_url: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_globalsearch_url")]
    pub globalsearch_url: String,
    #[serde(
        default = "default_request_timeout",
        deserialize_with = "deserialize_duration"
    )]
    pub request_timeout: Duration,
    /// Retries after the first attempt for transient HTTP failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Seconds; the n-th retry waits `factor * 2^(n-1)`.
    #[serde(default = "default_retry_backoff_factor")]
    pub retry_backoff_factor: f64,

    /// Used when the database holds no global settings row.
    #[serde(default = "default_renotify_grace_hours")]
    pub renotify_grace_hours: f64,
    #[serde(
        default = "default_check_interval",
        deserialize_with = "deserialize_duration"
    )]
    pub check_interval: Duration,
    #[serde(
        default = "default_group_timeout",
        deserialize_with = "deserialize_duration"
    )]
    pub group_timeout: Duration,
    #[serde(
        default = "default_shutdown_timeout",
        deserialize_with = "deserialize_duration"
    )]
    pub shutdown_timeout: Duration,

    #[serde(default = "default_join_send_url")]
    pub join_send_url: String,
    #[serde(default)]
    #[debug(with = "crate::fmt::redacted_opt")]
    pub join_api_key: Option<String>,
    #[serde(default)]
    #[debug(with = "crate::fmt::redacted_opt")]
    pub join_device_id: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_globalsearch_url() -> String {
    GLOBALSEARCH_URL.to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_backoff_factor() -> f64 {
    0.5
}

fn default_renotify_grace_hours() -> f64 {
    6.0
}

fn default_check_interval() -> Duration {
    Duration::from_secs(5 * 60)
}

fn default_group_timeout() -> Duration {
    Duration::from_secs(5 * 60)
}

fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_join_send_url() -> String {
    DEFAULT_SEND_URL.to_string()
}

impl Config {
    /// Load from `.env` (if present) and the process environment.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_figment(Figment::new().merge(Env::raw()))
    }

    /// Extract from an arbitrary figment, for tests and embedding.
    pub fn from_figment(figment: Figment) -> anyhow::Result<Self> {
        let config: Config = figment.extract().context("Failed to load config")?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults layered under `figment`, with `database_url` supplied.
    pub fn with_database_url(database_url: &str, figment: Figment) -> anyhow::Result<Self> {
        Self::from_figment(
            Figment::new()
                .merge(Serialized::default("database_url", database_url))
                .merge(figment),
        )
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.retry_backoff_factor.is_finite() && self.retry_backoff_factor >= 0.0,
            "RETRY_BACKOFF_FACTOR must be a non-negative number"
        );
        anyhow::ensure!(
            self.renotify_grace_hours.is_finite() && self.renotify_grace_hours >= 0.0,
            "RENOTIFY_GRACE_HOURS must be a non-negative number"
        );
        anyhow::ensure!(!self.check_interval.is_zero(), "CHECK_INTERVAL must be positive");
        anyhow::ensure!(!self.group_timeout.is_zero(), "GROUP_TIMEOUT must be positive");
        url::Url::parse(&self.globalsearch_url).context("GLOBALSEARCH_URL is not a valid URL")?;
        Ok(())
    }

    pub fn navigator_options(&self) -> NavigatorOptions {
        NavigatorOptions {
            base_url: self.globalsearch_url.clone(),
            request_timeout: self.request_timeout,
            max_retries: self.max_retries,
            retry_backoff_factor: self.retry_backoff_factor,
        }
    }

    pub fn join_options(&self) -> JoinOptions {
        JoinOptions {
            send_url: self.join_send_url.clone(),
            api_key: self.join_api_key.clone(),
            device_id: self.join_device_id.clone(),
            max_retries: self.max_retries,
            retry_backoff_factor: self.retry_backoff_factor,
        }
    }

    pub fn watch_options(&self) -> WatchOptions {
        WatchOptions {
            renotify_grace_hours: self.renotify_grace_hours,
            group_timeout: self.group_timeout,
        }
    }
}

/// Parse `300`, `500ms`, `30s`, `5m` or `1h`. A bare number is seconds.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let parser = DurationParser::with_time_units(&[
        TimeUnit::MilliSecond,
        TimeUnit::Second,
        TimeUnit::Minute,
        TimeUnit::Hour,
    ]);
    let parsed = parser
        .parse(input.trim())
        .map_err(|e| format!("invalid duration {input:?}: {e}"))?;
    Duration::try_from(parsed).map_err(|e| format!("invalid duration {input:?}: {e}"))
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Seconds(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Seconds(secs) => Ok(Duration::from_secs(secs)),
        Raw::Text(text) => parse_duration(&text).map_err(serde::de::Error::custom),
    }
}
