use std::time::Duration;

use reqwest::Url;
use secrecy::SecretString;
use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_PORTAL_URL: &str = "https://dje.tjsp.jus.br/cdje/consultaAvancada.do";

const DEFAULT_POLL_INTERVAL_SECS: u64 = 5 * 60;
const DEFAULT_JOB_PAUSE_SECS: u64 = 5;
const DEFAULT_NAVIGATION_TIMEOUT_SECS: u64 = 60;
const DEFAULT_RESULT_WAIT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Environment as read, before validation. Keys are the lower-cased variable names.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawSettings {
    pub webhook_url: Option<String>,
    pub webhook_secret: Option<String>,
    pub poll_interval_secs: Option<u64>,
    pub job_pause_secs: Option<u64>,
    pub portal_url: Option<String>,
    pub navigation_timeout_secs: Option<u64>,
    pub result_wait_timeout_secs: Option<u64>,
    pub http_timeout_secs: Option<u64>,
    pub date_window_days: Option<u32>,
}

impl RawSettings {
    /// Process environment, after loading an optional `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        let raw = config::Config::builder()
            .add_source(config::Environment::default())
            .build()?
            .try_deserialize()?;
        Ok(raw)
    }
}

/// Worker settings. Passed explicitly into every component that needs them.
#[derive(Debug)]
pub struct Settings {
    pub webhook_url: Url,
    pub webhook_secret: SecretString,
    pub poll_interval: Duration,
    pub job_pause: Duration,
    pub http_timeout: Duration,
    pub portal: PortalSettings,
}

#[derive(Debug, Clone)]
pub struct PortalSettings {
    pub search_url: Url,
    pub navigation_timeout: Duration,
    pub result_timeout: Duration,
    /// Extra days searched before the target date (0 = target date only).
    pub date_window_days: u32,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_raw(RawSettings::from_env()?)
    }

    pub fn from_raw(raw: RawSettings) -> Result<Self, ConfigError> {
        let webhook_url = required(raw.webhook_url.as_deref(), "WEBHOOK_URL")?;
        let webhook_url = parse_url("WEBHOOK_URL", webhook_url)?;
        let secret = required(raw.webhook_secret.as_deref(), "WEBHOOK_SECRET")?;

        Ok(Settings {
            webhook_url,
            webhook_secret: SecretString::from(secret.to_string()),
            poll_interval: nonzero_secs(
                raw.poll_interval_secs,
                DEFAULT_POLL_INTERVAL_SECS,
                "POLL_INTERVAL_SECS",
            )?,
            job_pause: secs(raw.job_pause_secs, DEFAULT_JOB_PAUSE_SECS),
            http_timeout: secs(raw.http_timeout_secs, DEFAULT_HTTP_TIMEOUT_SECS),
            portal: PortalSettings::from_raw(&raw)?,
        })
    }
}

impl PortalSettings {
    /// Portal-only settings; the webhook keys are not required here.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_raw(&RawSettings::from_env()?)
    }

    pub fn from_raw(raw: &RawSettings) -> Result<Self, ConfigError> {
        let search_url = raw
            .portal_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(DEFAULT_PORTAL_URL);

        Ok(PortalSettings {
            search_url: parse_url("PORTAL_URL", search_url)?,
            navigation_timeout: secs(
                raw.navigation_timeout_secs,
                DEFAULT_NAVIGATION_TIMEOUT_SECS,
            ),
            result_timeout: secs(
                raw.result_wait_timeout_secs,
                DEFAULT_RESULT_WAIT_TIMEOUT_SECS,
            ),
            date_window_days: raw.date_window_days.unwrap_or(0),
        })
    }
}

fn required<'a>(value: Option<&'a str>, key: &'static str) -> Result<&'a str, ConfigError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(key))
}

fn parse_url(key: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|_| ConfigError::InvalidUrl {
        key,
        value: value.to_string(),
    })
}

fn secs(value: Option<u64>, default: u64) -> Duration {
    Duration::from_secs(value.unwrap_or(default))
}

/// Periods fed to `tokio::time::interval`, which rejects zero.
fn nonzero_secs(value: Option<u64>, default: u64, key: &'static str) -> Result<Duration, ConfigError> {
    match value.unwrap_or(default) {
        0 => Err(ConfigError::Zero(key)),
        n => Ok(Duration::from_secs(n)),
    }
}
