//! Runtime configuration for the job API client.
//!
//! Values come from the process environment (after `.env` has been loaded by
//! the binary). Every variable is optional.
//!
//! | Variable                          | Default                 |
//! |-----------------------------------|-------------------------|
//! | `VISION2VIDEO_API_URL`            | `http://127.0.0.1:8000` |
//! | `VISION2VIDEO_POLL_INTERVAL_MS`   | `3000`                  |
//! | `VISION2VIDEO_PROGRESS_STEP`      | `15`                    |
//! | `VISION2VIDEO_PROGRESS_CEILING`   | `90`                    |
//! | `VISION2VIDEO_MAX_POLL_FAILURES`  | `20`                    |
//! | `VISION2VIDEO_REQUEST_TIMEOUT_MS` | `30000`                 |

use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_POLL_INTERVAL_MS: u64 = 3000;
const DEFAULT_PROGRESS_STEP: u8 = 15;
const DEFAULT_PROGRESS_CEILING: u8 = 90;
const DEFAULT_MAX_POLL_FAILURES: u32 = 20;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    /// Backend base URL without a trailing slash.
    pub base_url: String,
    pub poll_interval: Duration,
    pub progress_step: u8,
    /// Highest synthetic progress shown before the backend reports completion.
    pub progress_ceiling: u8,
    /// Consecutive transient poll failures tolerated before the job is failed.
    pub max_transient_poll_failures: u32,
    /// Upper bound for a single submit, status or probe request. A request
    /// that hits it counts as a transient failure.
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            progress_step: DEFAULT_PROGRESS_STEP,
            progress_ceiling: DEFAULT_PROGRESS_CEILING,
            max_transient_poll_failures: DEFAULT_MAX_POLL_FAILURES,
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(&base_url.into()),
            ..Self::default()
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let base_url = match get("VISION2VIDEO_API_URL") {
            Some(url) => {
                let url = normalize_base_url(&url);
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err(ConfigError::Invalid {
                        key: "VISION2VIDEO_API_URL",
                        value: url,
                        reason: "expected an http:// or https:// URL".to_string(),
                    });
                }
                url
            }
            None => defaults.base_url,
        };

        let poll_interval_ms: u64 = parse_var(
            "VISION2VIDEO_POLL_INTERVAL_MS",
            get("VISION2VIDEO_POLL_INTERVAL_MS"),
            DEFAULT_POLL_INTERVAL_MS,
        )?;
        if poll_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "VISION2VIDEO_POLL_INTERVAL_MS",
                value: poll_interval_ms.to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        let progress_step = parse_var(
            "VISION2VIDEO_PROGRESS_STEP",
            get("VISION2VIDEO_PROGRESS_STEP"),
            DEFAULT_PROGRESS_STEP,
        )?;

        let progress_ceiling: u8 = parse_var(
            "VISION2VIDEO_PROGRESS_CEILING",
            get("VISION2VIDEO_PROGRESS_CEILING"),
            DEFAULT_PROGRESS_CEILING,
        )?;
        if progress_ceiling >= 100 {
            return Err(ConfigError::Invalid {
                key: "VISION2VIDEO_PROGRESS_CEILING",
                value: progress_ceiling.to_string(),
                reason: "must stay below 100 until completion".to_string(),
            });
        }

        let max_transient_poll_failures = parse_var(
            "VISION2VIDEO_MAX_POLL_FAILURES",
            get("VISION2VIDEO_MAX_POLL_FAILURES"),
            DEFAULT_MAX_POLL_FAILURES,
        )?;

        let request_timeout_ms: u64 = parse_var(
            "VISION2VIDEO_REQUEST_TIMEOUT_MS",
            get("VISION2VIDEO_REQUEST_TIMEOUT_MS"),
            DEFAULT_REQUEST_TIMEOUT_MS,
        )?;
        if request_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "VISION2VIDEO_REQUEST_TIMEOUT_MS",
                value: request_timeout_ms.to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            base_url,
            poll_interval: Duration::from_millis(poll_interval_ms),
            progress_step,
            progress_ceiling,
            max_transient_poll_failures,
            request_timeout: Duration::from_millis(request_timeout_ms),
        })
    }
}

fn parse_var<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
