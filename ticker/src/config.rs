//! Startup configuration, read from `TICKER_*` environment variables.
//!
//! Every variable is optional. Invalid values are startup faults.

use crate::api_client::{StatsSchema, TimeFormat};
use crate::presenter::PresenterKind;
use crate::services::poll_service::PollSchedule;
use crate::services::snapshot_service::MergePolicy;
use reqwest::Url;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_STATS_URL: &str = "https://api.blockcypher.com/v1/btc/main";
pub const DEFAULT_PRICE_URL: &str =
    "https://api.coingecko.com/api/v3/simple/price?ids=bitcoin&vs_currencies=usd";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{key} is not a valid URL ('{value}'): {reason}")]
    InvalidUrl {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("TICKER_MIN_DELAY_SECS ({min}s) is greater than TICKER_MAX_DELAY_SECS ({max}s)")]
    DelayBounds { min: u64, max: u64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub stats_url: Url,
    pub price_url: Url,
    pub stats_schema: StatsSchema,
    pub request_timeout: Duration,
    pub schedule: PollSchedule,
    pub merge_policy: MergePolicy,
    pub presenter: PresenterKind,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let stats_url = parse_url("TICKER_STATS_URL", get("TICKER_STATS_URL"), DEFAULT_STATS_URL)?;
        let price_url = parse_url("TICKER_PRICE_URL", get("TICKER_PRICE_URL"), DEFAULT_PRICE_URL)?;

        let defaults = StatsSchema::default();
        let stats_schema = StatsSchema {
            hash_field: get("TICKER_STATS_HASH_FIELD").unwrap_or(defaults.hash_field),
            height_field: get("TICKER_STATS_HEIGHT_FIELD").unwrap_or(defaults.height_field),
            time_field: get("TICKER_STATS_TIME_FIELD").unwrap_or(defaults.time_field),
            time_format: parse_or(
                "TICKER_STATS_TIME_FORMAT",
                get("TICKER_STATS_TIME_FORMAT"),
                TimeFormat::Auto,
            )?,
        };

        let request_timeout = Duration::from_secs(parse_secs(
            "TICKER_REQUEST_TIMEOUT_SECS",
            get("TICKER_REQUEST_TIMEOUT_SECS"),
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?);

        let base = PollSchedule::default();
        let min = parse_secs("TICKER_MIN_DELAY_SECS", get("TICKER_MIN_DELAY_SECS"), base.min_delay.as_secs())?;
        let max = parse_secs("TICKER_MAX_DELAY_SECS", get("TICKER_MAX_DELAY_SECS"), base.max_delay.as_secs())?;
        if min > max {
            return Err(ConfigError::DelayBounds { min, max });
        }
        let schedule = PollSchedule {
            min_delay: Duration::from_secs(min),
            max_delay: Duration::from_secs(max),
            ..base
        };

        let merge_policy = parse_or("TICKER_MERGE_POLICY", get("TICKER_MERGE_POLICY"), MergePolicy::Partial)?;
        let presenter = parse_or("TICKER_PRESENTER", get("TICKER_PRESENTER"), PresenterKind::Stdout)?;

        Ok(Self {
            stats_url,
            price_url,
            stats_schema,
            request_timeout,
            schedule,
            merge_policy,
            presenter,
        })
    }
}

fn parse_url(key: &'static str, value: Option<String>, default: &str) -> Result<Url, ConfigError> {
    let value = value.unwrap_or_else(|| default.to_string());
    let url = Url::parse(value.trim()).map_err(|e| ConfigError::InvalidUrl {
        key,
        value: value.clone(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidUrl {
            key,
            value,
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

fn parse_or<T>(key: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr<Err = String>,
{
    match value {
        None => Ok(default),
        Some(v) => v.parse().map_err(|reason| ConfigError::InvalidValue { key, value: v, reason }),
    }
}

fn parse_secs(key: &'static str, value: Option<String>, default: u64) -> Result<u64, ConfigError> {
    let Some(v) = value else {
        return Ok(default);
    };
    match v.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::InvalidValue {
            key,
            value: v,
            reason: "must be greater than zero".to_string(),
        }),
        Ok(secs) => Ok(secs),
        Err(e) => Err(ConfigError::InvalidValue {
            key,
            value: v,
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_with(&[]).unwrap();

        assert_eq!(config.stats_url.as_str(), DEFAULT_STATS_URL);
        assert_eq!(config.price_url.as_str(), DEFAULT_PRICE_URL);
        assert_eq!(config.stats_schema, StatsSchema::default());
        assert_eq!(config.request_timeout, Duration::from_secs(20));
        assert_eq!(config.schedule, PollSchedule::default());
        assert_eq!(config.merge_policy, MergePolicy::Partial);
        assert_eq!(config.presenter, PresenterKind::Stdout);
    }

    #[test]
    fn test_overrides() {
        let config = config_with(&[
            ("TICKER_STATS_URL", "http://localhost:8080/status"),
            ("TICKER_STATS_TIME_FIELD", "mediantime"),
            ("TICKER_STATS_TIME_FORMAT", "epoch"),
            ("TICKER_REQUEST_TIMEOUT_SECS", "5"),
            ("TICKER_MIN_DELAY_SECS", "30"),
            ("TICKER_MAX_DELAY_SECS", "120"),
            ("TICKER_MERGE_POLICY", "fail-fast"),
            ("TICKER_PRESENTER", "title"),
        ])
        .unwrap();

        assert_eq!(config.stats_url.as_str(), "http://localhost:8080/status");
        assert_eq!(config.stats_schema.time_field, "mediantime");
        assert_eq!(config.stats_schema.hash_field, "hash");
        assert_eq!(config.stats_schema.time_format, TimeFormat::Epoch);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.schedule.min_delay, Duration::from_secs(30));
        assert_eq!(config.schedule.max_delay, Duration::from_secs(120));
        assert_eq!(config.merge_policy, MergePolicy::FailFast);
        assert_eq!(config.presenter, PresenterKind::TerminalTitle);
    }

    #[test]
    fn test_blank_value_uses_default() {
        let config = config_with(&[("TICKER_PRESENTER", "  ")]).unwrap();
        assert_eq!(config.presenter, PresenterKind::Stdout);
    }

    #[test]
    fn test_malformed_url_rejected() {
        let err = config_with(&[("TICKER_PRICE_URL", "not a url")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { key: "TICKER_PRICE_URL", .. }));

        let err = config_with(&[("TICKER_STATS_URL", "ftp://example.com/x")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { key: "TICKER_STATS_URL", .. }));
    }

    #[test]
    fn test_bad_numbers_rejected() {
        let err = config_with(&[("TICKER_REQUEST_TIMEOUT_SECS", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let err = config_with(&[("TICKER_MAX_DELAY_SECS", "soon")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_min_above_max_rejected() {
        let err = config_with(&[("TICKER_MIN_DELAY_SECS", "600"), ("TICKER_MAX_DELAY_SECS", "60")]).unwrap_err();
        assert_eq!(err, ConfigError::DelayBounds { min: 600, max: 60 });
    }

    #[test]
    fn test_unknown_enum_value_rejected() {
        let err = config_with(&[("TICKER_MERGE_POLICY", "sometimes")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: "TICKER_MERGE_POLICY",
                value: "sometimes".to_string(),
                reason: "unknown merge policy 'sometimes'".to_string(),
            }
        );
    }
}
