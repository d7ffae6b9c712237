use crate::models::{BlockchainStats, PriceInfo};
use chrono::{DateTime, Utc};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt::Debug;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("unexpected status for {url}: {status}")]
    UnexpectedStatus { url: String, status: StatusCode },

    #[error("failed to decode response from {url}: {reason}")]
    Decode { url: String, reason: String },
}

/// How the block-status endpoint encodes the block time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFormat {
    /// Integer epoch seconds or an RFC 3339 string, whichever shows up
    Auto,
    Epoch,
    Rfc3339,
}

impl std::str::FromStr for TimeFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(TimeFormat::Auto),
            "epoch" | "unix" => Ok(TimeFormat::Epoch),
            "rfc3339" | "iso8601" => Ok(TimeFormat::Rfc3339),
            other => Err(format!("unknown time format '{}'", other)),
        }
    }
}

/// Field mapping for the block-status response
#[derive(Debug, Clone, PartialEq)]
pub struct StatsSchema {
    pub hash_field: String,
    pub height_field: String,
    pub time_field: String,
    pub time_format: TimeFormat,
}

impl Default for StatsSchema {
    fn default() -> Self {
        Self {
            hash_field: "hash".to_string(),
            height_field: "height".to_string(),
            time_field: "time".to_string(),
            time_format: TimeFormat::Auto,
        }
    }
}

impl StatsSchema {
    /// Decode a block-status body. Unknown fields are ignored and a missing
    /// hash reads as empty; height and time are required.
    pub fn decode(&self, body: &Value) -> Result<BlockchainStats, String> {
        let object = body
            .as_object()
            .ok_or_else(|| format!("expected a JSON object, got {}", kind_of(body)))?;

        let hash = match object.get(&self.hash_field) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => {
                return Err(format!(
                    "field '{}' should be a string, got {}",
                    self.hash_field,
                    kind_of(other)
                ))
            }
        };

        let height = object
            .get(&self.height_field)
            .ok_or_else(|| format!("missing field '{}'", self.height_field))?
            .as_u64()
            .ok_or_else(|| format!("field '{}' is not an unsigned integer", self.height_field))?;

        let raw_time = object
            .get(&self.time_field)
            .ok_or_else(|| format!("missing field '{}'", self.time_field))?;
        let observed_time = self.parse_time(raw_time)?;

        Ok(BlockchainStats {
            hash,
            height,
            observed_time,
        })
    }

    fn parse_time(&self, value: &Value) -> Result<DateTime<Utc>, String> {
        match (self.time_format, value) {
            (TimeFormat::Auto | TimeFormat::Epoch, Value::Number(n)) => {
                let secs = n
                    .as_i64()
                    .ok_or_else(|| format!("epoch time {} is not an integer", n))?;
                from_epoch(secs)
            }
            (TimeFormat::Auto, Value::String(s)) => match s.trim().parse::<i64>() {
                Ok(secs) => from_epoch(secs),
                Err(_) => from_rfc3339(s),
            },
            (TimeFormat::Epoch, Value::String(s)) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| format!("'{}' is not an epoch timestamp", s))
                .and_then(from_epoch),
            (TimeFormat::Rfc3339, Value::String(s)) => from_rfc3339(s),
            (format, other) => Err(format!(
                "field '{}' cannot be read as {:?} time from {}",
                self.time_field,
                format,
                kind_of(other)
            )),
        }
    }
}

fn from_epoch(secs: i64) -> Result<DateTime<Utc>, String> {
    DateTime::from_timestamp(secs, 0).ok_or_else(|| format!("epoch time {} is out of range", secs))
}

fn from_rfc3339(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("'{}' is not an RFC 3339 timestamp: {}", s, e))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

pub struct ApiClient {
    client: reqwest::Client,
    stats_url: Url,
    price_url: Url,
    schema: StatsSchema,
}

impl ApiClient {
    pub fn new(
        stats_url: Url,
        price_url: Url,
        schema: StatsSchema,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            stats_url,
            price_url,
            schema,
        })
    }

    /// GET `url` and decode a 200 response body as `T`
    pub async fn fetch_json<T>(&self, url: &Url) -> Result<T, FetchError>
    where
        T: DeserializeOwned + Debug,
    {
        tracing::info!("Crawling {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::UnexpectedStatus {
                url: url.to_string(),
                status,
            });
        }

        let body = response.bytes().await.map_err(|e| FetchError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let decoded: T = serde_json::from_slice(&body).map_err(|e| FetchError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        tracing::debug!("Response from {}: {:?}", url, decoded);
        Ok(decoded)
    }

    pub async fn fetch_stats(&self) -> Result<BlockchainStats, FetchError> {
        let body: Value = self.fetch_json(&self.stats_url).await?;

        self.schema
            .decode(&body)
            .map_err(|reason| FetchError::Decode {
                url: self.stats_url.to_string(),
                reason,
            })
    }

    pub async fn fetch_price(&self) -> Result<PriceInfo, FetchError> {
        self.fetch_json(&self.price_url).await
    }
}
