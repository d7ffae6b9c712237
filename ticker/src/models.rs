use crate::api_client::FetchError;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;

/// Latest block as reported by the block-status endpoint.
/// `observed_time` is already normalized to UTC regardless of how the
/// endpoint encoded it.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockchainStats {
    pub hash: String,
    pub height: u64,
    pub observed_time: DateTime<Utc>,
}

/// Price quotes keyed by lowercase currency code (e.g. "usd").
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PriceInfo {
    #[serde(default)]
    pub bitcoin: HashMap<String, f64>,
}

impl PriceInfo {
    pub fn usd(&self) -> f64 {
        self.quote("usd")
    }

    /// Absent currencies read as zero
    pub fn quote(&self, currency: &str) -> f64 {
        self.bitcoin.get(currency).copied().unwrap_or(0.0)
    }
}

/// One merged attempt at fetching both resources.
///
/// `error` is set if and only if at least one of the fetches failed. Whatever
/// succeeded is kept alongside it.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub fetched_at: DateTime<Utc>,
    pub stats: Option<BlockchainStats>,
    pub price: Option<PriceInfo>,
    pub error: Option<FetchError>,
}

impl Snapshot {
    pub fn empty(fetched_at: DateTime<Utc>) -> Self {
        Self {
            fetched_at,
            stats: None,
            price: None,
            error: None,
        }
    }
}
