use crate::api_client::{ApiClient, FetchError};
use crate::models::{BlockchainStats, PriceInfo, Snapshot};
use chrono::Utc;
use std::future::Future;

/// The two resources a snapshot is built from
pub trait MarketSource: Send + Sync {
    fn fetch_stats(&self) -> impl Future<Output = Result<BlockchainStats, FetchError>> + Send;

    fn fetch_price(&self) -> impl Future<Output = Result<PriceInfo, FetchError>> + Send;
}

impl MarketSource for ApiClient {
    fn fetch_stats(&self) -> impl Future<Output = Result<BlockchainStats, FetchError>> + Send {
        ApiClient::fetch_stats(self)
    }

    fn fetch_price(&self) -> impl Future<Output = Result<PriceInfo, FetchError>> + Send {
        ApiClient::fetch_price(self)
    }
}

/// What to keep when one of the fetches fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// Keep whichever resource succeeded
    Partial,
    /// Any failure discards both resources
    FailFast,
}

impl std::str::FromStr for MergePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "partial" => Ok(MergePolicy::Partial),
            "fail-fast" | "failfast" => Ok(MergePolicy::FailFast),
            other => Err(format!("unknown merge policy '{}'", other)),
        }
    }
}

pub struct SnapshotBuilder<S> {
    source: S,
    policy: MergePolicy,
}

impl<S: MarketSource> SnapshotBuilder<S> {
    pub fn new(source: S, policy: MergePolicy) -> Self {
        Self { source, policy }
    }

    /// Fetch both resources concurrently and merge them.
    /// Both requests always run to completion; never fails.
    pub async fn build(&self) -> Snapshot {
        let fetched_at = Utc::now();

        let (stats, price) = tokio::join!(self.source.fetch_stats(), self.source.fetch_price());

        merge(fetched_at, stats, price, self.policy)
    }
}

/// Combine two fetch results. When both failed the stats error wins.
pub fn merge(
    fetched_at: chrono::DateTime<Utc>,
    stats: Result<BlockchainStats, FetchError>,
    price: Result<PriceInfo, FetchError>,
    policy: MergePolicy,
) -> Snapshot {
    let mut snapshot = Snapshot::empty(fetched_at);

    match stats {
        Ok(s) => snapshot.stats = Some(s),
        Err(e) => snapshot.error = Some(e),
    }
    match price {
        Ok(p) => snapshot.price = Some(p),
        Err(e) => {
            if snapshot.error.is_none() {
                snapshot.error = Some(e);
            }
        }
    }

    if policy == MergePolicy::FailFast && snapshot.error.is_some() {
        snapshot.stats = None;
        snapshot.price = None;
    }

    snapshot
}
