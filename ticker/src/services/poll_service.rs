use crate::models::Snapshot;
use crate::services::snapshot_service::{MarketSource, SnapshotBuilder};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

pub const DEFAULT_DELAY: Duration = Duration::from_secs(60);
pub const MIN_DELAY: Duration = Duration::from_secs(60);
pub const MAX_DELAY: Duration = Duration::from_secs(15 * 60);

/// Adaptive re-poll interval.
///
/// Waits half as long as the latest block has existed, so polling slows down
/// as a block ages and speeds back up once a new one appears. Never faster
/// than `min_delay`, never slower than `max_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    pub default_delay: Duration,
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self {
            default_delay: DEFAULT_DELAY,
            min_delay: MIN_DELAY,
            max_delay: MAX_DELAY,
        }
    }
}

impl PollSchedule {
    pub fn next_delay(&self, previous: &Snapshot, now: DateTime<Utc>) -> Duration {
        let mut delay = self.default_delay;

        if let (None, Some(stats)) = (&previous.error, &previous.stats) {
            let half = (now - stats.observed_time) / 2;
            // Negative means the block claims to be from the future
            delay = match half.to_std() {
                Ok(d) if d > self.max_delay => self.max_delay,
                Ok(d) => d,
                Err(_) => self.default_delay,
            };
        }

        delay.max(self.min_delay)
    }
}

/// Producer loop: build a snapshot, hand it to the display loop, sleep.
///
/// Runs until the receiving side is dropped.
pub async fn start_polling<S: MarketSource>(
    builder: SnapshotBuilder<S>,
    schedule: PollSchedule,
    tx: mpsc::Sender<Snapshot>,
) {
    info!(
        "Starting snapshot polling ({:?} - {:?} adaptive interval)",
        schedule.min_delay, schedule.max_delay
    );

    loop {
        let snapshot = builder.build().await;
        if let Some(stats) = &snapshot.stats {
            info!("Latest block {} at height {}", stats.hash, stats.height);
        }
        let delay = schedule.next_delay(&snapshot, Utc::now());

        if tx.send(snapshot).await.is_err() {
            warn!("Display loop has gone away, stopping polling");
            break;
        }

        info!("Sleeping for {:?}", delay);
        tokio::time::sleep(delay).await;
    }
}
