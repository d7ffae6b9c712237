use crate::api_client::FetchError;
use crate::formatting::render_title;
use crate::models::Snapshot;
use crate::presenter::Presenter;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time;

/// How often the title is re-rendered between snapshots
pub const REFRESH_TICK: Duration = Duration::from_millis(333);

enum DisplayState {
    NoData,
    HasData(Snapshot),
}

/// Holds the most recent snapshot and keeps the presenter's text current.
pub struct Display<P> {
    presenter: P,
    state: DisplayState,
    shown_data: bool,
}

impl<P: Presenter> Display<P> {
    pub fn new(presenter: P) -> Self {
        Self {
            presenter,
            state: DisplayState::NoData,
            shown_data: false,
        }
    }

    /// Replace the held snapshot
    pub fn receive(&mut self, snapshot: Snapshot) {
        self.state = DisplayState::HasData(snapshot);
    }

    /// Re-render from the held snapshot.
    ///
    /// A snapshot without data leaves the previous text alone. A pending
    /// error is logged and cleared so it surfaces once; it only becomes the
    /// displayed text while nothing else has ever been shown.
    pub fn refresh(&mut self, now: DateTime<Utc>) -> Option<FetchError> {
        let DisplayState::HasData(snapshot) = &mut self.state else {
            return None;
        };

        if let Some(title) = render_title(snapshot, now) {
            self.presenter.set_display_text(&title);
            self.shown_data = true;
        }

        let error = snapshot.error.take()?;
        tracing::error!("Fetch failed: {}", error);
        if !self.shown_data {
            self.presenter.set_display_text(&error.to_string());
        }
        Some(error)
    }
}

/// Consumer loop: wait for a snapshot or the refresh tick, whichever comes
/// first, then re-render. Ends when the producer hangs up.
pub async fn run_display<P: Presenter>(mut rx: mpsc::Receiver<Snapshot>, presenter: P, tick: Duration) {
    tracing::info!("Display loop started (presenter: {}, tick: {:?})", presenter.name(), tick);
    let mut display = Display::new(presenter);

    loop {
        match time::timeout(tick, rx.recv()).await {
            Ok(Some(snapshot)) => display.receive(snapshot),
            Ok(None) => {
                tracing::info!("Snapshot channel closed, stopping display loop");
                break;
            }
            Err(_) => {}
        }
        display.refresh(Utc::now());
    }
}
