//! Periodic quote refresh with graceful degradation.
//!
//! A [`QuotePoller`] fetches one batched quotes request per tick until it is
//! cancelled. Errors never end the loop: the last live payload is kept (or the
//! demo dataset is published when there is none yet) and a [`PollerNotice`]
//! is broadcast for the UI to surface.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, error, warn};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::demo::demo_quotes;
use super::source::QuoteSource;
use crate::errors::Error;
use crate::upstox::instrument_keys;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

const NOTICE_CAPACITY: usize = 16;

#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Tickers or raw instrument keys; tickers are mapped through the instrument table.
    pub tickers: Vec<String>,
    pub interval: Duration,
}

impl PollerConfig {
    pub fn new<S: Into<String>>(tickers: impl IntoIterator<Item = S>) -> Self {
        Self {
            tickers: tickers.into_iter().map(Into::into).collect(),
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotOrigin {
    /// Fetched on this tick.
    Live,
    /// The last live payload, kept after a failed refresh.
    Stale,
    /// Demonstration data; no live payload has been received yet.
    Demo,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSnapshot {
    pub data: Value,
    pub origin: SnapshotOrigin,
    pub published_at: DateTime<Utc>,
}

/// Non-fatal notification raised when a refresh fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollerNotice {
    pub kind: &'static str,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl PollerNotice {
    fn from_error(err: &Error) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
            at: Utc::now(),
        }
    }
}

pub struct QuotePoller;

impl QuotePoller {
    /// Start polling on the current tokio runtime. The first request is issued immediately.
    pub fn spawn(source: Arc<dyn QuoteSource>, config: PollerConfig) -> PollerHandle {
        let (snapshot_tx, snapshot_rx) = watch::channel(None);
        let (notice_tx, _) = broadcast::channel(NOTICE_CAPACITY);
        let cancel = CancellationToken::new();

        let interval = if config.interval.is_zero() {
            warn!(
                "[Poller] Zero poll interval requested, using {:?}",
                DEFAULT_POLL_INTERVAL
            );
            DEFAULT_POLL_INTERVAL
        } else {
            config.interval
        };

        let poll_loop = PollLoop {
            source,
            instrument_keys: instrument_keys(&config.tickers),
            interval,
            snapshots: snapshot_tx,
            notices: notice_tx.clone(),
            cancel: cancel.clone(),
            last_good: None,
        };
        let task = tokio::spawn(poll_loop.run());

        PollerHandle {
            snapshots: snapshot_rx,
            notices: notice_tx,
            cancel,
            task: Some(task),
        }
    }
}

struct PollLoop {
    source: Arc<dyn QuoteSource>,
    instrument_keys: Vec<String>,
    interval: Duration,
    snapshots: watch::Sender<Option<QuoteSnapshot>>,
    notices: broadcast::Sender<PollerNotice>,
    cancel: CancellationToken,
    last_good: Option<Value>,
}

impl PollLoop {
    async fn run(mut self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = self.cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let result = tokio::select! {
                () = self.cancel.cancelled() => break,
                result = self.source.fetch_quotes(&self.instrument_keys) => result,
            };

            match result {
                Ok(data) => self.publish_live(data),
                Err(err) => self.publish_fallback(&err),
            }
        }
        debug!("[Poller] Quote poller stopped");
    }

    fn publish_live(&mut self, data: Value) {
        self.last_good = Some(data.clone());
        self.snapshots.send_replace(Some(QuoteSnapshot {
            data,
            origin: SnapshotOrigin::Live,
            published_at: Utc::now(),
        }));
    }

    fn publish_fallback(&self, err: &Error) {
        warn!("[Poller] Quote refresh failed, serving fallback data: {}", err);

        let (data, origin) = match &self.last_good {
            Some(data) => (data.clone(), SnapshotOrigin::Stale),
            None => (demo_quotes(&self.instrument_keys), SnapshotOrigin::Demo),
        };
        self.snapshots.send_replace(Some(QuoteSnapshot {
            data,
            origin,
            published_at: Utc::now(),
        }));
        // No subscribers is fine.
        let _ = self.notices.send(PollerNotice::from_error(err));
    }
}

/// Owner of a running poller. Dropping it cancels the task.
pub struct PollerHandle {
    snapshots: watch::Receiver<Option<QuoteSnapshot>>,
    notices: broadcast::Sender<PollerNotice>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// Receiver of snapshots; `None` until the first request completes.
    pub fn snapshots(&self) -> watch::Receiver<Option<QuoteSnapshot>> {
        self.snapshots.clone()
    }

    pub fn latest(&self) -> Option<QuoteSnapshot> {
        self.snapshots.borrow().clone()
    }

    pub fn notices(&self) -> broadcast::Receiver<PollerNotice> {
        self.notices.subscribe()
    }

    pub fn is_stopped(&self) -> bool {
        self.task.as_ref().map_or(true, |t| t.is_finished())
    }

    /// Cancel polling and wait for the task to exit.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!("[Poller] Quote poller task failed: {}", e);
            }
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{Result, UnauthorizedReason};
    use crate::gateway::HistoricalRequest;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Default)]
    struct ScriptedSource {
        results: Mutex<VecDeque<Result<Value>>>,
        requests: Mutex<Vec<Vec<String>>>,
    }

    impl ScriptedSource {
        fn with(results: Vec<Result<Value>>) -> Arc<Self> {
            Arc::new(Self {
                results: Mutex::new(results.into()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl QuoteSource for ScriptedSource {
        async fn fetch_quotes(&self, instrument_keys: &[String]) -> Result<Value> {
            self.requests.lock().unwrap().push(instrument_keys.to_vec());
            self.results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(json!({"data": {}})))
        }

        async fn fetch_historical(&self, _request: &HistoricalRequest) -> Result<Value> {
            unreachable!("poller never asks for candles")
        }
    }

    fn live(price: f64) -> Value {
        json!({"data": {"NSE_EQ|INE002A01018": {"last_price": price}}})
    }

    async fn next_snapshot(rx: &mut watch::Receiver<Option<QuoteSnapshot>>) -> QuoteSnapshot {
        rx.changed().await.unwrap();
        rx.borrow_and_update().clone().unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn first_failure_publishes_demo_data_and_a_notice() {
        let source = ScriptedSource::with(vec![Err(crate::errors::Error::Unauthorized(
            UnauthorizedReason::Absent,
        ))]);
        let handle = QuotePoller::spawn(source.clone(), PollerConfig::new(["RELIANCE"]));
        let mut notices = handle.notices();
        let mut rx = handle.snapshots();

        let snapshot = next_snapshot(&mut rx).await;
        assert_eq!(snapshot.origin, SnapshotOrigin::Demo);
        assert_eq!(snapshot.data["data"]["NSE_EQ|INE002A01018"]["last_price"], 2500.5);

        let notice = notices.recv().await.unwrap();
        assert_eq!(notice.kind, "unauthorized_absent");
        assert_eq!(
            source.requests.lock().unwrap()[0],
            vec!["NSE_EQ|INE002A01018".to_string()]
        );

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn failure_after_success_keeps_last_known_good() {
        let source = ScriptedSource::with(vec![
            Ok(live(2500.5)),
            Err(crate::errors::Error::Network("connection reset".into())),
            Ok(live(2501.0)),
        ]);
        let handle = QuotePoller::spawn(source.clone(), PollerConfig::new(["RELIANCE"]));
        let mut notices = handle.notices();
        let mut rx = handle.snapshots();

        let first = next_snapshot(&mut rx).await;
        assert_eq!(first.origin, SnapshotOrigin::Live);

        let second = next_snapshot(&mut rx).await;
        assert_eq!(second.origin, SnapshotOrigin::Stale);
        assert_eq!(second.data, live(2500.5));
        assert_eq!(notices.recv().await.unwrap().kind, "network_error");

        let third = next_snapshot(&mut rx).await;
        assert_eq!(third.origin, SnapshotOrigin::Live);
        assert_eq!(third.data, live(2501.0));

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn polls_on_the_configured_interval() {
        let source = ScriptedSource::with(Vec::new());
        let handle = QuotePoller::spawn(
            source.clone(),
            PollerConfig::new(["TCS"]).interval(Duration::from_secs(5)),
        );

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(source.request_count(), 1);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(source.request_count(), 2);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(source.request_count(), 4);

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_falls_back_to_the_default() {
        let source = ScriptedSource::with(Vec::new());
        let handle = QuotePoller::spawn(
            source.clone(),
            PollerConfig::new(["TCS"]).interval(Duration::ZERO),
        );

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(source.request_count(), 1);
        assert!(!handle.is_stopped());

        tokio::time::sleep(DEFAULT_POLL_INTERVAL).await;
        assert_eq!(source.request_count(), 2);

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stop_ends_polling_deterministically() {
        let source = ScriptedSource::with(Vec::new());
        let handle = QuotePoller::spawn(source.clone(), PollerConfig::new(["ITC"]));
        let mut rx = handle.snapshots();
        next_snapshot(&mut rx).await;

        handle.stop().await;
        let count = source.request_count();

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(source.request_count(), count);
        assert!(rx.changed().await.is_err(), "sender is gone once the task exits");
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_cancels_the_task() {
        let source = ScriptedSource::with(Vec::new());
        let handle = QuotePoller::spawn(source.clone(), PollerConfig::new(["ITC"]));
        let mut rx = handle.snapshots();
        next_snapshot(&mut rx).await;
        drop(handle);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(source.request_count(), 1);
    }
}
