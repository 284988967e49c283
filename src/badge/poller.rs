//! Background polling of the unread notification count.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::NotificationApi;

/// Periodically refreshes the unread badge count.
///
/// The poller runs as its own tokio task and is owned through the
/// [`BadgeHandle`] returned by [`UnreadBadgePoller::start`]. It is not
/// synchronized with the feed: the badge may briefly disagree with the list.
pub struct UnreadBadgePoller {
    api: Arc<dyn NotificationApi>,
    interval: Duration,
    count_tx: Arc<watch::Sender<Option<u64>>>,
    refresh: Arc<Notify>,
    shutdown_token: CancellationToken,
}

impl UnreadBadgePoller {
    /// Spawn the polling task. The first poll happens immediately.
    pub fn start(api: Arc<dyn NotificationApi>, interval: Duration) -> BadgeHandle {
        let (count_tx, count_rx) = watch::channel(None);
        let count_tx = Arc::new(count_tx);
        let refresh = Arc::new(Notify::new());
        let shutdown_token = CancellationToken::new();

        let poller = UnreadBadgePoller {
            api,
            interval,
            count_tx: count_tx.clone(),
            refresh: refresh.clone(),
            shutdown_token: shutdown_token.clone(),
        };
        let task = tokio::spawn(poller.run());

        BadgeHandle {
            count_rx,
            count_tx,
            refresh,
            shutdown_token,
            task: Mutex::new(Some(task)),
        }
    }

    async fn run(self) {
        info!("Starting unread badge poller every {:?}", self.interval);
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.shutdown_token.cancelled() => break,
                _ = ticker.tick() => {}
                _ = self.refresh.notified() => {
                    debug!("Out of band unread count refresh");
                    ticker.reset();
                }
            }

            tokio::select! {
                _ = self.shutdown_token.cancelled() => break,
                _ = self.poll_once() => {}
            }
        }

        info!("Unread badge poller stopped");
    }

    async fn poll_once(&self) {
        match self.api.unread_count().await {
            Ok(count) => {
                let previous = self.count_tx.send_replace(Some(count));
                if previous != Some(count) {
                    debug!("Unread count changed: {:?} -> {}", previous, count);
                }
            }
            // Keep showing the last known count
            Err(e) => warn!("Failed to poll unread count: {}", e),
        }
    }
}

/// Owned handle to a running [`UnreadBadgePoller`].
///
/// Dropping the handle stops the poller.
pub struct BadgeHandle {
    count_rx: watch::Receiver<Option<u64>>,
    count_tx: Arc<watch::Sender<Option<u64>>>,
    refresh: Arc<Notify>,
    shutdown_token: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl BadgeHandle {
    /// Last known unread count, `None` until the first successful poll.
    pub fn count(&self) -> Option<u64> {
        *self.count_rx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<u64>> {
        self.count_rx.clone()
    }

    /// Poll again right away instead of waiting for the next tick.
    pub fn refresh_now(&self) {
        self.refresh.notify_one();
    }

    /// Optimistically lower the badge after a local read.
    pub fn adjust_down(&self, by: u64) {
        if by == 0 {
            return;
        }
        self.count_tx.send_modify(|count| {
            if let Some(count) = count {
                *count = count.saturating_sub(by);
            }
        });
    }

    pub fn stop(&self) {
        self.shutdown_token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.shutdown_token.is_cancelled()
    }

    /// Stop the poller and wait for its task to finish.
    pub async fn shutdown(&self) {
        self.stop();
        let task = self
            .task
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!("Unread badge poller task failed: {}", e);
            }
        }
    }
}

impl Drop for BadgeHandle {
    fn drop(&mut self) {
        self.shutdown_token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, MockNotificationApi};
    use std::sync::atomic::{AtomicU64, Ordering};

    #[tokio::test]
    async fn test_first_poll_is_immediate() {
        let mut api = MockNotificationApi::new();
        api.expect_unread_count().returning(|| Ok(7));

        let handle = UnreadBadgePoller::start(Arc::new(api), Duration::from_secs(3600));
        let mut rx = handle.subscribe();
        rx.wait_for(|count| count.is_some()).await.unwrap();

        assert_eq!(handle.count(), Some(7));
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_refresh_now_polls_out_of_band() {
        let calls = Arc::new(AtomicU64::new(0));
        let counter = calls.clone();
        let mut api = MockNotificationApi::new();
        api.expect_unread_count()
            .returning(move || Ok(counter.fetch_add(1, Ordering::SeqCst) + 1));

        let handle = UnreadBadgePoller::start(Arc::new(api), Duration::from_secs(3600));
        let mut rx = handle.subscribe();
        rx.wait_for(|count| *count == Some(1)).await.unwrap();

        handle.refresh_now();
        rx.wait_for(|count| *count == Some(2)).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_failed_poll_keeps_last_count() {
        let calls = Arc::new(AtomicU64::new(0));
        let counter = calls.clone();
        let mut api = MockNotificationApi::new();
        api.expect_unread_count().returning(move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(3)
            } else {
                Err(ApiError::Status {
                    endpoint: "GET /notifications/unread-count".to_string(),
                    status: 500,
                })
            }
        });

        let handle = UnreadBadgePoller::start(Arc::new(api), Duration::from_millis(10));
        let mut rx = handle.subscribe();
        rx.wait_for(|count| count.is_some()).await.unwrap();

        while calls.load(Ordering::SeqCst) < 3 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        assert_eq!(handle.count(), Some(3));
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_adjust_down_saturates() {
        let mut api = MockNotificationApi::new();
        api.expect_unread_count().returning(|| Ok(2));

        let handle = UnreadBadgePoller::start(Arc::new(api), Duration::from_secs(3600));
        let mut rx = handle.subscribe();
        rx.wait_for(|count| count.is_some()).await.unwrap();

        handle.adjust_down(1);
        assert_eq!(handle.count(), Some(1));
        handle.adjust_down(5);
        assert_eq!(handle.count(), Some(0));
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_stops_polling() {
        let calls = Arc::new(AtomicU64::new(0));
        let counter = calls.clone();
        let mut api = MockNotificationApi::new();
        api.expect_unread_count().returning(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(1)
        });

        let handle = UnreadBadgePoller::start(Arc::new(api), Duration::from_millis(10));
        let mut rx = handle.subscribe();
        rx.wait_for(|count| count.is_some()).await.unwrap();

        handle.shutdown().await;
        assert!(handle.is_stopped());
        let after_stop = calls.load(Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(calls.load(Ordering::SeqCst), after_stop);
    }
}
