use crate::constants::{UPSTREAM_CALLS_PER_WINDOW, UPSTREAM_WINDOW_SECS};
use std::collections::VecDeque;
use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// Serializing, window-limited lane for upstream calls.
///
/// At most one call is in flight at a time, so a completed call has
/// populated the caches before the next queued call runs. On top of that a
/// sliding window caps how many calls are dispatched per rolling
/// `window` (the upstream's quota). Waiters are admitted in FIFO order and
/// the queue itself never fails; each call returns its own result.
pub struct FetchQueue {
    max_calls: usize,
    window: Duration,
    dispatch_log: Mutex<VecDeque<Instant>>,
}

impl FetchQueue {
    pub fn new() -> Self {
        Self::with_limits(
            UPSTREAM_CALLS_PER_WINDOW,
            Duration::from_secs(UPSTREAM_WINDOW_SECS),
        )
    }

    pub fn with_limits(max_calls: usize, window: Duration) -> Self {
        Self {
            max_calls,
            window,
            dispatch_log: Mutex::new(VecDeque::new()),
        }
    }

    /// Runs `fut` once a dispatch slot is free.
    ///
    /// The log lock is held for the whole call; tokio's mutex hands it out
    /// in acquisition order, which gives the FIFO admission guarantee.
    pub async fn run<F, T>(&self, fut: F) -> T
    where
        F: Future<Output = T>,
    {
        let mut log = self.dispatch_log.lock().await;
        self.wait_for_slot(&mut log).await;
        log.push_back(Instant::now());
        fut.await
    }

    async fn wait_for_slot(&self, log: &mut VecDeque<Instant>) {
        loop {
            let now = Instant::now();
            while log
                .front()
                .is_some_and(|&t| now.duration_since(t) >= self.window)
            {
                log.pop_front();
            }

            if log.len() < self.max_calls {
                return;
            }

            if let Some(&oldest) = log.front() {
                let wait = self.window.saturating_sub(now.duration_since(oldest));
                debug!(wait_ms = wait.as_millis() as u64, "fetch queue at quota, waiting");
                sleep(wait).await;
            }
        }
    }
}

impl Default for FetchQueue {
    fn default() -> Self {
        Self::new()
    }
}
