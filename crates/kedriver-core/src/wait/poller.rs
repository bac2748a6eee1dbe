//! Poll-until-terminal execution

use std::error::Error;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::error::WaitError;
use super::observer::{NoOpObserver, StatusObserver};

/// Interval between polls when none is configured
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Status reported by clusters and node pools once an operation has settled
pub const RUNNING_STATUS: &str = "RUNNING";

/// Bounds applied to a single wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Pause between consecutive polls
    pub interval: Duration,
    /// Give up once this much time has passed (`None` waits forever)
    pub max_wait: Option<Duration>,
    /// Give up after this many polls (`None` is unlimited)
    pub max_polls: Option<u32>,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_wait: Some(Duration::from_secs(3600)),
            max_polls: None,
        }
    }
}

impl WaitPolicy {
    /// Poll forever at the given interval
    pub fn unbounded(interval: Duration) -> Self {
        Self {
            interval,
            max_wait: None,
            max_polls: None,
        }
    }

    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }

    pub fn with_max_polls(mut self, max_polls: u32) -> Self {
        self.max_polls = Some(max_polls);
        self
    }
}

/// Polls a status source until it reports a terminal value
///
/// Cheap to clone; clones share the observer and the cancellation token.
#[derive(Clone)]
pub struct StatusPoller {
    policy: WaitPolicy,
    observer: Arc<dyn StatusObserver>,
    cancel: CancellationToken,
}

impl std::fmt::Debug for StatusPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusPoller")
            .field("policy", &self.policy)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

impl Default for StatusPoller {
    fn default() -> Self {
        Self::new(WaitPolicy::default())
    }
}

impl StatusPoller {
    /// Create a poller with no observer and a fresh cancellation token
    pub fn new(policy: WaitPolicy) -> Self {
        Self {
            policy,
            observer: Arc::new(NoOpObserver),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_observer<O: StatusObserver + 'static>(mut self, observer: O) -> Self {
        self.observer = Arc::new(observer);
        self
    }

    /// Share an existing cancellation token; cancelling it ends any wait in flight
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn policy(&self) -> &WaitPolicy {
        &self.policy
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Poll `fetch` until it returns `terminal`
    ///
    /// The first fetch happens immediately. After a non-terminal status the
    /// poller sleeps for the policy interval (or until the deadline, whichever
    /// comes first) and fetches again. The observer is notified once per
    /// distinct status; the terminal status is reported through `on_terminal`.
    pub async fn wait_for<F, Fut, E>(
        &self,
        resource: &str,
        terminal: &str,
        mut fetch: F,
    ) -> Result<(), WaitError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<String, E>>,
        E: Error + 'static,
    {
        let start = Instant::now();
        let deadline = self.policy.max_wait.map(|max| start + max);
        let mut polls: u32 = 0;
        let mut last_status: Option<String> = None;

        loop {
            if self.cancel.is_cancelled() {
                return Err(self.cancelled(resource, polls, last_status));
            }

            polls += 1;
            self.observer.on_poll(resource, polls);

            let fetched = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    return Err(self.cancelled(resource, polls, last_status));
                }
                result = fetch() => result,
            };

            let status = match fetched {
                Ok(status) => status,
                Err(source) => {
                    self.observer.on_fetch_failed(resource, &source);
                    return Err(WaitError::Fetch {
                        poll: polls,
                        source,
                    });
                }
            };

            if status == terminal {
                self.observer.on_terminal(resource, polls, start.elapsed());
                return Ok(());
            }

            if last_status.as_deref() != Some(status.as_str()) {
                self.observer.on_status_changed(resource, &status);
            }
            last_status = Some(status);

            if self.policy.max_polls.is_some_and(|max| polls >= max) {
                return Err(self.timed_out(resource, polls, start, last_status));
            }

            let now = Instant::now();
            let wake_at = match deadline {
                Some(deadline) if now >= deadline => {
                    return Err(self.timed_out(resource, polls, start, last_status));
                }
                Some(deadline) => (now + self.policy.interval).min(deadline),
                None => now + self.policy.interval,
            };

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    return Err(self.cancelled(resource, polls, last_status));
                }
                _ = tokio::time::sleep_until(wake_at) => {}
            }
        }
    }

    fn cancelled<E>(&self, resource: &str, polls: u32, last_status: Option<String>) -> WaitError<E> {
        self.observer.on_cancelled(resource, polls);
        WaitError::Cancelled { polls, last_status }
    }

    fn timed_out<E>(
        &self,
        resource: &str,
        polls: u32,
        start: Instant,
        last_status: Option<String>,
    ) -> WaitError<E> {
        let elapsed = start.elapsed();
        self.observer.on_timed_out(resource, polls, elapsed);
        WaitError::TimedOut {
            polls,
            elapsed,
            last_status,
        }
    }
}
