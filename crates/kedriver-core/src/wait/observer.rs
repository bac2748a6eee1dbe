//! Wait observation and logging
//!
//! This module provides the `StatusObserver` trait for following a wait and a
//! `TracingObserver` implementation that logs progress with `tracing`.

use std::error::Error;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Observer trait for wait events
///
/// Only `on_status_changed` is required; the remaining hooks default to no-ops.
pub trait StatusObserver: Send + Sync {
    /// Called before every status fetch
    fn on_poll(&self, resource: &str, poll: u32) {
        let _ = (resource, poll);
    }

    /// Called once each time the observed status differs from the previous poll
    fn on_status_changed(&self, resource: &str, status: &str);

    /// Called when the terminal status is observed
    fn on_terminal(&self, resource: &str, polls: u32, elapsed: Duration) {
        let _ = (resource, polls, elapsed);
    }

    /// Called when a status fetch fails, ending the wait
    fn on_fetch_failed(&self, resource: &str, error: &dyn Error) {
        let _ = (resource, error);
    }

    /// Called when the deadline or poll budget runs out
    fn on_timed_out(&self, resource: &str, polls: u32, elapsed: Duration) {
        let _ = (resource, polls, elapsed);
    }

    /// Called when the wait is cancelled
    fn on_cancelled(&self, resource: &str, polls: u32) {
        let _ = (resource, polls);
    }
}

/// A no-op observer
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl StatusObserver for NoOpObserver {
    fn on_status_changed(&self, _resource: &str, _status: &str) {}
}

/// An observer that logs wait progress using the `tracing` crate
///
/// # Log Levels
///
/// - `on_poll`: TRACE
/// - `on_status_changed`: INFO
/// - `on_terminal`: INFO
/// - `on_fetch_failed`: WARN
/// - `on_timed_out`: WARN
/// - `on_cancelled`: WARN
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl TracingObserver {
    pub fn new() -> Self {
        Self
    }
}

impl StatusObserver for TracingObserver {
    fn on_poll(&self, resource: &str, poll: u32) {
        tracing::trace!(resource = %resource, poll = poll, "polling status");
    }

    fn on_status_changed(&self, resource: &str, status: &str) {
        tracing::info!("{} {}......", status.to_lowercase(), resource);
    }

    fn on_terminal(&self, resource: &str, polls: u32, elapsed: Duration) {
        tracing::info!(
            polls = polls,
            elapsed_ms = elapsed.as_millis() as u64,
            "{} is running",
            resource
        );
    }

    fn on_fetch_failed(&self, resource: &str, error: &dyn Error) {
        tracing::warn!(resource = %resource, error = %error, "status fetch failed");
    }

    fn on_timed_out(&self, resource: &str, polls: u32, elapsed: Duration) {
        tracing::warn!(
            resource = %resource,
            polls = polls,
            elapsed_secs = elapsed.as_secs(),
            "gave up waiting"
        );
    }

    fn on_cancelled(&self, resource: &str, polls: u32) {
        tracing::warn!(resource = %resource, polls = polls, "wait cancelled");
    }
}

/// An observer that records every notified status
///
/// Clones share the same recording, so a clone can be handed to a poller
/// while the first instance is inspected afterwards.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    statuses: Arc<Mutex<Vec<String>>>,
    polls: Arc<Mutex<u32>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Statuses notified so far, in order
    pub fn statuses(&self) -> Vec<String> {
        self.statuses
            .lock()
            .map(|statuses| statuses.clone())
            .unwrap_or_default()
    }

    /// Number of polls started
    pub fn polls(&self) -> u32 {
        self.polls.lock().map(|polls| *polls).unwrap_or_default()
    }
}

impl StatusObserver for RecordingObserver {
    fn on_poll(&self, _resource: &str, _poll: u32) {
        if let Ok(mut polls) = self.polls.lock() {
            *polls += 1;
        }
    }

    fn on_status_changed(&self, _resource: &str, status: &str) {
        if let Ok(mut statuses) = self.statuses.lock() {
            statuses.push(status.to_string());
        }
    }
}

/// Implement StatusObserver for Arc<T> where T: StatusObserver
impl<T: StatusObserver + ?Sized> StatusObserver for Arc<T> {
    fn on_poll(&self, resource: &str, poll: u32) {
        (**self).on_poll(resource, poll)
    }

    fn on_status_changed(&self, resource: &str, status: &str) {
        (**self).on_status_changed(resource, status)
    }

    fn on_terminal(&self, resource: &str, polls: u32, elapsed: Duration) {
        (**self).on_terminal(resource, polls, elapsed)
    }

    fn on_fetch_failed(&self, resource: &str, error: &dyn Error) {
        (**self).on_fetch_failed(resource, error)
    }

    fn on_timed_out(&self, resource: &str, polls: u32, elapsed: Duration) {
        (**self).on_timed_out(resource, polls, elapsed)
    }

    fn on_cancelled(&self, resource: &str, polls: u32) {
        (**self).on_cancelled(resource, polls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_observer_shares_state_across_clones() {
        let observer = RecordingObserver::new();
        let handle = observer.clone();

        handle.on_poll("cluster c1", 1);
        handle.on_status_changed("cluster c1", "PROVISIONING");

        assert_eq!(observer.polls(), 1);
        assert_eq!(observer.statuses(), vec!["PROVISIONING".to_string()]);
    }

    #[test]
    fn test_arc_observer_forwards() {
        let inner = RecordingObserver::new();
        let shared: Arc<dyn StatusObserver> = Arc::new(inner.clone());

        shared.on_status_changed("nodepool np1", "RECONCILING");
        assert_eq!(inner.statuses(), vec!["RECONCILING".to_string()]);
    }

    #[test]
    fn test_tracing_observer_does_not_panic() {
        let observer = TracingObserver::new();
        observer.on_poll("cluster c1", 1);
        observer.on_status_changed("cluster c1", "PROVISIONING");
        observer.on_terminal("cluster c1", 2, Duration::from_secs(5));
        observer.on_timed_out("cluster c1", 2, Duration::from_secs(5));
        observer.on_cancelled("cluster c1", 2);
    }
}
