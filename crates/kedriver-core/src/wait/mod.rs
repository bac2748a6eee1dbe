//! Status wait engine
//!
//! Polls a resource until it reports a terminal status, with a fixed interval
//! between polls, an optional deadline and poll budget, and cooperative
//! cancellation through a [`CancellationToken`].
//!
//! A failed status fetch ends the wait immediately; it is never retried.
//! Observers are told about each *change* of status, not about every poll, so
//! a resource sitting in `PROVISIONING` for ten minutes produces one
//! notification.
//!
//! # Example
//!
//! ```rust,no_run
//! use kedriver_core::wait::{StatusPoller, TracingObserver, WaitError, WaitPolicy};
//!
//! async fn example() -> Result<(), WaitError<std::io::Error>> {
//!     let poller = StatusPoller::new(WaitPolicy::default())
//!         .with_observer(TracingObserver::new());
//!
//!     poller
//!         .wait_for("cluster c1", "RUNNING", || async {
//!             // Fetch the current status here
//!             Ok::<_, std::io::Error>("RUNNING".to_string())
//!         })
//!         .await
//! }
//! ```

mod error;
mod observer;
mod poller;

pub use error::WaitError;
pub use observer::{NoOpObserver, RecordingObserver, StatusObserver, TracingObserver};
pub use poller::{StatusPoller, WaitPolicy, DEFAULT_POLL_INTERVAL, RUNNING_STATUS};
pub use tokio_util::sync::CancellationToken;
