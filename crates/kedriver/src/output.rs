//! Terminal output utilities
//!
//! Everything here writes to stderr; stdout is reserved for records and
//! `--json` output.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use kedriver_core::wait::{StatusObserver, TracingObserver};
use std::error::Error;
use std::time::Duration;

/// Print a success message
pub fn success(msg: &str) {
    eprintln!("{} {}", style("✓").green().bold(), msg);
}

/// Print a header
pub fn header(msg: &str) {
    eprintln!("\n{}", style(msg).bold().underlined());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    eprintln!("  {}: {}", style(key).dim(), value);
}

/// Create a spinner; hidden when output is suppressed
pub fn spinner(msg: &str, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    let spinner_style = ProgressStyle::with_template("{spinner:.blue} {msg} [{elapsed}]")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
    pb.set_style(spinner_style);
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Mirrors wait progress onto a spinner while still logging it
#[derive(Clone)]
pub struct SpinnerObserver {
    bar: ProgressBar,
    log: TracingObserver,
}

impl SpinnerObserver {
    pub fn new(bar: ProgressBar) -> Self {
        Self {
            bar,
            log: TracingObserver::new(),
        }
    }
}

impl StatusObserver for SpinnerObserver {
    fn on_poll(&self, resource: &str, poll: u32) {
        self.log.on_poll(resource, poll);
    }

    fn on_status_changed(&self, resource: &str, status: &str) {
        self.bar
            .set_message(format!("{} is {}", resource, status.to_lowercase()));
        self.bar
            .suspend(|| self.log.on_status_changed(resource, status));
    }

    fn on_terminal(&self, resource: &str, polls: u32, elapsed: Duration) {
        self.bar.set_message(format!("{} is running", resource));
        self.bar
            .suspend(|| self.log.on_terminal(resource, polls, elapsed));
    }

    fn on_fetch_failed(&self, resource: &str, error: &dyn Error) {
        self.bar
            .suspend(|| self.log.on_fetch_failed(resource, error));
    }

    fn on_timed_out(&self, resource: &str, polls: u32, elapsed: Duration) {
        self.bar
            .suspend(|| self.log.on_timed_out(resource, polls, elapsed));
    }

    fn on_cancelled(&self, resource: &str, polls: u32) {
        self.bar.suspend(|| self.log.on_cancelled(resource, polls));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_observer_tracks_latest_status() {
        let bar = ProgressBar::hidden();
        let observer = SpinnerObserver::new(bar.clone());

        observer.on_status_changed("cluster c1", "PROVISIONING");
        assert_eq!(bar.message(), "cluster c1 is provisioning");

        observer.on_terminal("cluster c1", 3, Duration::from_secs(10));
        assert_eq!(bar.message(), "cluster c1 is running");
    }
}
