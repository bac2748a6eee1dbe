//! CLI command implementations

pub mod capabilities;
pub mod create;
pub mod post_check;
pub mod remove;
pub mod size;
pub mod update;
pub mod version;

use anyhow::Result;
use camino::Utf8Path;
use indicatif::ProgressBar;
use kedriver_core::wait::{CancellationToken, StatusPoller};
use kedriver_core::{ConfigLoader, DriverConfig};
use kedriver_gke::GkeDriver;

use crate::output::{self, SpinnerObserver};

/// Shared state for every command
pub struct Context {
    config: DriverConfig,
    cancel: CancellationToken,
    quiet: bool,
}

impl Context {
    /// Load the driver configuration; `config_path` overrides the default location
    pub fn load(config_path: Option<&Utf8Path>, cancel: CancellationToken, quiet: bool) -> Result<Self> {
        let config = ConfigLoader::new()?.load(config_path)?;
        Ok(Self {
            config,
            cancel,
            quiet,
        })
    }

    /// A driver whose waits report onto `progress` and stop on Ctrl-C
    pub fn driver(&self, progress: &ProgressBar) -> Result<GkeDriver> {
        let poller = StatusPoller::new(self.config.wait.policy())
            .with_observer(SpinnerObserver::new(progress.clone()))
            .with_cancellation(self.cancel.clone());
        Ok(GkeDriver::from_config(&self.config, self.cancel.clone())?.with_poller(poller))
    }

    /// A spinner honoring `--quiet`
    pub fn spinner(&self, msg: &str) -> ProgressBar {
        output::spinner(msg, self.quiet)
    }
}
