//! kedriver CLI - drive managed Kubernetes clusters through their lifecycle
//!
//! This is the main entry point for the kedriver command-line interface.

mod cli;
mod commands;
mod files;
mod output;

use anyhow::Result;
use clap::Parser;
use kedriver_core::wait::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};
use commands::Context;

#[tokio::main]
async fn main() -> Result<()> {
    // Must happen before any TLS operation
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());
    let ctx = Context::load(cli.config.as_deref(), cancel, cli.quiet)?;

    match cli.command {
        Commands::Create(args) => commands::create::run(&ctx, args).await,
        Commands::Update(args) => commands::update::run(&ctx, args).await,
        Commands::PostCheck(args) => commands::post_check::run(&ctx, args).await,
        Commands::Remove(args) => commands::remove::run(&ctx, args).await,
        Commands::Size(command) => commands::size::run(&ctx, command).await,
        Commands::Version(command) => commands::version::run(&ctx, command).await,
        Commands::Capabilities(args) => commands::capabilities::run(&ctx, args),
    }
}

/// Initialize tracing with appropriate verbosity
///
/// Logs go to stderr so a cluster-info record written to stdout stays parseable.
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Cancel in-flight waits on the first Ctrl-C
fn cancel_on_ctrl_c(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling");
            cancel.cancel();
        }
    });
}
