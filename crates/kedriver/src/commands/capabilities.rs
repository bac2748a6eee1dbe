//! Capabilities command

use anyhow::Result;
use kedriver_core::{Capability, ClusterDriver};
use owo_colors::OwoColorize;

use super::Context;
use crate::cli::CapabilitiesArgs;
use crate::output;

const ALL: [Capability; 4] = [
    Capability::GetVersion,
    Capability::SetVersion,
    Capability::GetClusterSize,
    Capability::SetClusterSize,
];

pub fn run(ctx: &Context, args: CapabilitiesArgs) -> Result<()> {
    let driver = ctx.driver(&indicatif::ProgressBar::hidden())?;
    let capabilities = driver.capabilities();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&capabilities)?);
        return Ok(());
    }

    output::header(&format!("{} driver", driver.name()));
    for capability in ALL {
        let mark = if capabilities.has(capability) {
            "✓".green().to_string()
        } else {
            "✗".red().to_string()
        };
        println!("  {} {}", mark, capability);
    }
    Ok(())
}
