//! Cluster size commands

use anyhow::Result;
use kedriver_core::{ClusterDriver, NodeCount};

use super::Context;
use crate::cli::SizeCommands;
use crate::{files, output};

pub async fn run(ctx: &Context, command: SizeCommands) -> Result<()> {
    match command {
        SizeCommands::Get(args) => {
            let info = files::read_cluster_info(&args.record)?;
            let spinner = ctx.spinner("Reading cluster size...");
            let driver = ctx.driver(&spinner)?;
            let result = driver.get_cluster_size(&info).await;
            spinner.finish_and_clear();
            let size = result?;

            if args.json {
                println!("{}", serde_json::to_string_pretty(&size)?);
            } else {
                println!("{}", size.count);
            }
            Ok(())
        }
        SizeCommands::Set(args) => {
            let info = files::read_cluster_info(&args.record)?;
            let spinner = ctx.spinner(&format!("Resizing cluster to {} nodes...", args.count));
            let driver = ctx.driver(&spinner)?;
            let result = driver
                .set_cluster_size(&info, NodeCount::new(args.count))
                .await;
            spinner.finish_and_clear();
            result?;

            output::success(&format!("Cluster resized to {} nodes", args.count));
            Ok(())
        }
    }
}
