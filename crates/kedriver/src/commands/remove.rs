//! Remove command

use anyhow::Result;
use kedriver_core::ClusterDriver;

use super::Context;
use crate::cli::RecordArgs;
use crate::{files, output};

pub async fn run(ctx: &Context, args: RecordArgs) -> Result<()> {
    let info = files::read_cluster_info(&args.record)?;

    let spinner = ctx.spinner("Deleting cluster...");
    let driver = ctx.driver(&spinner)?;
    let result = driver.remove(&info).await;
    spinner.finish_and_clear();
    result?;

    output::success("Cluster deletion requested");
    Ok(())
}
