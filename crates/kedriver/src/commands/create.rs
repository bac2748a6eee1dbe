//! Create command

use anyhow::Result;
use kedriver_core::ClusterDriver;

use super::Context;
use crate::cli::CreateArgs;
use crate::{files, output};

pub async fn run(ctx: &Context, args: CreateArgs) -> Result<()> {
    let options = files::read_options(&args.options)?;

    output::header("Creating cluster");
    let spinner = ctx.spinner("Creating cluster...");
    let driver = ctx.driver(&spinner)?;
    let result = driver.create(&options).await;
    spinner.finish_and_clear();
    let info = result?;

    files::write_cluster_info(&info, args.out.as_deref())?;
    output::success("Cluster created");
    if let Some(out) = &args.out {
        output::kv("Record", out.as_str());
    }

    Ok(())
}
