//! Update command

use anyhow::Result;
use kedriver_core::ClusterDriver;

use super::Context;
use crate::cli::UpdateArgs;
use crate::{files, output};

pub async fn run(ctx: &Context, args: UpdateArgs) -> Result<()> {
    let mut info = files::read_cluster_info(&args.record)?;
    let options = files::read_options(&args.options)?;
    let out = args.out.as_deref().unwrap_or(&args.record);

    output::header("Updating cluster");
    let spinner = ctx.spinner("Updating cluster...");
    let driver = ctx.driver(&spinner)?;
    let result = driver.update(&mut info, &options).await;
    spinner.finish_and_clear();

    // Steps completed before a failure are already reflected in the record
    files::write_cluster_info(&info, Some(out))?;
    result?;

    output::success("Cluster updated");
    Ok(())
}
