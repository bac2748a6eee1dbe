//! Post-check command

use anyhow::Result;
use kedriver_core::ClusterDriver;

use super::Context;
use crate::cli::PostCheckArgs;
use crate::{files, output};

pub async fn run(ctx: &Context, args: PostCheckArgs) -> Result<()> {
    let mut info = files::read_cluster_info(&args.record)?;

    let spinner = ctx.spinner("Waiting for cluster...");
    let driver = ctx.driver(&spinner)?;
    let result = driver.post_check(&mut info).await;
    spinner.finish_and_clear();
    result?;

    files::write_cluster_info(&info, Some(args.out.as_deref().unwrap_or(&args.record)))?;

    output::success("Cluster is ready");
    output::kv("Endpoint", &info.endpoint);
    output::kv("Version", &info.version);
    output::kv("Nodes", &info.node_count.to_string());
    Ok(())
}
