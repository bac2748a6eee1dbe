//! Kubernetes version commands

use anyhow::Result;
use kedriver_core::{ClusterDriver, KubernetesVersion};

use super::Context;
use crate::cli::VersionCommands;
use crate::{files, output};

pub async fn run(ctx: &Context, command: VersionCommands) -> Result<()> {
    match command {
        VersionCommands::Get(args) => {
            let info = files::read_cluster_info(&args.record)?;
            let spinner = ctx.spinner("Reading cluster version...");
            let driver = ctx.driver(&spinner)?;
            let result = driver.get_version(&info).await;
            spinner.finish_and_clear();
            let version = result?;

            if args.json {
                println!("{}", serde_json::to_string_pretty(&version)?);
            } else {
                println!("{}", version.version);
            }
            Ok(())
        }
        VersionCommands::Set(args) => {
            let info = files::read_cluster_info(&args.record)?;
            let target = KubernetesVersion::new(args.target);

            output::header(&format!("Upgrading cluster to {}", target.version));
            let spinner = ctx.spinner("Upgrading control plane...");
            let driver = ctx.driver(&spinner)?;
            let result = driver.set_version(&info, &target).await;
            spinner.finish_and_clear();
            result?;

            output::success(&format!("Cluster upgraded to {}", target.version));
            Ok(())
        }
    }
}
