//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// kedriver - drive managed Kubernetes clusters through their lifecycle
#[derive(Parser, Debug)]
#[command(name = "kedriver")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the driver config file (default: ~/.kedriver/config.yaml)
    #[arg(short, long, global = true)]
    pub config: Option<Utf8PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a cluster from an options file
    Create(CreateArgs),

    /// Apply new options to an existing cluster
    Update(UpdateArgs),

    /// Wait for a cluster and fill in its connection details
    PostCheck(PostCheckArgs),

    /// Delete a cluster
    Remove(RecordArgs),

    /// Read or change the node count
    #[command(subcommand)]
    Size(SizeCommands),

    /// Read or change the Kubernetes version
    #[command(subcommand)]
    Version(VersionCommands),

    /// List the optional operations the driver supports
    Capabilities(CapabilitiesArgs),
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Options file (JSON or YAML)
    #[arg(short, long)]
    pub options: Utf8PathBuf,

    /// Where to write the cluster-info record (default: stdout)
    #[arg(long)]
    pub out: Option<Utf8PathBuf>,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Cluster-info record written by `create`
    pub record: Utf8PathBuf,

    /// Options file (JSON or YAML)
    #[arg(short, long)]
    pub options: Utf8PathBuf,

    /// Where to write the updated record (default: overwrite the input record)
    #[arg(long)]
    pub out: Option<Utf8PathBuf>,
}

#[derive(Args, Debug)]
pub struct PostCheckArgs {
    /// Cluster-info record written by `create`
    pub record: Utf8PathBuf,

    /// Where to write the updated record (default: overwrite the input record)
    #[arg(long)]
    pub out: Option<Utf8PathBuf>,
}

#[derive(Args, Debug)]
pub struct RecordArgs {
    /// Cluster-info record written by `create`
    pub record: Utf8PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum SizeCommands {
    /// Show the current node count
    Get(GetArgs),

    /// Resize the cluster
    Set(SetSizeArgs),
}

#[derive(Subcommand, Debug)]
pub enum VersionCommands {
    /// Show the current control-plane version
    Get(GetArgs),

    /// Upgrade the control plane, then the nodes
    Set(SetVersionArgs),
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Cluster-info record written by `create`
    pub record: Utf8PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct SetSizeArgs {
    /// Cluster-info record written by `create`
    pub record: Utf8PathBuf,

    /// Desired node count
    #[arg(value_parser = clap::value_parser!(i64).range(1..))]
    pub count: i64,
}

#[derive(Args, Debug)]
pub struct SetVersionArgs {
    /// Cluster-info record written by `create`
    pub record: Utf8PathBuf,

    /// Target Kubernetes version, e.g. 1.30.0-gke.1
    #[arg(value_name = "VERSION")]
    pub target: String,
}

#[derive(Args, Debug)]
pub struct CapabilitiesArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
