use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: SubArgs,
}

#[derive(Debug, Subcommand)]
pub enum SubArgs {
    #[command(name = "run")]
    Run {
        #[command(flatten)]
        args: RunArgs,
    },
    #[command(name = "write")]
    Write {
        #[command(flatten)]
        args: WriteArgs,
    },
}

/// Run the pipeline from provisioning to reporting
///
/// # Example
///
/// ```bash,no_run
/// bacass-launch run -c launch.toml
/// ```
///
/// # Arguments
///
/// * `config` - Path to the launch configuration file
///
/// # Note
///
/// * The process exits 0 when the pipeline succeeds and 1 when it fails,
///   in both cases after logs and storage usage have been reported
#[derive(Debug, Parser)]
pub struct RunArgs {
    #[arg(
        short = 'c',
        long = "config",
        help = "Path to the launch configuration file",
        value_name = "CONFIG",
        default_value = "launch.toml"
    )]
    pub config: PathBuf,
}

/// Stage the samplesheet and write the launch command without running
///
/// # Example
///
/// ```bash,no_run
/// bacass-launch write -c launch.toml -o staging
/// ```
///
/// # Arguments
///
/// * `config` - Path to the launch configuration file
/// * `out` - Directory receiving the samplesheet and launch.sh
///
/// # Note
///
/// * No storage is provisioned and the engine is never invoked; this is
///   for inspecting flag rendering before a real launch
#[derive(Debug, Parser, Clone)]
pub struct WriteArgs {
    #[arg(
        short = 'c',
        long = "config",
        help = "Path to the launch configuration file",
        value_name = "CONFIG",
        default_value = "launch.toml"
    )]
    pub config: PathBuf,

    #[arg(
        short = 'o',
        long = "out",
        help = "Directory receiving the samplesheet and launch script",
        value_name = "DIR",
        default_value = "."
    )]
    pub out: PathBuf,
}
