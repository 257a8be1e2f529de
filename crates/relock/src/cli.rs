//! Command-line interface definition

use crate::logging::LogLevel;
use clap::Parser;
use std::path::PathBuf;

/// Regenerate pinned requirements manifests for every interpreter version
/// declared in the tox envlist.
#[derive(Parser, Debug)]
#[command(name = "relock")]
#[command(
    about = "Regenerate pinned requirements manifests for every interpreter version in the tox envlist"
)]
#[command(version)]
pub struct Cli {
    /// Path to the tox.ini declaring the supported interpreter versions
    #[arg(long, default_value = "tox.ini")]
    pub matrix: PathBuf,

    /// Abstract requirement input handed to pip-compile; repeatable, order
    /// is preserved
    #[arg(
        long = "input",
        value_name = "FILE",
        default_values_os_t = [PathBuf::from("requirements.in"), PathBuf::from("dev-requirements.in")]
    )]
    pub inputs: Vec<PathBuf>,

    /// Directory receiving the <env>-requirements.txt manifests
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Per-version deadline for the pip-compile invocation, in seconds
    /// (no deadline by default)
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    #[arg(
        short = 'l',
        long,
        help = "Set logging level",
        default_value = "info",
        value_enum
    )]
    pub level: LogLevel,

    /// Emit the run summary as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

pub fn parse() -> Cli {
    Cli::parse()
}
