use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Polymatic CLI - A command-line interface for the Polymatic simulated polymerization loop, driving external bonding and molecular simulation tools over an isolated staging tree.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the simulated polymerization loop in a prepared workspace.
    Run(RunArgs),
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Workspace root holding the starting structure, type table, and
    /// instruction scripts. Defaults to the current directory.
    #[arg(short, long, value_name = "DIR")]
    pub workspace: Option<PathBuf>,

    /// Path to the run configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Schedule Overrides ---
    /// Override the total number of bonds to form.
    #[arg(short = 'n', long, value_name = "INT")]
    pub target_bonds: Option<u32>,

    /// Override the number of bonds between equilibration cycles.
    #[arg(long, value_name = "INT")]
    pub bonds_per_cycle: Option<u32>,

    /// Override how often a cycle runs the extended equilibration protocol.
    #[arg(long, value_name = "INT")]
    pub extended_md_frequency: Option<u32>,

    /// Override the maximum perturbation retries per bond.
    #[arg(long, value_name = "INT")]
    pub max_attempts: Option<u32>,

    /// Override `workspace.keep-intermediates` from the config file.
    #[command(flatten)]
    pub keep: KeepIntermediates,

    // --- Tool Overrides ---
    /// Override the bonding tool command line.
    #[arg(long, value_name = "CMD")]
    pub topology_tool: Option<String>,

    /// Override the simulation engine command line.
    #[arg(long, value_name = "CMD")]
    pub engine: Option<String>,
}

/// A group to handle mutually exclusive boolean flags for retaining stage
/// directories.
#[derive(Args, Debug, Clone, Copy)]
#[group(required = false, multiple = false)]
pub struct KeepIntermediates {
    /// Retain every stage directory created during the run.
    #[arg(long)]
    pub keep_intermediates: bool,
    /// Remove stage directories as soon as their outputs are committed.
    #[arg(long)]
    pub discard_intermediates: bool,
}
