//! Command-line surface

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Compose, interpret and simulate permitting workflows
#[derive(Debug, Parser)]
#[command(name = "polaris", version, about)]
pub(crate) struct Cli {
    /// Configuration file (defaults to ./polaris.toml when present)
    #[arg(long, global = true)]
    pub(crate) config: Option<PathBuf>,

    /// Governance object directory, overriding the configuration
    #[arg(long, global = true)]
    pub(crate) memory: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub(crate) json_logs: bool,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Build, validate and export a composition
    Compose(ComposeArgs),
    /// Semantic and structural interpretation of a saved composition
    Interpret(CompositionArg),
    /// Cycle, orphan and feedback-loop report for a saved composition
    Diagnose(CompositionArg),
    /// Monte-Carlo duration and rework estimate
    Simulate(SimulateArgs),
}

#[derive(Debug, Args)]
pub(crate) struct ComposeArgs {
    /// Jurisdiction to select modules from
    #[arg(long)]
    pub(crate) jurisdiction: String,

    /// Module version (defaults to the configured version)
    #[arg(long = "module-version")]
    pub(crate) version: Option<String>,

    /// JSON file of temporal constraints
    #[arg(long)]
    pub(crate) constraints: PathBuf,

    /// Composition title
    #[arg(long)]
    pub(crate) title: String,

    /// Creator recorded on the composition
    #[arg(long, default_value = "polaris-cli")]
    pub(crate) created_by: String,

    /// Write the composition into the memory directory
    #[arg(long)]
    pub(crate) save: bool,
}

#[derive(Debug, Args)]
pub(crate) struct CompositionArg {
    /// Composition object id
    #[arg(long)]
    pub(crate) composition: String,
}

#[derive(Debug, Args)]
pub(crate) struct SimulateArgs {
    /// Composition object id
    #[arg(long)]
    pub(crate) composition: String,

    /// Monte-Carlo runs
    #[arg(long)]
    pub(crate) runs: Option<usize>,

    /// Base seed for reproducible runs
    #[arg(long)]
    pub(crate) seed: Option<u64>,

    /// Minimum task duration in days
    #[arg(long)]
    pub(crate) min: Option<u64>,

    /// Maximum task duration in days
    #[arg(long)]
    pub(crate) max: Option<u64>,

    /// Failure probability per attempt
    #[arg(long)]
    pub(crate) failure_rate: Option<f64>,

    /// Rework loop bound per module
    #[arg(long)]
    pub(crate) max_loops: Option<u32>,
}
