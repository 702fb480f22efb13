//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand};

/// pgshift - resize a managed Postgres instance by dump and restore
#[derive(Parser, Debug)]
#[command(name = "pgshift")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the project directory holding pgshift.yml and dump artifacts
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Override the dump artifact directory
    #[arg(long, global = true)]
    pub dump_dir: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the migration: gate, provision, dump, restore, verify
    Run(RunArgs),

    /// Report source/target parity without migrating anything
    Verify,
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Skip the post-migration verification report
    #[arg(long)]
    pub skip_verify: bool,

    /// Discard dump artifacts left over from prior runs before starting
    #[arg(long)]
    pub fresh: bool,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
