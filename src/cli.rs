// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::args::ArgumentList;
use crate::highway::Invocation;
use crate::types::DependencyPolicy;

/// Command-line arguments for `highway`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "highway",
    version,
    about = "Run named build tasks and their dependencies.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `$HIGHWAY_CONFIG`, or `Highway.toml` in the current
    /// working directory.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `HIGHWAY_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print diagnostics before running and log at debug level.
    #[arg(short, long)]
    pub verbose: bool,

    /// How shared dependencies are handled: `repeat` or `once`.
    ///
    /// Overrides `[config].dependency_policy`.
    #[arg(long, value_name = "POLICY")]
    pub policy: Option<DependencyPolicy>,

    /// Task to run. Omit to print the help screen.
    #[arg(value_name = "TASK")]
    pub task: Option<String>,

    /// Arguments handed to the task.
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

impl CliArgs {
    pub fn invocation(&self) -> Invocation {
        Invocation::new(
            self.task.clone(),
            ArgumentList::from(self.args.clone()),
            self.verbose,
        )
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
