// src/lib.rs

pub mod args;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod highway;
pub mod logging;
pub mod types;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, build_provider, load_or_default, register_tasks};
use crate::diagnostics::{DEFAULT_TOOLS, Diagnostics};
use crate::exec::{PathEnvironment, ProcessDescriptor, System, SystemExecutor};
use crate::fs::{FileSystem, RealFileSystem};
use crate::highway::description::{render_help, to_json};
use crate::highway::{
    ErrorReporter, GraphError, Highway, HighwayDescription, RunStatus, StderrReporter, TaskContext, TaskKey,
};
use crate::types::DependencyPolicy;

pub const PROGRAM: &str = "highway";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const HELP: TaskKey<()> = TaskKey::new("help");
pub const DESCRIBE: TaskKey<String> = TaskKey::new("describe");
pub const DIAGNOSTICS: TaskKey<()> = TaskKey::new("diagnostics");

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - tool resolution (`[tools]` + `PATH`)
/// - built-in and config-declared tasks
/// - the description export
/// - dispatch of the requested task
pub async fn run(args: CliArgs) -> Result<RunStatus> {
    let cfg = load_or_default(args.config.as_deref())?;
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);

    let provider = build_provider(&cfg.tools, &PathEnvironment::from_env(), fs.clone());
    let system = System::new(provider, SystemExecutor::new());
    let reporter: Arc<dyn ErrorReporter> = Arc::new(StderrReporter::new());

    let policy = args.policy.unwrap_or(cfg.config.dependency_policy);
    let highway = build_highway(&cfg, system, reporter.clone(), policy);
    info!(tasks = highway.len(), %policy, "highway ready");

    let invocation = args.invocation();
    if invocation.is_verbose() {
        let tools = diagnostic_tools(&cfg);
        eprintln!("{}", Diagnostics::collect(Some(VERSION), highway.system(), &tools));
    }

    if let Some(path) = &cfg.config.description_file {
        if let Err(err) = write_description(fs.as_ref(), path, &highway.description()) {
            reporter.report(&err.into());
        }
    }

    Ok(highway.go(&invocation).await)
}

/// Registry with the built-in tasks, the config tasks and the default
/// handlers: help for an empty invocation, `highway-<command>` executables
/// for unknown commands.
pub fn build_highway(
    cfg: &ConfigFile,
    system: System,
    reporter: Arc<dyn ErrorReporter>,
    policy: DependencyPolicy,
) -> Highway {
    let mut highway = Highway::new(system, reporter).with_policy(policy);

    highway.define(&HELP, "Displays available commands and options", [], |_, cx| async move {
        print_help(&cx);
        Ok(())
    });
    highway.define(
        &DESCRIBE,
        "Prints every task as JSON",
        [],
        |_, cx| async move {
            let json = to_json(cx.descriptions())?;
            println!("{json}");
            anyhow::Ok(json)
        },
    );
    let tools = diagnostic_tools(cfg);
    highway.define(
        &DIAGNOSTICS,
        "Prints environment and tool diagnostics",
        [],
        move |_, cx| {
            let tools = tools.clone();
            async move {
                println!("{}", Diagnostics::collect(Some(VERSION), cx.system(), &tools));
                Ok(())
            }
        },
    );

    register_tasks(&mut highway, cfg);

    highway.on_empty(|cx| async move {
        print_help(&cx);
        Ok(())
    });
    highway.on_unrecognized(|command, arguments, cx| async move {
        let external = format!("{PROGRAM}-{command}");
        let Some(location) = cx.system().executable(&external) else {
            return Err(anyhow::Error::new(GraphError::UnrecognizedCommand(command)));
        };
        debug!(command = %command, executable = %location, "running external command");
        let mut descriptor = ProcessDescriptor::new(external, location).with_arguments(arguments);
        cx.system().execute(&mut descriptor).await?;
        anyhow::Ok(())
    });

    highway
}

/// Write the JSON task description to `path`.
pub fn write_description(
    fs: &dyn FileSystem,
    path: &Path,
    descriptions: &[HighwayDescription],
) -> Result<()> {
    let json = to_json(descriptions)?;
    fs.write_string(path, &json)?;
    debug!(path = %path.display(), "wrote highway description");
    Ok(())
}

fn print_help(cx: &TaskContext) {
    print!("{}", render_help(PROGRAM, cx.descriptions()));
}

fn diagnostic_tools(cfg: &ConfigFile) -> Vec<String> {
    let mut tools: Vec<String> = DEFAULT_TOOLS.iter().map(|t| t.to_string()).collect();
    for task in cfg.task.values() {
        if !tools.contains(&task.tool) {
            tools.push(task.tool.clone());
        }
    }
    tools
}
