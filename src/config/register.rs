// src/config/register.rs

//! Turning a [`ConfigFile`] into executable pieces: the tool resolver and
//! the config-declared tasks.

use std::sync::Arc;

use anyhow::Context;
use tracing::debug;

use crate::args::ArgumentList;
use crate::config::model::{ArgSpec, ConfigFile, TaskConfig, ToolsSection};
use crate::exec::{FixedLocationsProvider, PathEnvironment, SystemExecutableProvider};
use crate::fs::FileSystem;
use crate::highway::{Highway, Invocation, TaskContext, TaskId, TaskKey};

/// Resolver for `[tools]`: fixed locations first, then `search_paths`, then
/// (unless disabled) the directories of `path`.
pub fn build_provider(
    tools: &ToolsSection,
    path: &PathEnvironment,
    fs: Arc<dyn FileSystem>,
) -> SystemExecutableProvider {
    let mut directories = tools.search_paths.clone();
    if tools.use_path_env {
        directories.extend(path.directories.iter().cloned());
    }

    let mut provider = SystemExecutableProvider::new(directories, fs.clone());
    if !tools.locations.is_empty() {
        provider.add(FixedLocationsProvider::new(tools.locations.clone(), fs));
    }
    provider
}

/// Define every `[task.<name>]` on `highway`, in name order.
///
/// Each task's result is its trimmed stdout when `capture = true`, `None`
/// otherwise.
pub fn register_tasks(highway: &mut Highway, cfg: &ConfigFile) {
    for (name, task) in &cfg.task {
        let key: TaskKey<Option<String>> = TaskKey::named(name.clone());
        let dependencies: Vec<TaskId> = task
            .after
            .iter()
            .map(|d| TaskId::from(d.as_str()))
            .collect();
        let usage = task.usage.clone().unwrap_or_default();
        let task = Arc::new(task.clone());

        debug!(task = %name, tool = %task.tool, "registering config task");
        highway.define(
            &key,
            &usage,
            dependencies,
            move |invocation, cx| run_config_task(task.clone(), invocation, cx),
        );
    }
}

async fn run_config_task(
    task: Arc<TaskConfig>,
    invocation: Invocation,
    cx: TaskContext,
) -> anyhow::Result<Option<String>> {
    let mut arguments = resolve_arguments(&task.args)?;
    if task.forward_arguments {
        arguments += invocation.arguments().clone();
    }

    let mut descriptor = cx.system().task(&task.tool)?.with_arguments(arguments);
    if let Some(dir) = &task.cwd {
        descriptor = descriptor.with_current_dir(dir);
    }
    for (key, value) in &task.env {
        descriptor = descriptor.with_env(key, value);
    }
    if task.capture {
        descriptor.enable_output_capturing();
    }

    cx.system().execute(&mut descriptor).await?;
    Ok(if task.capture {
        descriptor.trimmed_output()
    } else {
        None
    })
}

/// Build the argument list, reading secret values from the environment.
pub fn resolve_arguments(specs: &[ArgSpec]) -> anyhow::Result<ArgumentList> {
    let mut arguments = ArgumentList::new();
    for spec in specs {
        match spec {
            ArgSpec::Plain(literal) => arguments.append(literal.as_str()),
            ArgSpec::SecretEnv { secret_env } => {
                let value = std::env::var(secret_env).with_context(|| {
                    format!("secret argument variable '{secret_env}' is not set")
                })?;
                arguments.append_secure(value);
            }
        }
    }
    Ok(arguments)
}
