// src/config/validate.rs

use tracing::warn;

use crate::config::model::{ArgSpec, ConfigFile, RawConfigFile};
use crate::errors::{HighwayError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = HighwayError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.config, raw.tools, raw.task))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_tools(cfg)?;
    validate_tasks(cfg)?;
    warn_unknown_dependencies(cfg);
    Ok(())
}

fn validate_tools(cfg: &RawConfigFile) -> Result<()> {
    for dir in &cfg.tools.search_paths {
        if dir.as_os_str().is_empty() {
            return Err(HighwayError::ConfigError(
                "[tools].search_paths must not contain empty entries".to_string(),
            ));
        }
    }

    for (name, path) in &cfg.tools.locations {
        if !path.is_absolute() {
            return Err(HighwayError::ConfigError(format!(
                "[tools.locations].{name} must be an absolute path (got '{}')",
                path.display()
            )));
        }
    }

    Ok(())
}

fn validate_tasks(cfg: &RawConfigFile) -> Result<()> {
    for (name, task) in &cfg.task {
        if name.trim().is_empty() {
            return Err(HighwayError::ConfigError(
                "task names must not be empty".to_string(),
            ));
        }
        if task.tool.trim().is_empty() {
            return Err(HighwayError::ConfigError(format!(
                "task '{name}' has an empty `tool`"
            )));
        }
        if task.after.iter().any(|dep| dep == name) {
            return Err(HighwayError::ConfigError(format!(
                "task '{name}' cannot depend on itself in `after`"
            )));
        }
        for arg in &task.args {
            if let ArgSpec::SecretEnv { secret_env } = arg {
                if secret_env.trim().is_empty() {
                    return Err(HighwayError::ConfigError(format!(
                        "task '{name}' has a secret argument with an empty `secret_env`"
                    )));
                }
            }
        }
    }
    Ok(())
}

// Unknown names are left for the graph to report when the task runs, so a
// broken task only fails when it is actually selected.
fn warn_unknown_dependencies(cfg: &RawConfigFile) {
    for (name, task) in &cfg.task {
        for dep in task.after.iter().filter(|d| !cfg.task.contains_key(*d)) {
            warn!(
                task = %name,
                dependency = %dep,
                "`after` names a task not declared in the config"
            );
        }
    }
}
