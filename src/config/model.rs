// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::types::DependencyPolicy;

/// Configuration exactly as read from `Highway.toml`.
///
/// ```toml
/// [config]
/// dependency_policy = "once"
///
/// [tools]
/// search_paths = ["/opt/tools/bin"]
///
/// [tools.locations]
/// git = "/usr/bin/git"
///
/// [task.build]
/// usage = "Builds the project"
/// tool = "cargo"
/// args = ["build", { secret_env = "REGISTRY_TOKEN" }]
/// after = ["fmt"]
/// ```
///
/// Every section is optional. Use [`ConfigFile`] (via `TryFrom`) for a
/// validated configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,

    #[serde(default)]
    pub tools: ToolsSection,

    /// `[task.<name>]` sections keyed by task name.
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,
}

/// Validated configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub tools: ToolsSection,
    pub task: BTreeMap<String, TaskConfig>,
}

impl ConfigFile {
    /// Only the validation layer should call this.
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        tools: ToolsSection,
        task: BTreeMap<String, TaskConfig>,
    ) -> Self {
        Self { config, tools, task }
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigSection {
    /// `"repeat"` (default) or `"once"`.
    #[serde(default)]
    pub dependency_policy: DependencyPolicy,

    /// Where to write the JSON task description on every launch, if anywhere.
    #[serde(default)]
    pub description_file: Option<PathBuf>,
}

/// `[tools]` section: how tool names are turned into executables.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolsSection {
    /// Searched in order, before `PATH`.
    #[serde(default)]
    pub search_paths: Vec<PathBuf>,

    /// Append the `PATH` directories after `search_paths`.
    #[serde(default = "default_use_path_env")]
    pub use_path_env: bool,

    /// Fixed tool locations, consulted before any directory search.
    #[serde(default)]
    pub locations: BTreeMap<String, PathBuf>,
}

fn default_use_path_env() -> bool {
    true
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            search_paths: Vec::new(),
            use_path_env: default_use_path_env(),
            locations: BTreeMap::new(),
        }
    }
}

/// One entry of a task's `args` list.
///
/// Either a literal string or `{ secret_env = "VAR" }`, which is read from
/// the environment when the task runs and never logged.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ArgSpec {
    Plain(String),
    SecretEnv { secret_env: String },
}

/// `[task.<name>]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskConfig {
    /// Shown in the help screen.
    #[serde(default)]
    pub usage: Option<String>,

    /// Logical tool name, resolved through `[tools]` and `PATH`.
    pub tool: String,

    #[serde(default)]
    pub args: Vec<ArgSpec>,

    /// Tasks to run first, in this order.
    #[serde(default)]
    pub after: Vec<String>,

    #[serde(default)]
    pub cwd: Option<PathBuf>,

    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// Capture stdout; the trimmed text becomes the task's result.
    #[serde(default)]
    pub capture: bool,

    /// Append the invocation's residual arguments to `args`.
    #[serde(default)]
    pub forward_arguments: bool,
}
