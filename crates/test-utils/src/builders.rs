#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use highway::config::{ArgSpec, ConfigFile, RawConfigFile, TaskConfig};
use highway::exec::{ProcessExecutor, System, SystemExecutableProvider};
use highway::fs::mock::MockFileSystem;
use highway::types::DependencyPolicy;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigBuilder {
    config: RawConfigFile,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn with_task(mut self, name: &str, task: TaskConfig) -> Self {
        self.config.task.insert(name.to_string(), task);
        self
    }

    pub fn with_policy(mut self, policy: DependencyPolicy) -> Self {
        self.config.config.dependency_policy = policy;
        self
    }

    pub fn with_search_path(mut self, dir: &str) -> Self {
        self.config.tools.search_paths.push(PathBuf::from(dir));
        self
    }

    pub fn with_tool_location(mut self, name: &str, path: &str) -> Self {
        self.config
            .tools
            .locations
            .insert(name.to_string(), PathBuf::from(path));
        self
    }

    pub fn without_path_env(mut self) -> Self {
        self.config.tools.use_path_env = false;
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `TaskConfig`.
pub struct TaskConfigBuilder {
    task: TaskConfig,
}

impl TaskConfigBuilder {
    pub fn new(tool: &str) -> Self {
        Self {
            task: TaskConfig {
                tool: tool.to_string(),
                ..TaskConfig::default()
            },
        }
    }

    pub fn usage(mut self, usage: &str) -> Self {
        self.task.usage = Some(usage.to_string());
        self
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.task.args.push(ArgSpec::Plain(arg.to_string()));
        self
    }

    pub fn secret_env(mut self, var: &str) -> Self {
        self.task.args.push(ArgSpec::SecretEnv {
            secret_env: var.to_string(),
        });
        self
    }

    pub fn after(mut self, deps: &[&str]) -> Self {
        self.task.after = deps.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn cwd(mut self, dir: &str) -> Self {
        self.task.cwd = Some(PathBuf::from(dir));
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.task.env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn capture(mut self) -> Self {
        self.task.capture = true;
        self
    }

    pub fn forward_arguments(mut self) -> Self {
        self.task.forward_arguments = true;
        self
    }

    pub fn build(self) -> TaskConfig {
        self.task
    }
}

/// A `System` that finds exactly `tools` under `/fake/bin` and launches
/// through `executor`.
pub fn fake_system(tools: &[&str], executor: impl ProcessExecutor + 'static) -> System {
    let fs = MockFileSystem::new();
    for tool in tools {
        fs.add_file(format!("/fake/bin/{tool}"), b"#!fake");
    }
    let provider = SystemExecutableProvider::new(vec![PathBuf::from("/fake/bin")], Arc::new(fs));
    System::new(provider, executor)
}
