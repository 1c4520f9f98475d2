// src/diagnostics.rs

//! Environment report printed in verbose mode and by `highway diagnostics`.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::args::ArgumentList;
use crate::exec::{PathEnvironment, System};

/// Tools looked up when the caller has no list of its own.
pub const DEFAULT_TOOLS: &[&str] = &["git", "bash", "sh", "sleep", "cargo"];

const ENV_PREFIX: &str = "HIGHWAY_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolStatus {
    pub name: String,
    pub location: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Diagnostics {
    pub version: Option<String>,
    pub cwd: PathBuf,
    /// `HIGHWAY_*` variables only.
    pub environment: BTreeMap<String, String>,
    pub path: PathEnvironment,
    pub arguments: ArgumentList,
    pub tools: Vec<ToolStatus>,
}

impl Diagnostics {
    /// Snapshot the current process and resolve `tools` through `system`.
    pub fn collect<S: AsRef<str>>(version: Option<&str>, system: &System, tools: &[S]) -> Self {
        let environment = std::env::vars()
            .filter(|(k, _)| k.starts_with(ENV_PREFIX))
            .collect();
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let path = PathEnvironment::parse(std::env::var_os("PATH").as_deref(), &cwd);

        Self {
            version: version.map(str::to_string),
            cwd,
            environment,
            path,
            arguments: std::env::args().collect(),
            tools: resolve_tools(system, tools),
        }
    }
}

/// Resolution status of each named tool, in the given order.
pub fn resolve_tools<S: AsRef<str>>(system: &System, tools: &[S]) -> Vec<ToolStatus> {
    tools
        .iter()
        .map(|name| ToolStatus {
            name: name.as_ref().to_string(),
            location: system
                .executable(name.as_ref())
                .map(|l| l.path().to_path_buf()),
        })
        .collect()
}

fn section(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "{:^80}", title.to_uppercase())?;
    writeln!(f, "{}", "=".repeat(80))
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        section(f, "Environment")?;
        if self.environment.is_empty() {
            writeln!(f, "<no {ENV_PREFIX}* variables set>")?;
        }
        for (key, value) in &self.environment {
            writeln!(f, "{key:<40}{value}")?;
        }

        section(f, "Search paths")?;
        for dir in &self.path.directories {
            writeln!(f, "{}", dir.display())?;
        }

        section(f, "Arguments")?;
        for arg in self.arguments.loggable() {
            writeln!(f, "{arg}")?;
        }

        section(f, "Other properties")?;
        writeln!(f, "{:<40}{}", "cwd", self.cwd.display())?;
        writeln!(
            f,
            "{:<40}{}",
            "version",
            self.version.as_deref().unwrap_or("<none>")
        )?;

        section(f, "Tools")?;
        for tool in &self.tools {
            match &tool.location {
                Some(path) => writeln!(f, "{:<40}{}", tool.name, path.display())?,
                None => writeln!(f, "{:<40}<not found>", tool.name)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::exec::{SystemExecutableProvider, SystemExecutor};
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn report_lists_tools_and_masks_secrets() {
        let fs = MockFileSystem::new();
        fs.add_file("/bin/git", b"");
        let provider = SystemExecutableProvider::new(vec![PathBuf::from("/bin")], Arc::new(fs));
        let system = System::new(provider, SystemExecutor::new());

        let mut arguments = ArgumentList::from(["highway", "deploy"]);
        arguments.append_secure("hunter2");

        let diagnostics = Diagnostics {
            version: Some("0.1.0".into()),
            cwd: PathBuf::from("/work"),
            environment: BTreeMap::from([("HIGHWAY_LOG".into(), "debug".into())]),
            path: PathEnvironment::parse(Some(std::ffi::OsStr::new("/bin")), &PathBuf::from("/work")),
            arguments,
            tools: resolve_tools(&system, &["git", "xcrun"]),
        };
        let text = diagnostics.to_string();

        assert!(text.contains("HIGHWAY_LOG"));
        assert!(text.contains("/bin/git"));
        assert!(text.contains("<not found>"));
        assert!(text.contains(crate::args::REDACTED));
        assert!(!text.contains("hunter2"));
    }
}
