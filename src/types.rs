use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// What to do with a dependency reachable through more than one path.
///
/// - `Repeat`: run it every time it is reached (a diamond runs the shared
///   task twice). No cycle detection is done, so a cyclic graph recurses
///   without bound; use [`crate::highway::Highway::validate`] first if the
///   graph is not trusted.
/// - `RunOnce`: run each task at most once per top-level run and fail with a
///   cycle error when a task is reached again while it is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyPolicy {
    Repeat,
    #[serde(rename = "once")]
    RunOnce,
}

impl Default for DependencyPolicy {
    fn default() -> Self {
        DependencyPolicy::Repeat
    }
}

impl FromStr for DependencyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "repeat" => Ok(DependencyPolicy::Repeat),
            "once" | "run-once" | "run_once" => Ok(DependencyPolicy::RunOnce),
            other => Err(format!(
                "invalid dependency_policy: {other} (expected \"repeat\" or \"once\")"
            )),
        }
    }
}

impl fmt::Display for DependencyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyPolicy::Repeat => f.write_str("repeat"),
            DependencyPolicy::RunOnce => f.write_str("once"),
        }
    }
}
