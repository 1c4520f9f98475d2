// src/exec/error.rs

use std::path::PathBuf;

use thiserror::Error;

use super::descriptor::Termination;

/// Errors produced while resolving, launching or waiting for a process.
///
/// A non-zero exit is *not* an error of [`super::ProcessExecutor::launch`];
/// it only becomes [`ExecError::Failed`] when a caller asserts success.
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("tool '{tool}' not found{}", searched_suffix(.searched))]
    ToolNotFound { tool: String, searched: Vec<PathBuf> },

    #[error("failed to launch '{program}'")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("exit status of '{program}' was lost: {reason}")]
    ExitLost { program: String, reason: String },

    #[error("'{program}' {termination}")]
    Failed {
        program: String,
        termination: Termination,
    },

    #[error("cannot open {path:?} for process io")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' was never launched")]
    NotLaunched { program: String },

    #[error("invalid lifecycle transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}

fn searched_suffix(searched: &[PathBuf]) -> String {
    if searched.is_empty() {
        return String::new();
    }
    let dirs: Vec<String> = searched.iter().map(|p| p.display().to_string()).collect();
    format!(" (searched: {})", dirs.join(", "))
}
