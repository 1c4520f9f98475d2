// src/highway/error.rs

use thiserror::Error;

/// Errors raised by the graph itself, as opposed to task bodies.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("unrecognized command '{0}': no such highway is registered")]
    UnrecognizedCommand(String),

    #[error("{task} depends on {dependency} but no such highway is registered")]
    UnknownDependency { task: String, dependency: String },

    #[error("no result available for highway '{0}'")]
    NoResult(String),

    #[error("result of highway '{task}' is not a {expected}")]
    ResultTypeMismatch { task: String, expected: &'static str },

    #[error("dependency cycle detected: {0}")]
    Cycle(String),
}
