// src/errors.rs

//! Crate-wide error type.

use thiserror::Error;

use crate::exec::ExecError;
use crate::highway::GraphError;

#[derive(Error, Debug)]
pub enum HighwayError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error("highway '{task}' failed")]
    TaskFailed {
        task: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("no highway selected and no empty-invocation handler set")]
    NoEmptyHandler,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HighwayError {
    /// The graph error behind this error, if any.
    pub fn graph_error(&self) -> Option<&GraphError> {
        match self {
            HighwayError::Graph(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, HighwayError>;
