// src/highway/mod.rs

//! The task graph ("highways").
//!
//! A [`Highway`] is a registry of named tasks, each with a usage string, an
//! ordered list of dependencies and an async body. Running a task first runs
//! its dependencies depth-first in declaration order, then its body, and
//! caches the body's value so later tasks can read it via [`TaskKey`].
//!
//! - [`key`] typed task keys.
//! - [`invocation`] the immutable per-run request.
//! - [`graph`] registration, validation and execution.
//! - [`context`] what bodies get to work with (results, system).
//! - [`description`] name/usage export for help screens and tooling.
//! - [`reporter`] the single sink every run error goes through.

pub mod context;
pub mod description;
pub mod error;
pub mod graph;
pub mod invocation;
pub mod key;
pub mod reporter;

pub use context::{ResultStore, TaskContext};
pub use description::HighwayDescription;
pub use error::GraphError;
pub use graph::{Highway, RunStatus};
pub use invocation::Invocation;
pub use key::{TaskId, TaskKey};
pub use reporter::{ErrorReporter, StderrReporter};
