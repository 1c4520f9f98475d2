// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`resolver`] maps logical tool names ("git", "cargo") to executable
//!   locations through an ordered chain of providers.
//! - [`channel`] describes how a child's stdin/stdout/stderr are wired.
//! - [`descriptor`] is the inert, single-use description of one launch and
//!   its lifecycle state.
//! - [`executor`] provides the `ProcessExecutor` trait and the tokio-backed
//!   `SystemExecutor` used in production; tests can replace it with a fake.
//! - [`system`] bundles a resolver and an executor for task bodies.

pub mod channel;
pub mod descriptor;
pub mod error;
pub mod executor;
pub mod resolver;
pub mod system;

pub use channel::{CaptureBuffer, Channel, Io};
pub use descriptor::{LifecycleState, ProcessDescriptor, Termination};
pub use error::ExecError;
pub use executor::{ProcessExecutor, SystemExecutor};
pub use resolver::{
    ExecutableLocation, ExecutableProvider, FixedLocationsProvider, PathEnvironment,
    ProviderChain, SearchPathsProvider, SystemExecutableProvider,
};
pub use system::System;
