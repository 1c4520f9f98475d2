// src/config/mod.rs

//! Configuration loading and validation for highway.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate basic invariants (`validate.rs`).
//! - Build the tool resolver and config-declared tasks (`register.rs`).

pub mod loader;
pub mod model;
pub mod register;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_or_default};
pub use model::{ArgSpec, ConfigFile, ConfigSection, RawConfigFile, TaskConfig, ToolsSection};
pub use register::{build_provider, register_tasks};
