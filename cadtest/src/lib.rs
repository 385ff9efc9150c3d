//! Sample Cadence application.
//!
//! Loads a fixed connection config, builds a workflow client over gRPC,
//! registers [`workflows::simple_workflow`] and [`activities::simple_activity`]
//! on a worker and starts it.

pub mod activities;
pub mod builder;
pub mod cli;
pub mod config;
pub mod error;
pub mod helper;
pub mod logging;
pub mod standalone;
pub mod workflows;

pub use builder::WorkflowClientBuilder;
pub use config::{get_config, Config};
pub use error::BootstrapError;
pub use helper::{Configuration, Helper, RegistryOption};
