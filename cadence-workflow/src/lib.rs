//! Workflow authoring SDK for Cadence.
//!
//! This crate provides the API workflow functions are written against:
//! the [`WorkflowContext`] and the errors a workflow can return. Scheduling
//! is delegated to a [`CommandSink`] supplied by the worker.

pub mod context;
pub mod error;

pub use context::*;
pub use error::*;
