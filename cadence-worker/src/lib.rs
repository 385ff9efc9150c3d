//! Cadence worker implementation.
//!
//! This crate provides the worker that hosts workflow and activity
//! implementations for a domain and task list, and runs workflows handed to
//! it together with the activities they schedule.

mod executor;
pub mod registry;
pub mod worker;

pub use registry::*;
pub use worker::*;
