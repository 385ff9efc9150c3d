//! Core types and utilities for the Cadence client.
//!
//! This crate provides the foundational types, error handling, and
//! serialization framework shared by the client, worker and the sample
//! application built on top of them.

pub mod encoded;
pub mod error;
pub mod observability;
pub mod types;

pub use encoded::*;
pub use error::*;
pub use observability::*;
pub use types::*;
