//! Client implementation for Cadence workflow orchestration service.
//!
//! This crate provides the RPC dispatcher that owns the transport to the
//! Cadence frontend, the [`WorkflowService`] seam on top of it, and the
//! higher-level workflow [`Client`] used to start workflows.

pub mod client;
pub mod dispatcher;
pub mod grpc;
pub mod options;
pub mod proto;
pub mod service;

pub use client::*;
pub use dispatcher::*;
pub use grpc::*;
pub use options::*;
pub use service::*;
