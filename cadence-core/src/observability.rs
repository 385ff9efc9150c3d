//! Hooks for metrics, tracing and context propagation.
//!
//! These are the seams the client and worker accept from the application.
//! Defaults are no-ops, except [`TracingTracer`] which opens `tracing` spans.

use std::collections::HashMap;
use std::time::Duration;

use crate::types::Header;

/// Metrics scope trait
pub trait MetricsScope: Send + Sync {
    fn counter(&self, name: &str, delta: u64);
    fn timer(&self, name: &str, duration: Duration);
}

/// Metrics scope that drops everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetricsScope;

impl MetricsScope for NoopMetricsScope {
    fn counter(&self, _name: &str, _delta: u64) {}

    fn timer(&self, _name: &str, _duration: Duration) {}
}

/// Opens a span around client and worker operations
pub trait Tracer: Send + Sync {
    fn start_span(&self, operation: &str) -> tracing::Span;
}

/// Tracer backed by the `tracing` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTracer;

impl Tracer for TracingTracer {
    fn start_span(&self, operation: &str) -> tracing::Span {
        tracing::info_span!("cadence", operation = %operation)
    }
}

/// Carries application context across the client/workflow boundary.
///
/// `inject` runs on the client when a workflow is started and writes into
/// the request header; `extract` runs in the worker before the workflow
/// function is invoked.
pub trait ContextPropagator: Send + Sync {
    fn inject(&self, header: &mut Header);
    fn extract(&self, header: &Header, values: &mut HashMap<String, Vec<u8>>);
}

/// Propagates a fixed set of header keys unchanged
#[derive(Debug, Clone, Default)]
pub struct StaticHeaderPropagator {
    values: HashMap<String, Vec<u8>>,
}

impl StaticHeaderPropagator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl ContextPropagator for StaticHeaderPropagator {
    fn inject(&self, header: &mut Header) {
        for (key, value) in &self.values {
            header.fields.insert(key.clone(), value.clone());
        }
    }

    fn extract(&self, header: &Header, values: &mut HashMap<String, Vec<u8>>) {
        for key in self.values.keys() {
            if let Some(value) = header.fields.get(key) {
                values.insert(key.clone(), value.clone());
            }
        }
    }
}
