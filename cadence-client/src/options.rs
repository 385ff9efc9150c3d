//! Client options.

use std::fmt;
use std::sync::Arc;

use cadence_core::{
    default_data_converter, ContextPropagator, DataConverter, FeatureFlags, MetricsScope,
    NoopMetricsScope, Tracer,
};

/// Client configuration options
#[derive(Clone)]
pub struct ClientOptions {
    pub identity: String,
    pub data_converter: Arc<dyn DataConverter>,
    pub context_propagators: Vec<Arc<dyn ContextPropagator>>,
    pub tracer: Option<Arc<dyn Tracer>>,
    pub metrics_scope: Arc<dyn MetricsScope>,
    pub feature_flags: FeatureFlags,
}

/// `<pid>@<hostname>`
pub fn default_identity() -> String {
    format!(
        "{}@{}",
        std::process::id(),
        std::env::var("HOSTNAME").unwrap_or_else(|_| "unknown".to_string())
    )
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            identity: default_identity(),
            data_converter: default_data_converter(),
            context_propagators: Vec::new(),
            tracer: None,
            metrics_scope: Arc::new(NoopMetricsScope),
            feature_flags: FeatureFlags::default(),
        }
    }
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("identity", &self.identity)
            .field("context_propagators", &self.context_propagators.len())
            .field("tracer", &self.tracer.is_some())
            .field("feature_flags", &self.feature_flags)
            .finish()
    }
}
