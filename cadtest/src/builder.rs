//! Fluent builder for the Cadence service client and workflow client.

use std::collections::HashMap;
use std::sync::Arc;

use cadence_client::{
    default_identity, ClientOptions, Dispatcher, DispatcherConfig, GrpcWorkflowServiceClient,
    Outbound, WorkflowClient, WorkflowService,
};
use cadence_core::{
    default_data_converter, ContextPropagator, DataConverter, FeatureFlags, MetricsScope,
    NoopMetricsScope, Tracer,
};
use tracing::{debug, error};

use crate::config::Config;
use crate::error::BootstrapError;

/// Builds a dispatcher once and hands out clients backed by it
#[derive(Default)]
pub struct WorkflowClientBuilder {
    host_port: String,
    dispatcher: Option<Dispatcher>,
    domain: String,
    client_identity: String,
    metrics_scope: Option<Arc<dyn MetricsScope>>,
    tracer: Option<Arc<dyn Tracer>>,
    data_converter: Option<Arc<dyn DataConverter>>,
    context_propagators: Vec<Arc<dyn ContextPropagator>>,
}

impl WorkflowClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_host_port(&mut self, host_port: impl Into<String>) -> &mut Self {
        self.host_port = host_port.into();
        self
    }

    pub fn set_domain(&mut self, domain: impl Into<String>) -> &mut Self {
        self.domain = domain.into();
        self
    }

    pub fn set_client_identity(&mut self, identity: impl Into<String>) -> &mut Self {
        self.client_identity = identity.into();
        self
    }

    pub fn set_metrics_scope(&mut self, metrics_scope: Arc<dyn MetricsScope>) -> &mut Self {
        self.metrics_scope = Some(metrics_scope);
        self
    }

    /// Use an existing dispatcher; `build` then leaves it untouched
    pub fn set_dispatcher(&mut self, dispatcher: Dispatcher) -> &mut Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    pub fn set_context_propagators(
        &mut self,
        context_propagators: Vec<Arc<dyn ContextPropagator>>,
    ) -> &mut Self {
        self.context_propagators = context_propagators;
        self
    }

    pub fn set_data_converter(&mut self, data_converter: Arc<dyn DataConverter>) -> &mut Self {
        self.data_converter = Some(data_converter);
        self
    }

    pub fn set_tracer(&mut self, tracer: Arc<dyn Tracer>) -> &mut Self {
        self.tracer = Some(tracer);
        self
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn dispatcher(&self) -> Option<&Dispatcher> {
        self.dispatcher.as_ref()
    }

    /// Create and start the RPC dispatcher unless one already exists.
    ///
    /// Fails when called outside a Tokio runtime.
    pub fn build(&mut self, config: &Config) -> Result<(), BootstrapError> {
        if self.dispatcher.is_some() {
            return Ok(());
        }
        if self.host_port.is_empty() {
            return Err(BootstrapError::HostPortEmpty);
        }

        debug!(
            service_name = %config.cadence_frontend_service,
            host_port = %self.host_port,
            "Creating RPC dispatcher outbound"
        );

        let mut dispatcher = Dispatcher::new(DispatcherConfig {
            name: config.cadence_client_service.clone(),
            outbounds: HashMap::from([(
                config.cadence_frontend_service.clone(),
                Outbound::grpc(self.host_port.clone()),
            )]),
        });
        if let Err(e) = dispatcher.start() {
            error!(error = %e, "Failed to create outbound transport channel");
            return Err(e.into());
        }

        self.dispatcher = Some(dispatcher);
        Ok(())
    }

    /// Service client talking to the frontend through the dispatcher
    pub fn build_service_client(
        &mut self,
        config: &Config,
    ) -> Result<Arc<dyn WorkflowService>, BootstrapError> {
        self.build(config)?;
        let dispatcher = self.dispatcher.as_ref().ok_or(BootstrapError::NoDispatcher)?;
        let client_config = dispatcher.client_config(&config.cadence_frontend_service)?;
        Ok(Arc::new(GrpcWorkflowServiceClient::new(client_config)))
    }

    /// Workflow client for the builder's domain
    pub fn build_cadence_client(
        &mut self,
        config: &Config,
    ) -> Result<WorkflowClient, BootstrapError> {
        let service = self.build_service_client(config)?;
        let identity = if self.client_identity.is_empty() {
            default_identity()
        } else {
            self.client_identity.clone()
        };
        let options = ClientOptions {
            identity,
            data_converter: self
                .data_converter
                .clone()
                .unwrap_or_else(default_data_converter),
            context_propagators: self.context_propagators.clone(),
            tracer: self.tracer.clone(),
            metrics_scope: self
                .metrics_scope
                .clone()
                .unwrap_or_else(|| Arc::new(NoopMetricsScope)),
            feature_flags: FeatureFlags {
                workflow_execution_already_completed_error_enabled: true,
            },
        };
        Ok(WorkflowClient::new(service, self.domain.clone(), options))
    }
}
