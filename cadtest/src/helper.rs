//! Worker bootstrap helper.
//!
//! [`Helper`] collects workflow and activity registrations before a worker
//! exists, then creates the worker, forwards every registration to it and
//! starts it in one step.

use std::sync::Arc;

use cadence_client::{Client, StartWorkflowOptions, WorkflowClient, WorkflowService};
use cadence_core::{
    default_data_converter, encode_with, ContextPropagator, DataConverter, MetricsScope,
    NoopMetricsScope, Tracer, WorkflowExecution,
};
use cadence_worker::{
    ActivityDefinition, ActivityRegisterOptions, CadenceWorker, Worker, WorkerError,
    WorkerOptions, WorkflowDefinition, WorkflowRegisterOptions,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::builder::WorkflowClientBuilder;
use crate::config::Config;
use crate::error::BootstrapError;
use crate::logging::init_logger;

/// Where and how to reach the Cadence frontend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(rename = "domain")]
    pub domain_name: String,
    #[serde(rename = "service")]
    pub service_name: String,
    #[serde(rename = "host")]
    pub host_name_and_port: String,
}

/// A pending registration, optionally under an alias
#[derive(Debug, Clone)]
pub struct RegistryOption<D> {
    pub definition: D,
    pub alias: Option<String>,
}

impl<D> RegistryOption<D> {
    fn new(definition: D, alias: &str) -> Self {
        Self {
            definition,
            alias: (!alias.is_empty()).then(|| alias.to_string()),
        }
    }
}

pub struct Helper {
    pub builder: Option<WorkflowClientBuilder>,
    pub client: Option<WorkflowClient>,
    pub service: Option<Arc<dyn WorkflowService>>,
    pub data_converter: Arc<dyn DataConverter>,
    pub config: Option<Configuration>,
    pub worker_metric_scope: Arc<dyn MetricsScope>,
    pub service_metric_scope: Arc<dyn MetricsScope>,
    pub tracer: Option<Arc<dyn Tracer>>,
    pub ctx_propagators: Vec<Arc<dyn ContextPropagator>>,
    workflow_registries: Vec<RegistryOption<WorkflowDefinition>>,
    activity_registries: Vec<RegistryOption<ActivityDefinition>>,
}

impl Default for Helper {
    fn default() -> Self {
        Self {
            builder: None,
            client: None,
            service: None,
            data_converter: default_data_converter(),
            config: None,
            worker_metric_scope: Arc::new(NoopMetricsScope),
            service_metric_scope: Arc::new(NoopMetricsScope),
            tracer: None,
            ctx_propagators: Vec::new(),
            workflow_registries: Vec::new(),
            activity_registries: Vec::new(),
        }
    }
}

impl std::fmt::Debug for Helper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Helper")
            .field("config", &self.config)
            .field("set_up", &self.service.is_some())
            .field("workflow_registries", &self.workflow_registries)
            .field("activity_registries", &self.activity_registries)
            .finish_non_exhaustive()
    }
}

impl Helper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the service and workflow clients. Does nothing once set up.
    ///
    /// Fails when called outside a Tokio runtime.
    pub fn setup(
        &mut self,
        configuration: Configuration,
        config: &Config,
    ) -> Result<(), BootstrapError> {
        if self.service.is_some() {
            return Ok(());
        }

        init_logger();
        self.service_metric_scope = Arc::new(NoopMetricsScope);
        self.worker_metric_scope = Arc::new(NoopMetricsScope);

        let mut builder = WorkflowClientBuilder::new();
        builder
            .set_host_port(configuration.host_name_and_port.clone())
            .set_domain(configuration.domain_name.clone())
            .set_data_converter(Arc::clone(&self.data_converter))
            .set_context_propagators(self.ctx_propagators.clone());
        if let Some(tracer) = &self.tracer {
            builder.set_tracer(Arc::clone(tracer));
        }
        self.config = Some(configuration);

        let service = builder.build_service_client(config).map_err(|e| {
            error!(error = %e, "Failed to build cadence service client.");
            e
        })?;
        let client = builder.build_cadence_client(config).map_err(|e| {
            error!(error = %e, "Failed to build cadence client.");
            e
        })?;

        self.service = Some(service);
        self.client = Some(client);
        self.builder = Some(builder);
        Ok(())
    }

    pub fn register_workflow(&mut self, workflow: WorkflowDefinition) {
        self.register_workflow_with_alias(workflow, "");
    }

    /// Queue a workflow registration; an empty alias keeps the default name
    pub fn register_workflow_with_alias(&mut self, workflow: WorkflowDefinition, alias: &str) {
        self.workflow_registries.push(RegistryOption::new(workflow, alias));
    }

    pub fn register_activity(&mut self, activity: ActivityDefinition) {
        self.register_activity_with_alias(activity, "");
    }

    /// Queue an activity registration; an empty alias keeps the default name
    pub fn register_activity_with_alias(&mut self, activity: ActivityDefinition, alias: &str) {
        self.activity_registries.push(RegistryOption::new(activity, alias));
    }

    /// Forward queued registrations to `worker`, in the order they were made.
    ///
    /// The queues are emptied once every registration succeeds, so a later
    /// call forwards nothing. On failure they are kept intact.
    pub fn register_workflow_and_activity(
        &mut self,
        worker: &dyn Worker,
    ) -> Result<(), WorkerError> {
        for entry in &self.workflow_registries {
            let definition = entry.definition.clone();
            match &entry.alias {
                None => worker.register_workflow(definition)?,
                Some(alias) => worker.register_workflow_with_options(
                    definition,
                    WorkflowRegisterOptions {
                        name: Some(alias.clone()),
                        ..Default::default()
                    },
                )?,
            }
        }

        for entry in &self.activity_registries {
            let definition = entry.definition.clone();
            match &entry.alias {
                None => worker.register_activity(definition)?,
                Some(alias) => worker.register_activity_with_options(
                    definition,
                    ActivityRegisterOptions {
                        name: Some(alias.clone()),
                        ..Default::default()
                    },
                )?,
            }
        }

        self.workflow_registries.clear();
        self.activity_registries.clear();
        Ok(())
    }

    /// Create a worker for `domain_name`/`group_name`, register everything
    /// queued so far and start it
    pub fn start_workers(
        &mut self,
        domain_name: &str,
        group_name: &str,
        options: WorkerOptions,
    ) -> Result<CadenceWorker, BootstrapError> {
        let service = self.service.clone().ok_or(BootstrapError::NotSetUp)?;
        let worker = CadenceWorker::new(service, domain_name, group_name, options);

        let started = self
            .register_workflow_and_activity(&worker)
            .and_then(|()| worker.start());
        if let Err(e) = started {
            error!(error = %e, "FAILED TO START WORKER");
            return Err(e.into());
        }
        Ok(worker)
    }

    /// Start a workflow execution through the workflow client
    pub async fn start_workflow<A>(
        &self,
        options: StartWorkflowOptions,
        workflow_type: &str,
        args: &A,
    ) -> Result<WorkflowExecution, BootstrapError>
    where
        A: Serialize + ?Sized,
    {
        let client = self.client.as_ref().ok_or(BootstrapError::NotSetUp)?;
        let input = encode_with(self.data_converter.as_ref(), args)?;

        match client.start_workflow(options, workflow_type, Some(input.as_slice())).await {
            Ok(execution) => {
                info!(
                    WorkflowID = %execution.workflow_id,
                    RunID = %execution.run_id,
                    "Started Workflow"
                );
                Ok(execution)
            }
            Err(e) => {
                error!(error = %e, "Failed to create workflow");
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_serde_names() {
        let configuration = Configuration {
            domain_name: "cadence-test".to_string(),
            service_name: "cadence-frontend".to_string(),
            host_name_and_port: "127.0.0.1:7933".to_string(),
        };
        let json = serde_json::to_value(&configuration).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "domain": "cadence-test",
                "service": "cadence-frontend",
                "host": "127.0.0.1:7933",
            })
        );
    }

    #[test]
    fn test_empty_alias_is_no_alias() {
        assert_eq!(RegistryOption::new((), "").alias, None);
        assert_eq!(
            RegistryOption::new((), "hello_world").alias.as_deref(),
            Some("hello_world")
        );
    }

    #[test]
    fn test_start_workers_before_setup() {
        let mut helper = Helper::new();
        let err = helper
            .start_workers("cadence-test", "cadence-test", WorkerOptions::default())
            .unwrap_err();
        assert!(matches!(err, BootstrapError::NotSetUp));
    }
}
