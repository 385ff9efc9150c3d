//! Worker implementation for hosting workflows and activities.
//!
//! A [`CadenceWorker`] owns a registry for one domain and task list. Once
//! started it accepts workflow executions through
//! [`CadenceWorker::execute_workflow`] and runs the activities they schedule
//! against the same registry.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use cadence_client::{default_identity, WorkflowService};
use cadence_core::{
    decode_with, default_data_converter, encode_with, ContextPropagator, DataConverter,
    EncodingError, FeatureFlags, Header, MetricsScope, NoopMetricsScope, Tracer,
    WorkflowExecution, WorkflowInfo, WorkflowType,
};
use cadence_workflow::{WorkflowContext, WorkflowError};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::{Notify, Semaphore};
use tracing::{error, info, Instrument};

use crate::executor::LocalActivityExecutor;
use crate::registry::{
    ActivityDefinition, ActivityRegisterOptions, Registry, RegistryError, WorkflowDefinition,
    WorkflowRegisterOptions, WorkflowRegistry,
};

/// Worker trait for hosting workflows and activities
pub trait Worker: Send + Sync {
    /// Register a workflow under its default name
    fn register_workflow(&self, workflow: WorkflowDefinition) -> Result<(), WorkerError> {
        self.register_workflow_with_options(workflow, WorkflowRegisterOptions::default())
    }

    fn register_workflow_with_options(
        &self,
        workflow: WorkflowDefinition,
        options: WorkflowRegisterOptions,
    ) -> Result<(), WorkerError>;

    /// Register an activity under its default name
    fn register_activity(&self, activity: ActivityDefinition) -> Result<(), WorkerError> {
        self.register_activity_with_options(activity, ActivityRegisterOptions::default())
    }

    fn register_activity_with_options(
        &self,
        activity: ActivityDefinition,
        options: ActivityRegisterOptions,
    ) -> Result<(), WorkerError>;

    /// Start the worker in non-blocking mode
    fn start(&self) -> Result<(), WorkerError>;

    /// Stop the worker
    fn stop(&self);
}

/// Worker errors
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("Worker already started")]
    AlreadyStarted,
    #[error("Worker is not started")]
    NotStarted,
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error(transparent)]
    Registration(#[from] RegistryError),
    #[error("workflow type \"{0}\" is not registered")]
    WorkflowNotRegistered(String),
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error("Failed to wait for shutdown signal: {0}")]
    Signal(#[from] std::io::Error),
}

/// Worker options for configuration
#[derive(Clone)]
pub struct WorkerOptions {
    /// Maximum concurrent activity executions
    pub max_concurrent_activity_execution_size: usize,
    pub identity: String,
    pub metrics_scope: Arc<dyn MetricsScope>,
    pub data_converter: Arc<dyn DataConverter>,
    /// Propagators extracting header values into the workflow context
    pub context_propagators: Vec<Arc<dyn ContextPropagator>>,
    pub tracer: Option<Arc<dyn Tracer>>,
    pub feature_flags: FeatureFlags,
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self {
            max_concurrent_activity_execution_size: 1000,
            identity: default_identity(),
            metrics_scope: Arc::new(NoopMetricsScope),
            data_converter: default_data_converter(),
            context_propagators: Vec::new(),
            tracer: None,
            feature_flags: FeatureFlags::default(),
        }
    }
}

impl std::fmt::Debug for WorkerOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerOptions")
            .field(
                "max_concurrent_activity_execution_size",
                &self.max_concurrent_activity_execution_size,
            )
            .field("identity", &self.identity)
            .field("context_propagators", &self.context_propagators.len())
            .field("tracer", &self.tracer.is_some())
            .field("feature_flags", &self.feature_flags)
            .finish()
    }
}

/// Worker implementation
pub struct CadenceWorker {
    service: Arc<dyn WorkflowService>,
    domain: String,
    task_list: String,
    options: WorkerOptions,
    registry: Arc<dyn Registry>,
    activity_slots: Arc<Semaphore>,
    started: AtomicBool,
    shutdown: Notify,
}

impl std::fmt::Debug for CadenceWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CadenceWorker")
            .field("domain", &self.domain)
            .field("task_list", &self.task_list)
            .field("options", &self.options)
            .field("started", &self.is_started())
            .finish_non_exhaustive()
    }
}

impl CadenceWorker {
    pub fn new(
        service: Arc<dyn WorkflowService>,
        domain: impl Into<String>,
        task_list: impl Into<String>,
        options: WorkerOptions,
    ) -> Self {
        let activity_slots = Arc::new(Semaphore::new(
            options.max_concurrent_activity_execution_size.max(1),
        ));
        Self {
            service,
            domain: domain.into(),
            task_list: task_list.into(),
            options,
            registry: Arc::new(WorkflowRegistry::new()),
            activity_slots,
            started: AtomicBool::new(false),
            shutdown: Notify::new(),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn task_list(&self) -> &str {
        &self.task_list
    }

    pub fn options(&self) -> &WorkerOptions {
        &self.options
    }

    /// Service the worker was created for
    pub fn service(&self) -> Arc<dyn WorkflowService> {
        Arc::clone(&self.service)
    }

    pub fn registry(&self) -> Arc<dyn Registry> {
        Arc::clone(&self.registry)
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Start the worker if needed, then block until Ctrl+C or [`Worker::stop`]
    pub async fn run(&self) -> Result<(), WorkerError> {
        let stopped = self.shutdown.notified();
        tokio::pin!(stopped);
        stopped.as_mut().enable();

        if !self.is_started() {
            self.start()?;
        }

        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal?;
                info!(task_list = %self.task_list, "Received shutdown signal");
                self.stop();
            }
            _ = &mut stopped => {}
        }
        Ok(())
    }

    /// Run a registered workflow to completion on this worker.
    ///
    /// `header` carries values written by the starter's context propagators;
    /// the worker's propagators extract them into the workflow context.
    pub async fn execute_workflow(
        &self,
        workflow_type: &str,
        input: Option<Vec<u8>>,
        header: Option<Header>,
    ) -> Result<Vec<u8>, WorkerError> {
        if !self.is_started() {
            return Err(WorkerError::NotStarted);
        }
        let workflow = self
            .registry
            .get_workflow(workflow_type)
            .ok_or_else(|| WorkerError::WorkflowNotRegistered(workflow_type.to_string()))?;

        let workflow_execution = WorkflowExecution::new(
            uuid::Uuid::new_v4().to_string(),
            uuid::Uuid::new_v4().to_string(),
        );
        let info = WorkflowInfo {
            workflow_execution: workflow_execution.clone(),
            workflow_type: WorkflowType {
                name: workflow_type.to_string(),
            },
            domain: self.domain.clone(),
            task_list: self.task_list.clone(),
            start_time: chrono::Utc::now(),
            attempt: 1,
        };

        let mut propagated = HashMap::new();
        if let Some(header) = &header {
            for propagator in &self.options.context_propagators {
                propagator.extract(header, &mut propagated);
            }
        }

        let executor = LocalActivityExecutor {
            registry: Arc::clone(&self.registry),
            data_converter: Arc::clone(&self.options.data_converter),
            metrics_scope: Arc::clone(&self.options.metrics_scope),
            activity_slots: Arc::clone(&self.activity_slots),
            domain: self.domain.clone(),
            workflow_execution: workflow_execution.clone(),
        };
        let ctx = WorkflowContext::new(
            info,
            Arc::new(executor),
            Arc::clone(&self.options.data_converter),
        )
        .with_propagated_values(propagated);

        let span = match &self.options.tracer {
            Some(tracer) => tracer.start_span("ExecuteWorkflow"),
            None => tracing::info_span!(
                "workflow",
                workflow_type = %workflow_type,
                workflow_id = %workflow_execution.workflow_id,
            ),
        };

        let metrics = &self.options.metrics_scope;
        let started = Instant::now();
        let result = workflow.execute(ctx, input).instrument(span).await;
        metrics.timer("cadence-workflow-endtoend-latency", started.elapsed());

        match result {
            Ok(output) => {
                metrics.counter("cadence-workflow-completed", 1);
                info!(
                    workflow_type = %workflow_type,
                    workflow_id = %workflow_execution.workflow_id,
                    run_id = %workflow_execution.run_id,
                    "Workflow completed"
                );
                Ok(output)
            }
            Err(e) => {
                metrics.counter("cadence-workflow-failed", 1);
                error!(
                    workflow_type = %workflow_type,
                    workflow_id = %workflow_execution.workflow_id,
                    error = %e,
                    "Workflow failed"
                );
                Err(e.into())
            }
        }
    }

    /// Typed form of [`CadenceWorker::execute_workflow`]
    pub async fn run_workflow<I, O>(&self, workflow_type: &str, input: &I) -> Result<O, WorkerError>
    where
        I: Serialize + ?Sized,
        O: DeserializeOwned,
    {
        let converter = Arc::clone(&self.options.data_converter);
        let args = encode_with(converter.as_ref(), input)?;
        let output = self.execute_workflow(workflow_type, Some(args), None).await?;
        Ok(decode_with(converter.as_ref(), &output)?)
    }
}

impl Worker for CadenceWorker {
    fn register_workflow_with_options(
        &self,
        workflow: WorkflowDefinition,
        options: WorkflowRegisterOptions,
    ) -> Result<(), WorkerError> {
        let name = self.registry.register_workflow(workflow, options)?;
        info!(workflow_type = %name, task_list = %self.task_list, "Registered workflow");
        Ok(())
    }

    fn register_activity_with_options(
        &self,
        activity: ActivityDefinition,
        options: ActivityRegisterOptions,
    ) -> Result<(), WorkerError> {
        let name = self.registry.register_activity(activity, options)?;
        info!(activity_type = %name, task_list = %self.task_list, "Registered activity");
        Ok(())
    }

    fn start(&self) -> Result<(), WorkerError> {
        if self.domain.is_empty() {
            return Err(WorkerError::InvalidConfiguration(
                "domain is empty".to_string(),
            ));
        }
        if self.task_list.is_empty() {
            return Err(WorkerError::InvalidConfiguration(
                "task list is empty".to_string(),
            ));
        }
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(WorkerError::AlreadyStarted);
        }

        let workflows = self.registry.get_registered_workflow_types();
        if workflows.is_empty() {
            info!("No workflows registered. Skipping workflow worker start");
        } else {
            info!(
                domain = %self.domain,
                task_list = %self.task_list,
                workflow_types = ?workflows,
                "Started Workflow Worker"
            );
        }

        let activities = self.registry.get_registered_activity_types();
        if activities.is_empty() {
            info!("No activities registered. Skipping activity worker start");
        } else {
            info!(
                domain = %self.domain,
                task_list = %self.task_list,
                activity_types = ?activities,
                "Started Activity Worker"
            );
        }

        self.options.metrics_scope.counter("cadence-worker-start", 1);
        Ok(())
    }

    fn stop(&self) {
        if self.started.swap(false, Ordering::SeqCst) {
            info!(domain = %self.domain, task_list = %self.task_list, "Stopped Worker");
        }
        self.shutdown.notify_waiters();
    }
}
