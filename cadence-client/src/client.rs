//! Workflow client.
//!
//! [`WorkflowClient`] turns [`StartWorkflowOptions`] into a frontend request:
//! it validates the options, fills in defaults the server requires, runs the
//! configured context propagators, and reports the new execution.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use cadence_core::{
    CadenceError, CadenceResult, DataConverter, Header, ServerError, WorkflowExecution,
    WorkflowIdReusePolicy,
};
use tracing::{debug, Instrument};
use uuid::Uuid;

use crate::options::ClientOptions;
use crate::service::{StartWorkflowExecutionRequest, WorkflowService};

/// Decision task timeout used when the caller does not set one
pub const DEFAULT_DECISION_TASK_START_TO_CLOSE_TIMEOUT: Duration = Duration::from_secs(10);

/// Client trait for workflow operations
#[async_trait]
pub trait Client: Send + Sync {
    /// Start a workflow execution
    async fn start_workflow(
        &self,
        options: StartWorkflowOptions,
        workflow_type: &str,
        args: Option<&[u8]>,
    ) -> CadenceResult<WorkflowExecution>;

    /// Converter used to encode workflow arguments for this client
    fn data_converter(&self) -> Arc<dyn DataConverter>;
}

/// Options for starting a workflow
#[derive(Debug, Clone, Default)]
pub struct StartWorkflowOptions {
    /// Workflow ID; a random one is generated when empty
    pub id: String,
    pub task_list: String,
    pub execution_start_to_close_timeout: Option<Duration>,
    pub decision_task_start_to_close_timeout: Option<Duration>,
    pub workflow_id_reuse_policy: WorkflowIdReusePolicy,
    pub cron_schedule: Option<String>,
    pub delay_start: Option<Duration>,
}

/// Workflow client backed by a [`WorkflowService`]
#[derive(Clone)]
pub struct WorkflowClient {
    service: Arc<dyn WorkflowService>,
    domain: String,
    options: ClientOptions,
}

impl WorkflowClient {
    pub fn new(
        service: Arc<dyn WorkflowService>,
        domain: impl Into<String>,
        options: ClientOptions,
    ) -> Self {
        Self {
            service,
            domain: domain.into(),
            options,
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    fn build_start_request(
        &self,
        options: StartWorkflowOptions,
        workflow_type: &str,
        args: Option<&[u8]>,
    ) -> CadenceResult<StartWorkflowExecutionRequest> {
        if workflow_type.is_empty() {
            return Err(CadenceError::InvalidArgument(
                "workflow type is empty".to_string(),
            ));
        }
        if options.task_list.is_empty() {
            return Err(CadenceError::InvalidArgument("task list is empty".to_string()));
        }
        let execution_timeout = options
            .execution_start_to_close_timeout
            .filter(|t| !t.is_zero())
            .ok_or_else(|| {
                CadenceError::InvalidArgument(
                    "missing or zero ExecutionStartToCloseTimeout".to_string(),
                )
            })?;

        let workflow_id = if options.id.is_empty() {
            Uuid::new_v4().to_string()
        } else {
            options.id
        };

        let header = if self.options.context_propagators.is_empty() {
            None
        } else {
            let mut header = Header::default();
            for propagator in &self.options.context_propagators {
                propagator.inject(&mut header);
            }
            Some(header)
        };

        Ok(StartWorkflowExecutionRequest {
            domain: self.domain.clone(),
            workflow_id,
            workflow_type: workflow_type.to_string(),
            task_list: options.task_list,
            input: args.map(<[u8]>::to_vec),
            execution_start_to_close_timeout: Some(execution_timeout),
            task_start_to_close_timeout: Some(
                options
                    .decision_task_start_to_close_timeout
                    .unwrap_or(DEFAULT_DECISION_TASK_START_TO_CLOSE_TIMEOUT),
            ),
            identity: self.options.identity.clone(),
            request_id: Uuid::new_v4().to_string(),
            workflow_id_reuse_policy: options.workflow_id_reuse_policy,
            cron_schedule: options.cron_schedule,
            header,
            delay_start: options.delay_start,
        })
    }

    /// Without the feature flag, an already-completed execution is reported
    /// the way older servers did: as a missing entity.
    fn map_error(&self, err: CadenceError) -> CadenceError {
        match err {
            CadenceError::Server(ServerError::WorkflowExecutionAlreadyCompleted { message })
                if !self
                    .options
                    .feature_flags
                    .workflow_execution_already_completed_error_enabled =>
            {
                ServerError::EntityNotExists { message }.into()
            }
            other => other,
        }
    }
}

#[async_trait]
impl Client for WorkflowClient {
    async fn start_workflow(
        &self,
        options: StartWorkflowOptions,
        workflow_type: &str,
        args: Option<&[u8]>,
    ) -> CadenceResult<WorkflowExecution> {
        let request = self.build_start_request(options, workflow_type, args)?;
        let workflow_id = request.workflow_id.clone();
        let span = match &self.options.tracer {
            Some(tracer) => tracer.start_span("StartWorkflowExecution"),
            None => tracing::Span::none(),
        };

        debug!(
            domain = %self.domain,
            workflow_id = %workflow_id,
            workflow_type = %workflow_type,
            "Starting workflow execution"
        );

        let started = Instant::now();
        let result = self
            .service
            .start_workflow_execution(request)
            .instrument(span)
            .await;
        self.options
            .metrics_scope
            .timer("cadence-start-workflow-latency", started.elapsed());

        match result {
            Ok(response) => {
                self.options.metrics_scope.counter("cadence-start-workflow", 1);
                Ok(WorkflowExecution::new(workflow_id, response.run_id))
            }
            Err(err) => {
                self.options
                    .metrics_scope
                    .counter("cadence-start-workflow-failed", 1);
                Err(self.map_error(err))
            }
        }
    }

    fn data_converter(&self) -> Arc<dyn DataConverter> {
        Arc::clone(&self.options.data_converter)
    }
}
