//! Workflow service seam.
//!
//! [`WorkflowService`] is the raw frontend API as seen by the client and the
//! worker. The gRPC implementation lives in [`crate::grpc`]; tests substitute
//! their own.

use std::time::Duration;

use async_trait::async_trait;
use cadence_core::{CadenceResult, Header, WorkflowIdReusePolicy};

/// Request to start a new workflow execution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StartWorkflowExecutionRequest {
    pub domain: String,
    pub workflow_id: String,
    pub workflow_type: String,
    pub task_list: String,
    pub input: Option<Vec<u8>>,
    pub execution_start_to_close_timeout: Option<Duration>,
    pub task_start_to_close_timeout: Option<Duration>,
    pub identity: String,
    pub request_id: String,
    pub workflow_id_reuse_policy: WorkflowIdReusePolicy,
    pub cron_schedule: Option<String>,
    pub header: Option<Header>,
    pub delay_start: Option<Duration>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartWorkflowExecutionResponse {
    pub run_id: String,
}

/// Frontend operations used by this client
#[async_trait]
pub trait WorkflowService: Send + Sync {
    async fn start_workflow_execution(
        &self,
        request: StartWorkflowExecutionRequest,
    ) -> CadenceResult<StartWorkflowExecutionResponse>;
}
