//! Protobuf messages for the `uber.cadence.api.v1` calls made by this client.
//!
//! Only the messages needed for the RPCs in [`crate::grpc`] are defined.
//! Field tags follow the published Cadence IDL.

use std::collections::HashMap;
use std::time::Duration;

use cadence_core::{Header as CoreHeader, WorkflowIdReusePolicy};

use crate::service;

pub const START_WORKFLOW_EXECUTION_PATH: &str =
    "/uber.cadence.api.v1.WorkflowAPI/StartWorkflowExecution";

/// `TaskListKind.TASK_LIST_KIND_NORMAL`
const TASK_LIST_KIND_NORMAL: i32 = 1;

#[derive(Clone, PartialEq, prost::Message)]
pub struct Payload {
    #[prost(bytes = "vec", tag = "1")]
    pub data: Vec<u8>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct WorkflowType {
    #[prost(string, tag = "1")]
    pub name: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct TaskList {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(int32, tag = "2")]
    pub kind: i32,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Header {
    #[prost(map = "string, message", tag = "1")]
    pub fields: HashMap<String, Payload>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct StartWorkflowExecutionRequest {
    #[prost(string, tag = "1")]
    pub domain: String,
    #[prost(string, tag = "2")]
    pub workflow_id: String,
    #[prost(message, optional, tag = "3")]
    pub workflow_type: Option<WorkflowType>,
    #[prost(message, optional, tag = "4")]
    pub task_list: Option<TaskList>,
    #[prost(message, optional, tag = "5")]
    pub input: Option<Payload>,
    #[prost(message, optional, tag = "6")]
    pub execution_start_to_close_timeout: Option<prost_types::Duration>,
    #[prost(message, optional, tag = "7")]
    pub task_start_to_close_timeout: Option<prost_types::Duration>,
    #[prost(string, tag = "8")]
    pub identity: String,
    #[prost(string, tag = "9")]
    pub request_id: String,
    #[prost(int32, tag = "10")]
    pub workflow_id_reuse_policy: i32,
    #[prost(string, tag = "12")]
    pub cron_schedule: String,
    #[prost(message, optional, tag = "15")]
    pub header: Option<Header>,
    #[prost(message, optional, tag = "16")]
    pub delay_start: Option<prost_types::Duration>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct StartWorkflowExecutionResponse {
    #[prost(string, tag = "1")]
    pub run_id: String,
}

fn to_proto_duration(duration: Duration) -> prost_types::Duration {
    prost_types::Duration {
        seconds: i64::try_from(duration.as_secs()).unwrap_or(i64::MAX),
        nanos: duration.subsec_nanos() as i32,
    }
}

/// The IDL enum reserves 0 for `INVALID`, so every policy is shifted by one.
fn to_proto_reuse_policy(policy: WorkflowIdReusePolicy) -> i32 {
    policy as i32 + 1
}

impl From<CoreHeader> for Header {
    fn from(header: CoreHeader) -> Self {
        Self {
            fields: header
                .fields
                .into_iter()
                .map(|(key, data)| (key, Payload { data }))
                .collect(),
        }
    }
}

impl From<service::StartWorkflowExecutionRequest> for StartWorkflowExecutionRequest {
    fn from(request: service::StartWorkflowExecutionRequest) -> Self {
        Self {
            domain: request.domain,
            workflow_id: request.workflow_id,
            workflow_type: Some(WorkflowType {
                name: request.workflow_type,
            }),
            task_list: Some(TaskList {
                name: request.task_list,
                kind: TASK_LIST_KIND_NORMAL,
            }),
            input: request.input.map(|data| Payload { data }),
            execution_start_to_close_timeout: request
                .execution_start_to_close_timeout
                .map(to_proto_duration),
            task_start_to_close_timeout: request.task_start_to_close_timeout.map(to_proto_duration),
            identity: request.identity,
            request_id: request.request_id,
            workflow_id_reuse_policy: to_proto_reuse_policy(request.workflow_id_reuse_policy),
            cron_schedule: request.cron_schedule.unwrap_or_default(),
            header: request.header.map(Header::from),
            delay_start: request.delay_start.map(to_proto_duration),
        }
    }
}

impl From<StartWorkflowExecutionResponse> for service::StartWorkflowExecutionResponse {
    fn from(response: StartWorkflowExecutionResponse) -> Self {
        Self {
            run_id: response.run_id,
        }
    }
}
