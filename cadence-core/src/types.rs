//! Core types for Cadence client.
//!
//! This module defines the main types used throughout the client for
//! workflow execution, task management, and configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Workflow ID reuse policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[repr(i32)]
pub enum WorkflowIdReusePolicy {
    /// Allow starting a workflow execution when the last execution close state
    /// is in [terminated, cancelled, timeout, failed]
    #[default]
    AllowDuplicateFailedOnly = 0,
    /// Allow starting a workflow execution using the same workflow ID when workflow is not running
    AllowDuplicate = 1,
    /// Do not allow starting a workflow execution using the same workflow ID at all
    RejectDuplicate = 2,
    /// Terminate current running workflow using the same workflow ID if exists,
    /// then start a new run in one transaction
    TerminateIfRunning = 3,
}

/// Activity options for scheduling activities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ActivityOptions {
    /// Task list to schedule activity on
    pub task_list: String,
    /// Schedule to close timeout
    pub schedule_to_close_timeout: Duration,
    /// Schedule to start timeout
    pub schedule_to_start_timeout: Duration,
    /// Start to close timeout
    pub start_to_close_timeout: Duration,
    /// Heartbeat timeout
    pub heartbeat_timeout: Duration,
    /// Wait for cancellation before completing
    pub wait_for_cancellation: bool,
}

impl ActivityOptions {
    /// The timeout an activity attempt runs under: start-to-close, falling
    /// back to schedule-to-close. `None` when neither is set.
    pub fn execution_timeout(&self) -> Option<Duration> {
        [self.start_to_close_timeout, self.schedule_to_close_timeout]
            .into_iter()
            .find(|t| !t.is_zero())
    }
}

/// Workflow execution identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkflowExecution {
    pub workflow_id: String,
    pub run_id: String,
}

impl WorkflowExecution {
    pub fn new(workflow_id: impl Into<String>, run_id: impl Into<String>) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            run_id: run_id.into(),
        }
    }
}

/// Workflow type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowType {
    pub name: String,
}

/// Workflow information available in workflow context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowInfo {
    pub workflow_execution: WorkflowExecution,
    pub workflow_type: WorkflowType,
    pub domain: String,
    pub task_list: String,
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub attempt: i32,
}

/// Header for passing context information
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Header {
    pub fields: HashMap<String, Vec<u8>>,
}

/// Feature flags for client behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeatureFlags {
    /// Surface `WorkflowExecutionAlreadyCompletedError` instead of folding it
    /// into `EntityNotExistsError`
    pub workflow_execution_already_completed_error_enabled: bool,
}

/// Name a function is registered under when no alias is given.
///
/// For a plain `fn` item this is its full path, e.g.
/// `my_app::activities::simple_activity`.
pub fn function_name<F>(_function: &F) -> &'static str {
    std::any::type_name::<F>()
}
