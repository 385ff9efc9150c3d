//! Activity context and functions for authoring activities.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use cadence_core::{EncodingError, MetricsScope, NoopMetricsScope, WorkflowExecution};
use tracing::debug;

/// Activity information
#[derive(Debug, Clone)]
pub struct ActivityInfo {
    pub activity_id: String,
    pub activity_type: String,
    pub task_list: String,
    pub workflow_execution: WorkflowExecution,
    pub workflow_domain: String,
    pub attempt: i32,
    pub scheduled_time: chrono::DateTime<chrono::Utc>,
    pub started_time: chrono::DateTime<chrono::Utc>,
    pub deadline: Option<Instant>,
    pub heartbeat_timeout: Duration,
}

/// Activity error
#[derive(Debug, Clone, thiserror::Error)]
pub enum ActivityError {
    #[error("Application error: {0}")]
    Application(String),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

impl ActivityError {
    pub fn application(msg: impl Into<String>) -> Self {
        Self::Application(msg.into())
    }
}

/// Activity context for executing activity logic
#[derive(Clone)]
pub struct ActivityContext {
    activity_info: ActivityInfo,
    heartbeats: Arc<Mutex<Vec<Option<Vec<u8>>>>>,
    metrics_scope: Arc<dyn MetricsScope>,
}

impl ActivityContext {
    pub fn new(activity_info: ActivityInfo) -> Self {
        Self {
            activity_info,
            heartbeats: Arc::new(Mutex::new(Vec::new())),
            metrics_scope: Arc::new(NoopMetricsScope),
        }
    }

    pub fn with_metrics_scope(mut self, metrics_scope: Arc<dyn MetricsScope>) -> Self {
        self.metrics_scope = metrics_scope;
        self
    }

    /// Get activity information
    pub fn get_info(&self) -> &ActivityInfo {
        &self.activity_info
    }

    /// Record a heartbeat with optional details
    pub fn record_heartbeat(&self, details: Option<&[u8]>) {
        debug!(activity_id = %self.activity_info.activity_id, "Recording heartbeat");
        if let Ok(mut heartbeats) = self.heartbeats.lock() {
            heartbeats.push(details.map(<[u8]>::to_vec));
        }
    }

    /// Details of the most recent heartbeat, if any carried details
    pub fn get_heartbeat_details(&self) -> Option<Vec<u8>> {
        self.heartbeats
            .lock()
            .ok()
            .and_then(|heartbeats| heartbeats.last().cloned().flatten())
    }

    /// Get the deadline for activity completion
    pub fn get_deadline(&self) -> Option<Instant> {
        self.activity_info.deadline
    }

    /// Get the remaining time before deadline
    pub fn get_remaining_time(&self) -> Option<Duration> {
        self.activity_info
            .deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    pub fn get_metrics_scope(&self) -> Arc<dyn MetricsScope> {
        Arc::clone(&self.metrics_scope)
    }
}
