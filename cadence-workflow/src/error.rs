use std::time::Duration;

use cadence_core::EncodingError;

/// Workflow error
#[derive(Debug, Clone, thiserror::Error)]
pub enum WorkflowError {
    #[error("Activity failed: {0}")]
    ActivityFailed(String),
    #[error("Activity {activity_type} timed out after {timeout:?}")]
    ActivityTimedOut {
        activity_type: String,
        timeout: Duration,
    },
    #[error("Activity '{0}' not registered")]
    ActivityNotRegistered(String),
    #[error("Invalid activity options: {0}")]
    InvalidActivityOptions(String),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error("Workflow cancelled")]
    Cancelled,
}
