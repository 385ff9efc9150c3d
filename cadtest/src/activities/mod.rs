//! Activities of the sample.

use cadence_activity::{ActivityContext, ActivityError};
use tracing::info;

/// Logs the value it was given and echoes it back with a prefix
pub async fn simple_activity(
    _ctx: ActivityContext,
    value: String,
) -> Result<String, ActivityError> {
    info!(Value = %value, "SimpleActivity called.");
    Ok(format!("Processed activity: {value}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_activity::ActivityInfo;
    use cadence_core::WorkflowExecution;
    use std::time::Duration;

    #[tokio::test]
    async fn test_simple_activity_output() {
        let ctx = ActivityContext::new(ActivityInfo {
            activity_id: "0".to_string(),
            activity_type: "simple_activity".to_string(),
            task_list: "cadence-test".to_string(),
            workflow_execution: WorkflowExecution::new("wf", "run"),
            workflow_domain: "cadence-test".to_string(),
            attempt: 1,
            scheduled_time: chrono::Utc::now(),
            started_time: chrono::Utc::now(),
            deadline: None,
            heartbeat_timeout: Duration::from_secs(10),
        });

        let output = simple_activity(ctx.clone(), "X".to_string()).await.unwrap();
        assert_eq!(output, "Processed activity: X");

        let output = simple_activity(ctx, String::new()).await.unwrap();
        assert_eq!(output, "Processed activity: ");
    }
}
