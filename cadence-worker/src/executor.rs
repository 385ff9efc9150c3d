//! In-process execution of workflow commands.
//!
//! When a workflow running on the worker schedules an activity, the command
//! lands here. The activity is looked up in the worker's registry and run on
//! the current runtime under its start-to-close (or schedule-to-close)
//! timeout.

use std::sync::Arc;
use std::time::Instant;

use cadence_activity::{ActivityContext, ActivityInfo};
use cadence_core::{DataConverter, MetricsScope, WorkflowExecution};
use cadence_workflow::{CommandSink, ScheduleActivityCommand, WorkflowError};
use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::Semaphore;
use tracing::{debug, warn, Instrument};

use crate::registry::Registry;

/// Runs scheduled activities from a registry for a single workflow execution
pub(crate) struct LocalActivityExecutor {
    pub(crate) registry: Arc<dyn Registry>,
    pub(crate) data_converter: Arc<dyn DataConverter>,
    pub(crate) metrics_scope: Arc<dyn MetricsScope>,
    pub(crate) activity_slots: Arc<Semaphore>,
    pub(crate) domain: String,
    pub(crate) workflow_execution: WorkflowExecution,
}

impl CommandSink for LocalActivityExecutor {
    fn schedule_activity(
        &self,
        command: ScheduleActivityCommand,
    ) -> BoxFuture<'static, Result<Vec<u8>, WorkflowError>> {
        let registry = Arc::clone(&self.registry);
        let data_converter = Arc::clone(&self.data_converter);
        let metrics_scope = Arc::clone(&self.metrics_scope);
        let activity_slots = Arc::clone(&self.activity_slots);
        let domain = self.domain.clone();
        let workflow_execution = self.workflow_execution.clone();

        async move {
            let activity = registry.get_activity(&command.activity_type).ok_or_else(|| {
                WorkflowError::ActivityNotRegistered(command.activity_type.clone())
            })?;
            let timeout = command.options.execution_timeout().ok_or_else(|| {
                WorkflowError::InvalidActivityOptions(
                    "either StartToCloseTimeout or ScheduleToCloseTimeout is required".to_string(),
                )
            })?;

            let scheduled_time = chrono::Utc::now();
            let _permit = activity_slots
                .acquire_owned()
                .await
                .map_err(|_| WorkflowError::Cancelled)?;

            let info = ActivityInfo {
                activity_id: command.activity_id.clone(),
                activity_type: command.activity_type.clone(),
                task_list: command.options.task_list.clone(),
                workflow_execution,
                workflow_domain: domain,
                attempt: 1,
                scheduled_time,
                started_time: chrono::Utc::now(),
                deadline: Some(Instant::now() + timeout),
                heartbeat_timeout: command.options.heartbeat_timeout,
            };
            let ctx = ActivityContext::new(info).with_metrics_scope(Arc::clone(&metrics_scope));
            let span = tracing::info_span!(
                "activity",
                activity_type = %command.activity_type,
                activity_id = %command.activity_id,
            );

            debug!(activity_type = %command.activity_type, ?timeout, "Executing activity");
            let started = Instant::now();
            let execution = activity
                .execute(ctx, command.args, data_converter)
                .instrument(span);
            let result = match tokio::time::timeout(timeout, execution).await {
                Ok(Ok(output)) => {
                    metrics_scope.counter("cadence-activity-task-completed", 1);
                    Ok(output)
                }
                Ok(Err(e)) => {
                    warn!(activity_type = %command.activity_type, error = %e, "Activity failed");
                    metrics_scope.counter("cadence-activity-task-failed", 1);
                    Err(WorkflowError::ActivityFailed(e.to_string()))
                }
                Err(_) => {
                    warn!(activity_type = %command.activity_type, ?timeout, "Activity timed out");
                    metrics_scope.counter("cadence-activity-task-timeout", 1);
                    Err(WorkflowError::ActivityTimedOut {
                        activity_type: command.activity_type.clone(),
                        timeout,
                    })
                }
            };
            metrics_scope.timer("cadence-activity-execution-latency", started.elapsed());
            result
        }
        .boxed()
    }
}
