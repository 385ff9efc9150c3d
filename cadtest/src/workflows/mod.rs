//! Workflows of the sample.

use std::time::Duration;

use cadence_core::{function_name, ActivityOptions};
use cadence_workflow::{WorkflowContext, WorkflowError};
use tracing::info;

use crate::activities::simple_activity;
use crate::config::Config;

/// Runs [`simple_activity`] on the application's task list and logs its result.
///
/// Started with `(value, config)`; the config names the task list the
/// activity is scheduled on.
pub async fn simple_workflow(
    ctx: WorkflowContext,
    (value, config): (String, Config),
) -> Result<(), WorkflowError> {
    let ctx = ctx.with_activity_options(ActivityOptions {
        task_list: config.application_name,
        schedule_to_close_timeout: Duration::from_secs(60),
        schedule_to_start_timeout: Duration::from_secs(60),
        start_to_close_timeout: Duration::from_secs(60),
        heartbeat_timeout: Duration::from_secs(10),
        wait_for_cancellation: false,
    });

    let result: String = ctx
        .execute_activity(function_name(&simple_activity), &value)
        .await?;

    info!(result = %result, "Done");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use cadence_core::{
        default_data_converter, WorkflowExecution, WorkflowInfo, WorkflowType,
    };
    use cadence_workflow::{CommandSink, ScheduleActivityCommand};
    use futures::future::BoxFuture;
    use futures::FutureExt;

    use crate::config::get_config;

    #[derive(Default)]
    struct RecordingSink {
        commands: Mutex<Vec<ScheduleActivityCommand>>,
    }

    impl CommandSink for RecordingSink {
        fn schedule_activity(
            &self,
            command: ScheduleActivityCommand,
        ) -> BoxFuture<'static, Result<Vec<u8>, WorkflowError>> {
            self.commands.lock().unwrap().push(command);
            futures::future::ready(Ok(b"\"Processed activity: X\"".to_vec())).boxed()
        }
    }

    fn context(sink: Arc<RecordingSink>) -> WorkflowContext {
        let info = WorkflowInfo {
            workflow_execution: WorkflowExecution::new("test_task_1", "run-1"),
            workflow_type: WorkflowType {
                name: "hello_world".to_string(),
            },
            domain: "cadence-test".to_string(),
            task_list: "cadence-test".to_string(),
            start_time: chrono::Utc::now(),
            attempt: 1,
        };
        WorkflowContext::new(info, sink, default_data_converter())
    }

    #[tokio::test]
    async fn test_schedules_simple_activity_with_options() {
        let sink = Arc::new(RecordingSink::default());
        simple_workflow(context(Arc::clone(&sink)), ("X".to_string(), get_config()))
            .await
            .unwrap();

        let commands = sink.commands.lock().unwrap();
        assert_eq!(commands.len(), 1);
        let command = &commands[0];
        assert_eq!(command.activity_type, function_name(&simple_activity));
        assert_eq!(command.args.as_deref(), Some(&b"\"X\""[..]));
        assert_eq!(
            command.options,
            ActivityOptions {
                task_list: "cadence-test".to_string(),
                schedule_to_close_timeout: Duration::from_secs(60),
                schedule_to_start_timeout: Duration::from_secs(60),
                start_to_close_timeout: Duration::from_secs(60),
                heartbeat_timeout: Duration::from_secs(10),
                wait_for_cancellation: false,
            }
        );
    }

    struct FailingSink;

    impl CommandSink for FailingSink {
        fn schedule_activity(
            &self,
            _command: ScheduleActivityCommand,
        ) -> BoxFuture<'static, Result<Vec<u8>, WorkflowError>> {
            futures::future::ready(Err(WorkflowError::ActivityFailed("boom".to_string()))).boxed()
        }
    }

    #[tokio::test]
    async fn test_activity_error_is_returned() {
        let info = WorkflowInfo {
            workflow_execution: WorkflowExecution::new("test_task_2", "run-2"),
            workflow_type: WorkflowType {
                name: "hello_world".to_string(),
            },
            domain: "cadence-test".to_string(),
            task_list: "cadence-test".to_string(),
            start_time: chrono::Utc::now(),
            attempt: 1,
        };
        let ctx = WorkflowContext::new(info, Arc::new(FailingSink), default_data_converter());

        let err = simple_workflow(ctx, ("X".to_string(), get_config()))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::ActivityFailed(msg) if msg == "boom"));
    }
}
