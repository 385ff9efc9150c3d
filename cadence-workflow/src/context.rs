//! Workflow context and core functions for authoring workflows.
//!
//! A [`WorkflowContext`] is cheap to clone. Options such as activity
//! options are applied by deriving a new context, mirroring how workflow
//! code scopes them:
//!
//! ```ignore
//! let ctx = ctx.with_activity_options(options);
//! let result: String = ctx.execute_activity("simple_activity", &value).await?;
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use cadence_core::{decode_with, encode_with, ActivityOptions, DataConverter, WorkflowInfo};
use futures::future::BoxFuture;
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::error::WorkflowError;

/// A request to run an activity on behalf of a workflow
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleActivityCommand {
    pub activity_id: String,
    pub activity_type: String,
    pub args: Option<Vec<u8>>,
    pub options: ActivityOptions,
}

/// Trait for handling workflow commands (implemented by worker)
pub trait CommandSink: Send + Sync {
    fn schedule_activity(
        &self,
        command: ScheduleActivityCommand,
    ) -> BoxFuture<'static, Result<Vec<u8>, WorkflowError>>;
}

/// Workflow context for executing workflow logic
#[derive(Clone)]
pub struct WorkflowContext {
    workflow_info: Arc<WorkflowInfo>,
    command_sink: Arc<dyn CommandSink>,
    data_converter: Arc<dyn DataConverter>,
    activity_options: Option<ActivityOptions>,
    propagated: Arc<HashMap<String, Vec<u8>>>,
    sequence: Arc<AtomicU64>,
}

impl WorkflowContext {
    pub fn new(
        workflow_info: WorkflowInfo,
        command_sink: Arc<dyn CommandSink>,
        data_converter: Arc<dyn DataConverter>,
    ) -> Self {
        Self {
            workflow_info: Arc::new(workflow_info),
            command_sink,
            data_converter,
            activity_options: None,
            propagated: Arc::new(HashMap::new()),
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Attach values extracted by context propagators
    pub fn with_propagated_values(mut self, values: HashMap<String, Vec<u8>>) -> Self {
        self.propagated = Arc::new(values);
        self
    }

    /// Derive a context whose activities are scheduled with `options`
    pub fn with_activity_options(&self, options: ActivityOptions) -> Self {
        let mut ctx = self.clone();
        ctx.activity_options = Some(options);
        ctx
    }

    pub fn activity_options(&self) -> Option<&ActivityOptions> {
        self.activity_options.as_ref()
    }

    /// Get workflow information
    pub fn workflow_info(&self) -> &WorkflowInfo {
        &self.workflow_info
    }

    pub fn data_converter(&self) -> Arc<dyn DataConverter> {
        Arc::clone(&self.data_converter)
    }

    /// A value carried in from the starter through a context propagator
    pub fn propagated_value(&self, key: &str) -> Option<&[u8]> {
        self.propagated.get(key).map(Vec::as_slice)
    }

    fn next_id(&self) -> String {
        self.sequence.fetch_add(1, Ordering::SeqCst).to_string()
    }

    /// Execute an activity by its registered name and wait for its result
    pub async fn execute_activity<I, O>(
        &self,
        activity_type: &str,
        input: &I,
    ) -> Result<O, WorkflowError>
    where
        I: Serialize + ?Sized,
        O: DeserializeOwned,
    {
        let options = self.activity_options.clone().ok_or_else(|| {
            WorkflowError::InvalidActivityOptions(
                "no activity options set on the workflow context".to_string(),
            )
        })?;
        if options.task_list.is_empty() {
            return Err(WorkflowError::InvalidActivityOptions(
                "task list is empty".to_string(),
            ));
        }
        if options.execution_timeout().is_none() {
            return Err(WorkflowError::InvalidActivityOptions(
                "either StartToCloseTimeout or ScheduleToCloseTimeout is required".to_string(),
            ));
        }

        let args = encode_with(self.data_converter.as_ref(), input)?;
        let command = ScheduleActivityCommand {
            activity_id: self.next_id(),
            activity_type: activity_type.to_string(),
            args: Some(args),
            options,
        };
        debug!(
            workflow_id = %self.workflow_info.workflow_execution.workflow_id,
            activity_id = %command.activity_id,
            activity_type = %activity_type,
            "Scheduling activity"
        );

        let result = self.command_sink.schedule_activity(command).await?;
        Ok(decode_with(self.data_converter.as_ref(), &result)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::{JsonDataConverter, WorkflowExecution, WorkflowType};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Echoes the scheduled arguments back as the result
    #[derive(Default)]
    struct EchoSink {
        commands: Mutex<Vec<ScheduleActivityCommand>>,
    }

    impl CommandSink for EchoSink {
        fn schedule_activity(
            &self,
            command: ScheduleActivityCommand,
        ) -> BoxFuture<'static, Result<Vec<u8>, WorkflowError>> {
            let args = command.args.clone().unwrap_or_default();
            self.commands.lock().unwrap().push(command);
            Box::pin(async move { Ok(args) })
        }
    }

    fn context(sink: Arc<EchoSink>) -> WorkflowContext {
        let info = WorkflowInfo {
            workflow_execution: WorkflowExecution::new("wf", "run"),
            workflow_type: WorkflowType {
                name: "hello_world".to_string(),
            },
            domain: "cadence-test".to_string(),
            task_list: "cadence-test".to_string(),
            start_time: chrono::Utc::now(),
            attempt: 1,
        };
        WorkflowContext::new(info, sink, Arc::new(JsonDataConverter::new()))
    }

    fn options() -> ActivityOptions {
        ActivityOptions {
            task_list: "cadence-test".to_string(),
            start_to_close_timeout: Duration::from_secs(60),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_execute_activity_requires_options() {
        let sink = Arc::new(EchoSink::default());
        let ctx = context(sink.clone());

        let result: Result<String, _> = ctx.execute_activity("echo", "hi").await;
        assert!(matches!(
            result,
            Err(WorkflowError::InvalidActivityOptions(_))
        ));

        let no_timeout = ctx.with_activity_options(ActivityOptions {
            task_list: "cadence-test".to_string(),
            ..Default::default()
        });
        let result: Result<String, _> = no_timeout.execute_activity("echo", "hi").await;
        assert!(result.is_err());
        assert!(sink.commands.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_execute_activity_schedules_command() {
        let sink = Arc::new(EchoSink::default());
        let ctx = context(sink.clone()).with_activity_options(options());

        let first: String = ctx.execute_activity("echo", "hi").await.unwrap();
        let second: String = ctx.execute_activity("echo", "again").await.unwrap();
        assert_eq!((first.as_str(), second.as_str()), ("hi", "again"));

        let commands = sink.commands.lock().unwrap();
        assert_eq!(commands[0].activity_id, "0");
        assert_eq!(commands[1].activity_id, "1");
        assert_eq!(commands[0].activity_type, "echo");
        assert_eq!(commands[0].options, options());
    }

    #[test]
    fn test_derived_context_keeps_parent_untouched() {
        let parent = context(Arc::new(EchoSink::default()));
        let child = parent.with_activity_options(options());
        assert!(parent.activity_options().is_none());
        assert_eq!(child.activity_options(), Some(&options()));

        let mut values = HashMap::new();
        values.insert("tenant".to_string(), b"acme".to_vec());
        let ctx = parent.with_propagated_values(values);
        assert_eq!(ctx.propagated_value("tenant"), Some(&b"acme"[..]));
        assert!(ctx.propagated_value("missing").is_none());
    }
}
