//! Bootstrap helper and end-to-end sample tests.

use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use cadence_client::{
    ClientOptions, StartWorkflowExecutionRequest, StartWorkflowExecutionResponse,
    StartWorkflowOptions, WorkflowClient, WorkflowService,
};
use cadence_core::{function_name, CadenceError, CadenceResult};
use cadence_worker::{
    ActivityDefinition, ActivityRegisterOptions, CadenceWorker, Worker, WorkerError,
    WorkerOptions, WorkflowDefinition, WorkflowRegisterOptions,
};
use cadtest::activities::simple_activity;
use cadtest::workflows::simple_workflow;
use cadtest::{get_config, BootstrapError, Configuration, Helper};

/// Records the names registrations arrive under
#[derive(Default)]
struct RecordingWorker {
    workflows: Mutex<Vec<String>>,
    activities: Mutex<Vec<String>>,
    starts: Mutex<usize>,
}

impl Worker for RecordingWorker {
    fn register_workflow_with_options(
        &self,
        workflow: WorkflowDefinition,
        options: WorkflowRegisterOptions,
    ) -> Result<(), WorkerError> {
        let name = options.name.unwrap_or_else(|| workflow.name().to_string());
        self.workflows.lock().unwrap().push(name);
        Ok(())
    }

    fn register_activity_with_options(
        &self,
        activity: ActivityDefinition,
        options: ActivityRegisterOptions,
    ) -> Result<(), WorkerError> {
        let name = options.name.unwrap_or_else(|| activity.name().to_string());
        self.activities.lock().unwrap().push(name);
        Ok(())
    }

    fn start(&self) -> Result<(), WorkerError> {
        *self.starts.lock().unwrap() += 1;
        Ok(())
    }

    fn stop(&self) {}
}

#[derive(Default)]
struct RecordingService {
    requests: Mutex<Vec<StartWorkflowExecutionRequest>>,
}

#[async_trait]
impl WorkflowService for RecordingService {
    async fn start_workflow_execution(
        &self,
        request: StartWorkflowExecutionRequest,
    ) -> CadenceResult<StartWorkflowExecutionResponse> {
        self.requests.lock().unwrap().push(request);
        Ok(StartWorkflowExecutionResponse {
            run_id: "run-1".to_string(),
        })
    }
}

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn configuration() -> Configuration {
    let config = get_config();
    Configuration {
        domain_name: config.domain,
        service_name: config.cadence_frontend_service,
        host_name_and_port: config.host_port,
    }
}

#[test]
fn test_alias_and_default_name_forwarding() {
    let mut helper = Helper::new();
    helper.register_workflow_with_alias(WorkflowDefinition::new(simple_workflow), "hello_world");
    helper.register_workflow(WorkflowDefinition::new(simple_workflow));
    helper.register_activity(ActivityDefinition::new(simple_activity));
    helper.register_activity_with_alias(ActivityDefinition::new(simple_activity), "");

    let worker = RecordingWorker::default();
    helper.register_workflow_and_activity(&worker).unwrap();

    let default_workflow = function_name(&simple_workflow).to_string();
    let default_activity = function_name(&simple_activity).to_string();
    assert_eq!(
        *worker.workflows.lock().unwrap(),
        vec!["hello_world".to_string(), default_workflow]
    );
    assert_eq!(
        *worker.activities.lock().unwrap(),
        vec![default_activity.clone(), default_activity]
    );

    // Registrations are forwarded once.
    let second = RecordingWorker::default();
    helper.register_workflow_and_activity(&second).unwrap();
    assert!(second.workflows.lock().unwrap().is_empty());
    assert!(second.activities.lock().unwrap().is_empty());
    assert_eq!(*second.starts.lock().unwrap(), 0);
}

/// Refuses one registration name
struct RejectingWorker {
    rejected: String,
}

impl Worker for RejectingWorker {
    fn register_workflow_with_options(
        &self,
        workflow: WorkflowDefinition,
        options: WorkflowRegisterOptions,
    ) -> Result<(), WorkerError> {
        let name = options.name.unwrap_or_else(|| workflow.name().to_string());
        if name == self.rejected {
            return Err(WorkerError::InvalidConfiguration(format!("rejected {name}")));
        }
        Ok(())
    }

    fn register_activity_with_options(
        &self,
        _activity: ActivityDefinition,
        _options: ActivityRegisterOptions,
    ) -> Result<(), WorkerError> {
        Ok(())
    }

    fn start(&self) -> Result<(), WorkerError> {
        Ok(())
    }

    fn stop(&self) {}
}

#[test]
fn test_failed_forwarding_keeps_queue() {
    let mut helper = Helper::new();
    helper.register_workflow_with_alias(WorkflowDefinition::new(simple_workflow), "first");
    helper.register_workflow_with_alias(WorkflowDefinition::new(simple_workflow), "second");
    helper.register_activity(ActivityDefinition::new(simple_activity));

    let rejecting = RejectingWorker {
        rejected: "first".to_string(),
    };
    assert!(helper.register_workflow_and_activity(&rejecting).is_err());

    let worker = RecordingWorker::default();
    helper.register_workflow_and_activity(&worker).unwrap();
    assert_eq!(
        *worker.workflows.lock().unwrap(),
        vec!["first".to_string(), "second".to_string()]
    );
    assert_eq!(
        *worker.activities.lock().unwrap(),
        vec![function_name(&simple_activity).to_string()]
    );
}

#[test]
fn test_setup_outside_runtime_is_an_error() {
    let config = get_config();
    let mut helper = Helper::new();
    let err = helper.setup(configuration(), &config).unwrap_err();
    assert!(matches!(
        err,
        BootstrapError::Client(CadenceError::Transport(_))
    ));
    assert!(helper.service.is_none());
    assert!(helper.client.is_none());
}

#[test]
fn test_standalone_worker_outside_runtime_is_an_error() {
    let err = cadtest::standalone::start_worker(&get_config()).unwrap_err();
    assert!(matches!(
        err,
        BootstrapError::Client(CadenceError::Transport(_))
    ));
}

#[tokio::test]
async fn test_setup_and_start_workers() {
    let config = get_config();
    let mut helper = Helper::new();
    helper.setup(configuration(), &config).unwrap();
    assert!(helper.service.is_some());
    assert!(helper.client.is_some());
    assert_eq!(helper.client.as_ref().unwrap().domain(), "cadence-test");

    // Already set up: nothing is rebuilt.
    helper.setup(Configuration::default(), &config).unwrap();
    assert_eq!(helper.config, Some(configuration()));

    helper.register_workflow_with_alias(WorkflowDefinition::new(simple_workflow), "hello_world");
    helper.register_activity(ActivityDefinition::new(simple_activity));
    let worker = helper
        .start_workers(&config.domain, &config.application_name, WorkerOptions::default())
        .unwrap();
    assert!(worker.is_started());
    assert!(Arc::ptr_eq(&worker.service(), helper.service.as_ref().unwrap()));
    assert_eq!(
        worker.registry().get_registered_workflow_types(),
        vec!["hello_world"]
    );

    // A second worker gets no registrations.
    let second = helper
        .start_workers(&config.domain, &config.application_name, WorkerOptions::default())
        .unwrap();
    assert!(second.registry().get_registered_workflow_types().is_empty());
    assert!(second.registry().get_registered_activity_types().is_empty());
}

#[tokio::test]
async fn test_setup_fails_on_empty_host() {
    let mut helper = Helper::new();
    let err = helper
        .setup(Configuration::default(), &get_config())
        .unwrap_err();
    assert!(matches!(err, BootstrapError::HostPortEmpty));
    assert!(helper.service.is_none());
}

#[tokio::test]
async fn test_start_workers_failure_is_returned() {
    let mut helper = Helper::new();
    helper.setup(configuration(), &get_config()).unwrap();
    let err = helper
        .start_workers("", "cadence-test", WorkerOptions::default())
        .unwrap_err();
    assert!(matches!(
        err,
        BootstrapError::Worker(WorkerError::InvalidConfiguration(_))
    ));
}

#[tokio::test]
async fn test_start_workflow_sends_encoded_args() {
    let config = get_config();
    let service = Arc::new(RecordingService::default());
    let mut helper = Helper::new();
    helper.client = Some(WorkflowClient::new(
        service.clone(),
        config.domain.clone(),
        ClientOptions::default(),
    ));

    let options = StartWorkflowOptions {
        id: "test_task_1".to_string(),
        task_list: config.application_name.clone(),
        execution_start_to_close_timeout: Some(Duration::from_secs(300)),
        decision_task_start_to_close_timeout: Some(Duration::from_secs(300)),
        ..Default::default()
    };
    let execution = helper
        .start_workflow(options, "hello_world", &("hackerman", &config))
        .await
        .unwrap();
    assert_eq!(execution.workflow_id, "test_task_1");
    assert_eq!(execution.run_id, "run-1");

    let requests = service.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].workflow_type, "hello_world");
    assert_eq!(requests[0].task_list, "cadence-test");
    let input: (String, cadtest::Config) =
        serde_json::from_slice(requests[0].input.as_deref().unwrap()).unwrap();
    assert_eq!(input, ("hackerman".to_string(), config));
}

#[tokio::test]
async fn test_start_workflow_requires_setup() {
    let helper = Helper::new();
    let err = helper
        .start_workflow(StartWorkflowOptions::default(), "hello_world", &"x")
        .await
        .unwrap_err();
    assert!(matches!(err, BootstrapError::NotSetUp));
}

#[tokio::test]
async fn test_simple_workflow_end_to_end() {
    let logs = SharedBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let config = get_config();
    let worker = CadenceWorker::new(
        Arc::new(RecordingService::default()),
        config.domain.clone(),
        config.application_name.clone(),
        WorkerOptions::default(),
    );
    worker
        .register_workflow_with_options(
            WorkflowDefinition::new(simple_workflow),
            WorkflowRegisterOptions {
                name: Some("hello_world".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
    worker
        .register_activity(ActivityDefinition::new(simple_activity))
        .unwrap();
    worker.start().unwrap();

    let () = worker
        .run_workflow("hello_world", &("X", &config))
        .await
        .unwrap();

    let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    assert!(output.contains("SimpleActivity called."));
    let done = output
        .lines()
        .find(|line| line.contains("Done"))
        .expect("no Done log line");
    assert!(done.contains("Processed activity: X"));
}
