//! Workflow and activity registry.
//!
//! Plain async functions are adapted into [`WorkflowDefinition`] and
//! [`ActivityDefinition`] values. A definition remembers the function's
//! default name, which is what the function is registered under unless the
//! register options carry an alias.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use cadence_activity::{ActivityContext, ActivityError};
use cadence_core::{decode_with, encode_with, function_name, DataConverter};
use cadence_workflow::{WorkflowContext, WorkflowError};
use dashmap::DashMap;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{de::DeserializeOwned, Serialize};

/// Workflow trait
pub trait Workflow: Send + Sync {
    fn execute(
        &self,
        ctx: WorkflowContext,
        input: Option<Vec<u8>>,
    ) -> BoxFuture<'static, Result<Vec<u8>, WorkflowError>>;
}

/// Activity trait
pub trait Activity: Send + Sync {
    fn execute(
        &self,
        ctx: ActivityContext,
        input: Option<Vec<u8>>,
        data_converter: Arc<dyn DataConverter>,
    ) -> BoxFuture<'static, Result<Vec<u8>, ActivityError>>;
}

/// Options for registering a workflow
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowRegisterOptions {
    /// Name to register under instead of the function's default name
    pub name: Option<String>,
    pub disable_already_registered_check: bool,
}

/// Options for registering an activity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityRegisterOptions {
    /// Name to register under instead of the function's default name
    pub name: Option<String>,
    pub disable_already_registered_check: bool,
}

/// Registry errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("workflow type \"{0}\" is already registered")]
    WorkflowAlreadyRegistered(String),
    #[error("activity type \"{0}\" is already registered")]
    ActivityAlreadyRegistered(String),
}

// Absent input decodes as JSON null so `()` and `Option<T>` inputs work.
fn decode_input<I: DeserializeOwned>(
    converter: &dyn DataConverter,
    input: Option<Vec<u8>>,
) -> Result<I, cadence_core::EncodingError> {
    match input {
        Some(bytes) => decode_with(converter, &bytes),
        None => decode_with(converter, b"null"),
    }
}

struct FnWorkflow<F, I> {
    function: F,
    _input: PhantomData<fn(I)>,
}

impl<F, Fut, I, O> Workflow for FnWorkflow<F, I>
where
    F: Fn(WorkflowContext, I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, WorkflowError>> + Send + 'static,
    I: DeserializeOwned + Send + 'static,
    O: Serialize + Send + 'static,
{
    fn execute(
        &self,
        ctx: WorkflowContext,
        input: Option<Vec<u8>>,
    ) -> BoxFuture<'static, Result<Vec<u8>, WorkflowError>> {
        let converter = ctx.data_converter();
        let input: I = match decode_input(converter.as_ref(), input) {
            Ok(input) => input,
            Err(e) => return futures::future::ready(Err(e.into())).boxed(),
        };
        let future = (self.function)(ctx, input);
        async move {
            let output = future.await?;
            Ok::<_, WorkflowError>(encode_with(converter.as_ref(), &output)?)
        }
        .boxed()
    }
}

struct FnActivity<F, I> {
    function: F,
    _input: PhantomData<fn(I)>,
}

impl<F, Fut, I, O> Activity for FnActivity<F, I>
where
    F: Fn(ActivityContext, I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, ActivityError>> + Send + 'static,
    I: DeserializeOwned + Send + 'static,
    O: Serialize + Send + 'static,
{
    fn execute(
        &self,
        ctx: ActivityContext,
        input: Option<Vec<u8>>,
        data_converter: Arc<dyn DataConverter>,
    ) -> BoxFuture<'static, Result<Vec<u8>, ActivityError>> {
        let input: I = match decode_input(data_converter.as_ref(), input) {
            Ok(input) => input,
            Err(e) => return futures::future::ready(Err(e.into())).boxed(),
        };
        let future = (self.function)(ctx, input);
        async move {
            let output = future.await?;
            Ok::<_, ActivityError>(encode_with(data_converter.as_ref(), &output)?)
        }
        .boxed()
    }
}

/// A workflow function together with its default registration name
#[derive(Clone)]
pub struct WorkflowDefinition {
    name: String,
    workflow: Arc<dyn Workflow>,
}

impl WorkflowDefinition {
    pub fn new<F, Fut, I, O>(function: F) -> Self
    where
        F: Fn(WorkflowContext, I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, WorkflowError>> + Send + 'static,
        I: DeserializeOwned + Send + 'static,
        O: Serialize + Send + 'static,
    {
        Self {
            name: function_name(&function).to_string(),
            workflow: Arc::new(FnWorkflow {
                function,
                _input: PhantomData,
            }),
        }
    }

    /// Name used when registered without an alias
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn workflow(&self) -> Arc<dyn Workflow> {
        Arc::clone(&self.workflow)
    }
}

impl std::fmt::Debug for WorkflowDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowDefinition")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// An activity function together with its default registration name
#[derive(Clone)]
pub struct ActivityDefinition {
    name: String,
    activity: Arc<dyn Activity>,
}

impl ActivityDefinition {
    pub fn new<F, Fut, I, O>(function: F) -> Self
    where
        F: Fn(ActivityContext, I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, ActivityError>> + Send + 'static,
        I: DeserializeOwned + Send + 'static,
        O: Serialize + Send + 'static,
    {
        Self {
            name: function_name(&function).to_string(),
            activity: Arc::new(FnActivity {
                function,
                _input: PhantomData,
            }),
        }
    }

    /// Name used when registered without an alias
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn activity(&self) -> Arc<dyn Activity> {
        Arc::clone(&self.activity)
    }
}

impl std::fmt::Debug for ActivityDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityDefinition")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Registry trait
pub trait Registry: Send + Sync {
    fn register_workflow(
        &self,
        workflow: WorkflowDefinition,
        options: WorkflowRegisterOptions,
    ) -> Result<String, RegistryError>;

    fn register_activity(
        &self,
        activity: ActivityDefinition,
        options: ActivityRegisterOptions,
    ) -> Result<String, RegistryError>;

    fn get_workflow(&self, name: &str) -> Option<Arc<dyn Workflow>>;

    fn get_activity(&self, name: &str) -> Option<Arc<dyn Activity>>;

    /// Registered workflow type names, sorted
    fn get_registered_workflow_types(&self) -> Vec<String>;

    /// Registered activity type names, sorted
    fn get_registered_activity_types(&self) -> Vec<String>;
}

/// Registry backed by concurrent maps
#[derive(Default)]
pub struct WorkflowRegistry {
    workflows: DashMap<String, Arc<dyn Workflow>>,
    activities: DashMap<String, Arc<dyn Activity>>,
}

impl WorkflowRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Registry for WorkflowRegistry {
    fn register_workflow(
        &self,
        workflow: WorkflowDefinition,
        options: WorkflowRegisterOptions,
    ) -> Result<String, RegistryError> {
        let name = options.name.unwrap_or_else(|| workflow.name.clone());
        if !options.disable_already_registered_check && self.workflows.contains_key(&name) {
            return Err(RegistryError::WorkflowAlreadyRegistered(name));
        }
        self.workflows.insert(name.clone(), workflow.workflow);
        Ok(name)
    }

    fn register_activity(
        &self,
        activity: ActivityDefinition,
        options: ActivityRegisterOptions,
    ) -> Result<String, RegistryError> {
        let name = options.name.unwrap_or_else(|| activity.name.clone());
        if !options.disable_already_registered_check && self.activities.contains_key(&name) {
            return Err(RegistryError::ActivityAlreadyRegistered(name));
        }
        self.activities.insert(name.clone(), activity.activity);
        Ok(name)
    }

    fn get_workflow(&self, name: &str) -> Option<Arc<dyn Workflow>> {
        self.workflows.get(name).map(|w| Arc::clone(w.value()))
    }

    fn get_activity(&self, name: &str) -> Option<Arc<dyn Activity>> {
        self.activities.get(name).map(|a| Arc::clone(a.value()))
    }

    fn get_registered_workflow_types(&self) -> Vec<String> {
        let mut names: Vec<String> = self.workflows.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    fn get_registered_activity_types(&self) -> Vec<String> {
        let mut names: Vec<String> = self.activities.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}
