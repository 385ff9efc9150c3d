//! Error types for the Cadence client.
//!
//! This module defines the errors that can surface when talking to the
//! Cadence frontend or when bootstrapping clients and workers.

use thiserror::Error;

use crate::encoded::EncodingError;

/// Server error types
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServerError {
    #[error("EntityNotExistsError: {message}")]
    EntityNotExists { message: String },

    #[error("BadRequestError: {message}")]
    BadRequest { message: String },

    #[error("WorkflowExecutionAlreadyStartedError: {message}")]
    WorkflowExecutionAlreadyStarted { message: String },

    #[error("WorkflowExecutionAlreadyCompletedError: {message}")]
    WorkflowExecutionAlreadyCompleted { message: String },

    #[error("DomainNotActiveError: {message}")]
    DomainNotActive { message: String },

    #[error("ServiceBusyError: {message}")]
    ServiceBusy { message: String },

    #[error("InternalServiceError: {message}")]
    InternalService { message: String },
}

/// Main Cadence error type
#[derive(Debug, Error)]
pub enum CadenceError {
    #[error(transparent)]
    Server(#[from] ServerError),

    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Client error: {0}")]
    ClientError(String),
}

pub type CadenceResult<T> = Result<T, CadenceError>;

pub fn is_entity_not_exists_error(err: &CadenceError) -> bool {
    matches!(
        err,
        CadenceError::Server(ServerError::EntityNotExists { .. })
    )
}

pub fn is_workflow_execution_already_started_error(err: &CadenceError) -> bool {
    matches!(
        err,
        CadenceError::Server(ServerError::WorkflowExecutionAlreadyStarted { .. })
    )
}

pub fn is_workflow_execution_already_completed_error(err: &CadenceError) -> bool {
    matches!(
        err,
        CadenceError::Server(ServerError::WorkflowExecutionAlreadyCompleted { .. })
    )
}
