//! gRPC client implementation for Cadence workflow service.
//!
//! Calls are made over the channel owned by the [`Dispatcher`](crate::Dispatcher),
//! with the YARPC routing headers the Cadence frontend requires.

use async_trait::async_trait;
use cadence_core::{CadenceError, CadenceResult, ServerError};
use tonic::codec::ProstCodec;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::metadata::{Ascii, MetadataValue};
use tonic::transport::Channel;
use tonic::{Code, Status};

use crate::dispatcher::ClientConfig;
use crate::proto;
use crate::service::*;

/// gRPC-based workflow service client
#[derive(Debug, Clone)]
pub struct GrpcWorkflowServiceClient {
    channel: Channel,
    caller: String,
    service: String,
}

impl GrpcWorkflowServiceClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            channel: config.channel,
            caller: config.caller,
            service: config.service,
        }
    }

    fn request<T>(&self, message: T) -> CadenceResult<tonic::Request<T>> {
        let mut request = tonic::Request::new(message);
        let metadata = request.metadata_mut();
        for (key, value) in [
            ("rpc-caller", self.caller.as_str()),
            ("rpc-service", self.service.as_str()),
            ("rpc-encoding", "proto"),
        ] {
            let value: MetadataValue<Ascii> = value.parse().map_err(|_| {
                CadenceError::InvalidArgument(format!("invalid {} header: {}", key, value))
            })?;
            metadata.insert(key, value);
        }
        Ok(request)
    }

    async fn unary<Req, Resp>(&self, path: &'static str, message: Req) -> CadenceResult<Resp>
    where
        Req: prost::Message + Send + Sync + 'static,
        Resp: prost::Message + Default + Send + Sync + 'static,
    {
        let request = self.request(message)?;

        let mut grpc = tonic::client::Grpc::new(self.channel.clone());
        grpc.ready()
            .await
            .map_err(|e| CadenceError::Transport(format!("service not ready: {}", e)))?;

        let codec: ProstCodec<Req, Resp> = ProstCodec::default();
        let response = grpc
            .unary(request, PathAndQuery::from_static(path), codec)
            .await
            .map_err(status_to_error)?;
        Ok(response.into_inner())
    }
}

#[async_trait]
impl WorkflowService for GrpcWorkflowServiceClient {
    async fn start_workflow_execution(
        &self,
        request: StartWorkflowExecutionRequest,
    ) -> CadenceResult<StartWorkflowExecutionResponse> {
        let pb_request: proto::StartWorkflowExecutionRequest = request.into();
        let response: proto::StartWorkflowExecutionResponse = self
            .unary(proto::START_WORKFLOW_EXECUTION_PATH, pb_request)
            .await?;
        Ok(response.into())
    }
}

/// Map a gRPC status onto the Cadence server error taxonomy
pub fn status_to_error(status: Status) -> CadenceError {
    let message = status.message().to_string();
    match status.code() {
        Code::NotFound => ServerError::EntityNotExists { message }.into(),
        Code::InvalidArgument => ServerError::BadRequest { message }.into(),
        Code::AlreadyExists => ServerError::WorkflowExecutionAlreadyStarted { message }.into(),
        Code::FailedPrecondition if message.contains("already completed") => {
            ServerError::WorkflowExecutionAlreadyCompleted { message }.into()
        }
        Code::FailedPrecondition => ServerError::DomainNotActive { message }.into(),
        Code::ResourceExhausted => ServerError::ServiceBusy { message }.into(),
        Code::Internal => ServerError::InternalService { message }.into(),
        _ => CadenceError::Transport(format!("gRPC error: {}", status)),
    }
}
