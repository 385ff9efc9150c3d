//! Worker started straight from [`Config`], without the helper.

use std::collections::HashMap;
use std::sync::Arc;

use cadence_client::{
    Dispatcher, DispatcherConfig, GrpcWorkflowServiceClient, Outbound, WorkflowService,
};
use cadence_worker::{CadenceWorker, Worker, WorkerOptions};
use tracing::{error, info};

use crate::config::Config;
use crate::error::BootstrapError;
use crate::logging::init_logger;

/// Service client over a dispatcher named `client_name`, with a single
/// outbound to `cadence_service`
pub fn build_cadence_service_client(
    config: &Config,
) -> Result<Arc<dyn WorkflowService>, BootstrapError> {
    let mut dispatcher = Dispatcher::new(DispatcherConfig {
        name: config.client_name.clone(),
        outbounds: HashMap::from([(
            config.cadence_service.clone(),
            Outbound::grpc(config.host_port.clone()),
        )]),
    });
    if let Err(e) = dispatcher.start() {
        error!(error = %e, "Failed to start dispatcher");
        return Err(e.into());
    }

    let client_config = dispatcher.client_config(&config.cadence_service)?;
    Ok(Arc::new(GrpcWorkflowServiceClient::new(client_config)))
}

/// Start a worker on `domain`/`task_list_name` with nothing registered.
///
/// Fails when called outside a Tokio runtime.
pub fn start_worker(config: &Config) -> Result<CadenceWorker, BootstrapError> {
    init_logger();
    let service = build_cadence_service_client(config)?;

    let worker = CadenceWorker::new(
        service,
        config.domain.clone(),
        config.task_list_name.clone(),
        WorkerOptions::default(),
    );
    if let Err(e) = worker.start() {
        error!(error = %e, "Failed to start worker.");
        return Err(e.into());
    }

    info!(worker = %config.task_list_name, "Started Worker.");
    Ok(worker)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::get_config;

    #[tokio::test]
    async fn test_start_worker_uses_config_task_list() {
        let worker = start_worker(&get_config()).unwrap();
        assert!(worker.is_started());
        assert_eq!(worker.domain(), "cadence-test");
        assert_eq!(worker.task_list(), "SimpleWorker");
        worker.stop();
    }

    #[tokio::test]
    async fn test_bad_host_port() {
        let config = Config {
            host_port: "bad host:7933".to_string(),
            ..get_config()
        };
        assert!(build_cadence_service_client(&config).is_err());
    }
}
