use cadence_core::{CadenceError, EncodingError};
use cadence_worker::WorkerError;

/// Errors raised while wiring up the client and worker
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("Hostport is empty.")]
    HostPortEmpty,
    #[error("No RPC dispatcher provided to create a connection to Cadence Service")]
    NoDispatcher,
    #[error("helper is not set up")]
    NotSetUp,
    #[error(transparent)]
    Client(#[from] CadenceError),
    #[error(transparent)]
    Worker(#[from] WorkerError),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}
