//! RPC dispatcher for outbound calls to Cadence services.
//!
//! A [`Dispatcher`] is named after the calling service and holds one unary
//! outbound per remote service. Starting it opens a lazily-connected gRPC
//! channel for every outbound; [`Dispatcher::client_config`] hands that
//! channel to a service client together with the routing names the
//! frontend expects in request metadata.

use std::collections::HashMap;
use std::time::Duration;

use cadence_core::{CadenceError, CadenceResult};
use tonic::transport::{Channel, Endpoint};
use tracing::debug;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// A single-peer gRPC outbound
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    host_port: String,
}

impl Outbound {
    pub fn grpc(host_port: impl Into<String>) -> Self {
        Self {
            host_port: host_port.into(),
        }
    }

    pub fn host_port(&self) -> &str {
        &self.host_port
    }

    fn uri(&self) -> String {
        if self.host_port.contains("://") {
            self.host_port.clone()
        } else {
            format!("http://{}", self.host_port)
        }
    }
}

/// Dispatcher configuration
#[derive(Debug, Clone, Default)]
pub struct DispatcherConfig {
    /// Name of the calling service, sent as `rpc-caller`
    pub name: String,
    /// Outbounds keyed by remote service name
    pub outbounds: HashMap<String, Outbound>,
}

/// Everything a service client needs to talk to one remote service
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub caller: String,
    pub service: String,
    pub channel: Channel,
}

#[derive(Debug)]
pub struct Dispatcher {
    name: String,
    outbounds: HashMap<String, Outbound>,
    channels: HashMap<String, Channel>,
}

impl Dispatcher {
    pub fn new(config: DispatcherConfig) -> Self {
        Self {
            name: config.name,
            outbounds: config.outbounds,
            channels: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_started(&self) -> bool {
        !self.outbounds.is_empty() && self.channels.len() == self.outbounds.len()
    }

    /// Open a channel for every outbound.
    ///
    /// Connection happens on first use, so this only fails on malformed
    /// addresses or when no Tokio runtime is running.
    pub fn start(&mut self) -> CadenceResult<()> {
        if self.outbounds.is_empty() {
            return Err(CadenceError::InvalidArgument(format!(
                "dispatcher {} has no outbounds",
                self.name
            )));
        }
        if tokio::runtime::Handle::try_current().is_err() {
            return Err(CadenceError::Transport(format!(
                "no Tokio runtime to start dispatcher {} on",
                self.name
            )));
        }

        for (service, outbound) in &self.outbounds {
            if self.channels.contains_key(service) {
                continue;
            }

            let endpoint = Endpoint::from_shared(outbound.uri())
                .map_err(|e| {
                    CadenceError::Transport(format!(
                        "invalid outbound for {}: {}: {}",
                        service,
                        outbound.host_port(),
                        e
                    ))
                })?
                .connect_timeout(CONNECT_TIMEOUT);

            debug!(service = %service, host_port = %outbound.host_port(), "Starting outbound");
            self.channels.insert(service.clone(), endpoint.connect_lazy());
        }
        Ok(())
    }

    /// Client configuration for the named outbound service
    pub fn client_config(&self, service: &str) -> CadenceResult<ClientConfig> {
        let channel = self.channels.get(service).cloned().ok_or_else(|| {
            CadenceError::ClientError(format!(
                "no started outbound for service {} on dispatcher {}",
                service, self.name
            ))
        })?;

        Ok(ClientConfig {
            caller: self.name.clone(),
            service: service.to_string(),
            channel,
        })
    }
}
