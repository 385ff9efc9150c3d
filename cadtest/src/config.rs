//! Connection parameters for the sample.

use serde::{Deserialize, Serialize};

/// Fixed connection and naming parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub application_name: String,
    pub client_name: String,
    pub cadence_service: String,
    pub host_port: String,
    pub domain: String,
    pub task_list_name: String,
    pub cadence_frontend_service: String,
    pub cadence_client_service: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            application_name: "cadence-test".to_string(),
            client_name: "simpleworker".to_string(),
            cadence_service: "cadence-service".to_string(),
            host_port: "127.0.0.1:7933".to_string(),
            domain: "cadence-test".to_string(),
            task_list_name: "SimpleWorker".to_string(),
            cadence_frontend_service: "cadence-frontend".to_string(),
            cadence_client_service: "cadence-client".to_string(),
        }
    }
}

pub fn get_config() -> Config {
    Config::default()
}
