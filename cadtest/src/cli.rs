use clap::{Parser, Subcommand};

use crate::config::{get_config, Config};

/// Cadence sample worker
#[derive(Parser, Debug)]
#[command(name = "cadtest")]
#[command(about = "Sample Cadence worker hosting the hello_world workflow")]
#[command(version)]
pub struct Cli {
    /// Cadence frontend host:port
    #[arg(long, env = "CADENCE_HOST_PORT", global = true)]
    pub host_port: Option<String>,

    /// Domain name
    #[arg(long, env = "CADENCE_DOMAIN", global = true)]
    pub domain: Option<String>,

    #[command(subcommand)]
    pub mode: Option<Mode>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Register the sample workflow and activity and run a worker (until Ctrl+C)
    Worker,

    /// Run a worker with nothing registered (until Ctrl+C)
    Standalone,

    /// Start a hello_world workflow execution
    Start {
        /// Value handed to the workflow
        #[arg(long, default_value = "hackerman")]
        value: String,
    },
}

impl Cli {
    /// Fixed config with command line overrides applied
    pub fn config(&self) -> Config {
        let mut config = get_config();
        if let Some(host_port) = &self.host_port {
            config.host_port = host_port.clone();
        }
        if let Some(domain) = &self.domain {
            config.domain = domain.clone();
        }
        config
    }

    pub fn mode(&self) -> Mode {
        self.mode.clone().unwrap_or(Mode::Worker)
    }
}
