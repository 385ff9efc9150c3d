use std::time::Duration;

use anyhow::Result;
use cadence_client::StartWorkflowOptions;
use cadence_core::FeatureFlags;
use cadence_worker::{ActivityDefinition, WorkerOptions, WorkflowDefinition};
use clap::Parser;
use tracing::info;

use cadtest::activities::simple_activity;
use cadtest::cli::{Cli, Mode};
use cadtest::config::Config;
use cadtest::workflows::simple_workflow;
use cadtest::{standalone, Configuration, Helper};

fn helper_for(config: &Config) -> Result<Helper> {
    let mut helper = Helper::new();
    helper.setup(
        Configuration {
            domain_name: config.domain.clone(),
            service_name: config.cadence_frontend_service.clone(),
            host_name_and_port: config.host_port.clone(),
        },
        config,
    )?;
    Ok(helper)
}

async fn run_worker(config: Config) -> Result<()> {
    let mut helper = helper_for(&config)?;

    let options = WorkerOptions {
        metrics_scope: helper.worker_metric_scope.clone(),
        data_converter: helper.data_converter.clone(),
        feature_flags: FeatureFlags {
            workflow_execution_already_completed_error_enabled: true,
        },
        ..Default::default()
    };
    helper.register_workflow_with_alias(WorkflowDefinition::new(simple_workflow), "hello_world");
    helper.register_activity(ActivityDefinition::new(simple_activity));

    info!(domain = %config.domain, "#####");
    let worker = helper.start_workers(&config.domain, &config.application_name, options)?;
    worker.run().await?;
    Ok(())
}

async fn run_standalone(config: Config) -> Result<()> {
    let worker = standalone::start_worker(&config)?;
    worker.run().await?;
    Ok(())
}

async fn start_hello_world(config: Config, value: String) -> Result<()> {
    let helper = helper_for(&config)?;

    let options = StartWorkflowOptions {
        id: format!("test_task_{}", uuid::Uuid::new_v4()),
        task_list: config.application_name.clone(),
        execution_start_to_close_timeout: Some(Duration::from_secs(5 * 60)),
        decision_task_start_to_close_timeout: Some(Duration::from_secs(5 * 60)),
        ..Default::default()
    };
    helper
        .start_workflow(options, "hello_world", &(value, &config))
        .await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.config();

    match cli.mode() {
        Mode::Worker => run_worker(config).await,
        Mode::Standalone => run_standalone(config).await,
        Mode::Start { value } => start_hello_world(config, value).await,
    }
}
