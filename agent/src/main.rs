// Schedule agent binary entry point

use common::agent::{Agent, AgentConfig};
use common::config::Settings;
use common::repository::{ItemRepository, MemoryRepository, RepositoryRegistry};
use common::runner::{RunnerConfig, ScheduleRunner};
use common::task::TaskRegistry;
use std::sync::Arc;
use tracing::{error, info};

const HTTP_TASK_TIMEOUT_SECONDS: u64 = 30;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Load configuration
    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {e}");
        e
    })?;
    settings
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;

    // Initialize tracing/logging
    common::telemetry::init_logging(&settings.observability.log_level)?;

    info!(
        database = %settings.agent.database,
        schedule_root = %settings.agent.schedule_root,
        "Starting schedule agent"
    );

    // Seed the item repositories from their configured JSON trees
    let mut repositories = RepositoryRegistry::new();
    for (name, seed_path) in &settings.repository.databases {
        let seed = tokio::fs::read_to_string(seed_path).await.map_err(|e| {
            error!(database = %name, path = %seed_path, error = %e, "Failed to read seed file");
            e
        })?;
        let repository = MemoryRepository::from_json(&seed).map_err(|e| {
            error!(database = %name, error = %e, "Failed to parse seed file");
            e
        })?;
        info!(database = %name, path = %seed_path, "Repository seeded");
        repositories.register(name, Arc::new(repository) as Arc<dyn ItemRepository>);
    }

    // Task registry with the built-in task kinds
    let registry = TaskRegistry::with_builtins(HTTP_TASK_TIMEOUT_SECONDS)
        .map_err(|e| anyhow::anyhow!("Failed to build task registry: {e}"))?;
    info!("Task registry initialized");

    // Create the sweep runner
    let runner = ScheduleRunner::new(
        RunnerConfig {
            database_name: settings.agent.database.clone(),
            schedule_root: settings.agent.schedule_root.clone(),
            log_activity: settings.agent.log_activity,
        },
        Arc::new(repositories),
        Arc::new(registry),
    );

    // Create the agent loop
    let agent = Arc::new(Agent::new(
        AgentConfig {
            poll_interval_seconds: settings.agent.poll_interval_seconds,
        },
        runner,
    ));

    // Set up graceful shutdown on Ctrl+C
    let agent_for_shutdown = agent.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            error!("Failed to listen for Ctrl+C");
            return;
        }
        info!("Received Ctrl+C signal, initiating graceful shutdown");
        if let Err(e) = agent_for_shutdown.stop().await {
            error!(error = %e, "Error during agent shutdown");
        }
    });

    // Start the trigger loop
    if let Err(e) = agent.start().await {
        error!(error = %e, "Agent error");
        return Err(e);
    }

    info!("Schedule agent stopped");
    Ok(())
}
