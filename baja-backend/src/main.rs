use baja_backend::config;
use baja_backend::module::baja::DataFetcher;
use baja_backend::module::dashboard::{DashboardController, DashboardRenderer};
use baja_backend::module::gemini::GeminiClient;
use baja_backend::module::scheduled::{ScheduledTaskConfig, ScheduledTaskManager};
use baja_backend::service::DashboardService;

use anyhow::{Context, Result};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.toml".to_string());
    let found = config::read_config(&config_path)?;
    let config = config::CONFIG.get().context("Configuration not loaded")?;

    // Initialize logging
    let _logging_guard = baja_backend::logging::init_logging(
        &config.log_dir,
        "baja-backend",
        &config.log_level,
    )?;

    tracing::info!("Baja dashboard starting...");
    if found {
        tracing::info!("Loaded configuration from {}", config_path);
    } else {
        tracing::warn!("{} not found, using default configuration", config_path);
    }

    let backend = GeminiClient::new(&config.gemini, config.api_key())?;
    tracing::info!("Using model {} at {}", config.gemini.model, backend.endpoint());

    let fetcher = DataFetcher::new(Arc::new(backend), config.location.clone())
        .with_timeout(config.request_timeout());
    let controller = Arc::new(DashboardController::new(fetcher));

    // Configure and start scheduled tasks
    let task_config = ScheduledTaskConfig {
        refresh_interval: config.refresh_interval(),
        perform_initial_update: config.perform_initial_update,
    };
    let mut task_manager = ScheduledTaskManager::new(task_config, controller.clone());
    task_manager.start_all();

    let renderer = DashboardRenderer::new(&config.location, config.refresh_interval().as_secs());
    let service = DashboardService::new(controller, renderer);

    let addr = config.server_address();
    tokio::select! {
        result = service.serve(&addr) => {
            result.context("HTTP server failed")?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received.");
        }
    }

    task_manager.shutdown().await;
    Ok(())
}
