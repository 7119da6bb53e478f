///! Scheduled task manager
///!
///! Runs the dashboard's periodic work:
///! - the initial load on startup
///! - a background refresh every `refresh_interval` (15 minutes by default)

use chrono::{DateTime, Local};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use super::dashboard::{DashboardController, Trigger};

/// Configuration for scheduled tasks
#[derive(Debug, Clone)]
pub struct ScheduledTaskConfig {
    /// Time between background refreshes
    pub refresh_interval: Duration,

    /// Perform the initial load immediately
    pub perform_initial_update: bool,
}

impl Default for ScheduledTaskConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(15 * 60),
            perform_initial_update: true,
        }
    }
}

/// Scheduled task manager
pub struct ScheduledTaskManager {
    config: ScheduledTaskConfig,
    controller: Arc<DashboardController>,
    task_handles: Vec<JoinHandle<()>>,
}

impl ScheduledTaskManager {
    pub fn new(config: ScheduledTaskConfig, controller: Arc<DashboardController>) -> Self {
        Self {
            config,
            controller,
            task_handles: Vec::new(),
        }
    }

    /// Start all scheduled tasks
    pub fn start_all(&mut self) {
        tracing::info!("Starting scheduled task manager...");

        let refresh_handle = self.start_refresh_task();
        self.task_handles.push(refresh_handle);

        tracing::info!(
            "Started {} scheduled task(s) (dashboard refresh every {:.0} min)",
            self.task_handles.len(),
            self.config.refresh_interval.as_secs_f64() / 60.0
        );
    }

    fn start_refresh_task(&self) -> JoinHandle<()> {
        let controller = self.controller.clone();
        let interval = self.config.refresh_interval;
        let perform_initial = self.config.perform_initial_update;

        tracing::info!(
            "Scheduling dashboard refresh task (interval: {:?}, initial: {})",
            interval,
            perform_initial
        );

        tokio::spawn(async move {
            if perform_initial {
                tracing::info!("Performing initial dashboard load...");
                let outcome = controller.mount().await;
                tracing::info!("Initial dashboard load: {}", outcome.as_str());
            }

            Self::refresh_loop(controller, interval).await;
        })
    }

    /// Background refresh loop. Failures are already logged by the controller.
    async fn refresh_loop(controller: Arc<DashboardController>, interval: Duration) {
        loop {
            let next_trigger = Self::calculate_next_refresh_time(Local::now(), interval);
            tracing::info!(
                "Next dashboard refresh at: {}",
                next_trigger.format("%Y-%m-%d %H:%M:%S")
            );

            tokio::time::sleep(interval).await;

            let outcome = controller.load_data(Trigger::Timer).await;
            tracing::debug!("Scheduled refresh: {}", outcome.as_str());
        }
    }

    fn calculate_next_refresh_time(now: DateTime<Local>, interval: Duration) -> DateTime<Local> {
        chrono::Duration::from_std(interval)
            .ok()
            .and_then(|step| now.checked_add_signed(step))
            .unwrap_or(now)
    }

    /// Gracefully shutdown all tasks
    pub async fn shutdown(self) {
        tracing::info!("Shutting down scheduled task manager...");

        for handle in self.task_handles {
            handle.abort();
        }

        tracing::info!("All scheduled tasks stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LocationConfig;
    use crate::module::baja::DataFetcher;
    use crate::module::gemini::{GenerateRequest, GenerativeBackend};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingBackend(AtomicUsize);

    #[async_trait]
    impl GenerativeBackend for CountingBackend {
        async fn generate(&self, _request: &GenerateRequest) -> anyhow::Result<String> {
            let n = self.0.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(format!(r#"{{"temperature":"{}"}}"#, n))
        }
    }

    #[test]
    fn test_calculate_next_refresh_time() {
        let now = Local::now();
        let next = ScheduledTaskManager::calculate_next_refresh_time(now, Duration::from_secs(900));
        assert_eq!((next - now).num_minutes(), 15);
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_load_then_periodic_refresh() {
        let backend = Arc::new(CountingBackend(AtomicUsize::new(0)));
        let fetcher = DataFetcher::new(backend.clone(), LocationConfig::default());
        let controller = Arc::new(DashboardController::new(fetcher));

        let mut manager = ScheduledTaskManager::new(
            ScheduledTaskConfig {
                refresh_interval: Duration::from_secs(15 * 60),
                perform_initial_update: true,
            },
            controller.clone(),
        );
        manager.start_all();

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(backend.0.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(15 * 60)).await;
        assert_eq!(backend.0.load(Ordering::SeqCst), 2);
        let snapshot = controller.snapshot().await.unwrap();
        assert_eq!(snapshot.readings.temperature.as_deref(), Some("2"));

        manager.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_initial_load_when_disabled() {
        let backend = Arc::new(CountingBackend(AtomicUsize::new(0)));
        let fetcher = DataFetcher::new(backend.clone(), LocationConfig::default());
        let controller = Arc::new(DashboardController::new(fetcher));

        let mut manager = ScheduledTaskManager::new(
            ScheduledTaskConfig {
                refresh_interval: Duration::from_secs(600),
                perform_initial_update: false,
            },
            controller,
        );
        manager.start_all();

        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(backend.0.load(Ordering::SeqCst), 0);

        manager.shutdown().await;
    }
}
