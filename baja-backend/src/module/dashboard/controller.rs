///! Dashboard controller
///!
///! Owns the current snapshot slot and the loading/ready/failed lifecycle.
///! Every trigger (startup, timer, manual refresh) runs the same
///! fetch-and-transition sequence; at most one runs at a time.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{broadcast, RwLock};

use baja_common::{DashboardView, Snapshot};
use super::view::build_view;
use crate::module::baja::DataFetcher;

/// The single message users see for any failed fetch.
pub const GENERIC_ERROR_MESSAGE: &str =
    "Nem sikerült az adatok betöltése. Kérjük, próbálja újra később.";

const EVENT_CAPACITY: usize = 32;

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardState {
    Loading,
    Ready(Arc<Snapshot>),
    Failed(String),
}

/// What started a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// First load after startup; always shows the loading state
    Mount,
    /// Background refresh; keeps the current state visible while fetching
    Timer,
    /// Refresh button; shows the loading state only when retrying after a failure
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Updated,
    Failed,
    /// Another load was already in flight
    Skipped,
}

impl LoadOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadOutcome::Updated => "updated",
            LoadOutcome::Failed => "failed",
            LoadOutcome::Skipped => "skipped",
        }
    }
}

/// Clears the in-flight flag when the load finishes, however it finishes.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct DashboardController {
    fetcher: DataFetcher,
    state: RwLock<DashboardState>,
    refreshing: AtomicBool,
    events: broadcast::Sender<DashboardState>,
}

impl DashboardController {
    pub fn new(fetcher: DataFetcher) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            fetcher,
            state: RwLock::new(DashboardState::Loading),
            refreshing: AtomicBool::new(false),
            events,
        }
    }

    pub async fn state(&self) -> DashboardState {
        self.state.read().await.clone()
    }

    /// The currently displayed snapshot, if any.
    pub async fn snapshot(&self) -> Option<Arc<Snapshot>> {
        match &*self.state.read().await {
            DashboardState::Ready(snapshot) => Some(snapshot.clone()),
            _ => None,
        }
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing.load(Ordering::Acquire)
    }

    /// Every state transition, in order, from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<DashboardState> {
        self.events.subscribe()
    }

    pub async fn view(&self) -> DashboardView {
        let state = self.state.read().await;
        build_view(&state, self.is_refreshing())
    }

    pub async fn mount(&self) -> LoadOutcome {
        self.load_data(Trigger::Mount).await
    }

    pub async fn refresh(&self) -> LoadOutcome {
        self.load_data(Trigger::Manual).await
    }

    /// Fetch once and move to `Ready` or `Failed`.
    ///
    /// A failure replaces whatever was shown before, including a good snapshot
    /// from an earlier load.
    pub async fn load_data(&self, trigger: Trigger) -> LoadOutcome {
        let Some(_in_flight) = InFlight::acquire(&self.refreshing) else {
            tracing::debug!("Load ({:?}) skipped: another load is in flight", trigger);
            return LoadOutcome::Skipped;
        };

        let show_loading = match trigger {
            Trigger::Mount => true,
            Trigger::Manual => matches!(*self.state.read().await, DashboardState::Failed(_)),
            Trigger::Timer => false,
        };
        if show_loading {
            self.transition(DashboardState::Loading).await;
        }

        match self.fetcher.fetch().await {
            Ok(snapshot) => {
                tracing::info!("Dashboard updated ({:?})", trigger);
                self.transition(DashboardState::Ready(Arc::new(snapshot))).await;
                LoadOutcome::Updated
            }
            Err(e) => {
                tracing::error!(kind = e.kind(), "Dashboard load ({:?}) failed: {}", trigger, e);
                self.transition(DashboardState::Failed(GENERIC_ERROR_MESSAGE.to_string()))
                    .await;
                LoadOutcome::Failed
            }
        }
    }

    async fn transition(&self, next: DashboardState) {
        let mut state = self.state.write().await;
        if matches!((&*state, &next), (DashboardState::Loading, DashboardState::Loading)) {
            return;
        }
        *state = next.clone();
        drop(state);

        // No subscribers is fine.
        let _ = self.events.send(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LocationConfig;
    use crate::module::gemini::{GenerateRequest, GenerativeBackend};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::Notify;

    const BODY: &str = r#"{"temperature":"21","windSpeed":"12","waterLevel":"180"}"#;

    struct QueueBackend(Mutex<VecDeque<Result<String, String>>>);

    impl QueueBackend {
        fn new(replies: Vec<Result<&str, &str>>) -> Arc<Self> {
            Arc::new(Self(Mutex::new(
                replies
                    .into_iter()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect(),
            )))
        }
    }

    #[async_trait]
    impl GenerativeBackend for QueueBackend {
        async fn generate(&self, _request: &GenerateRequest) -> anyhow::Result<String> {
            let reply = self.0.lock().unwrap().pop_front();
            match reply {
                Some(Ok(text)) => Ok(text),
                Some(Err(message)) => Err(anyhow::anyhow!("{}", message)),
                None => Err(anyhow::anyhow!("no scripted reply left")),
            }
        }
    }

    /// Blocks until released, then answers with `BODY`.
    struct GatedBackend {
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl GenerativeBackend for GatedBackend {
        async fn generate(&self, _request: &GenerateRequest) -> anyhow::Result<String> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(BODY.to_string())
        }
    }

    fn controller(backend: Arc<dyn GenerativeBackend>) -> DashboardController {
        let fetcher = DataFetcher::new(backend, LocationConfig::default())
            .with_timeout(Duration::from_secs(5));
        DashboardController::new(fetcher)
    }

    fn drain(rx: &mut broadcast::Receiver<DashboardState>) -> Vec<DashboardState> {
        let mut seen = Vec::new();
        while let Ok(state) = rx.try_recv() {
            seen.push(state);
        }
        seen
    }

    #[tokio::test]
    async fn test_mount_success() {
        let ctl = controller(QueueBackend::new(vec![Ok(BODY)]));
        assert_eq!(ctl.state().await, DashboardState::Loading);

        let mut rx = ctl.subscribe();
        assert_eq!(ctl.mount().await, LoadOutcome::Updated);

        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        let snapshot = ctl.snapshot().await.unwrap();
        assert_eq!(snapshot.readings.temperature.as_deref(), Some("21"));
        assert!(!ctl.is_refreshing());
    }

    #[tokio::test]
    async fn test_failure_shows_generic_message() {
        let ctl = controller(QueueBackend::new(vec![Err("Gemini API error 429: quota")]));
        assert_eq!(ctl.mount().await, LoadOutcome::Failed);
        assert_eq!(
            ctl.state().await,
            DashboardState::Failed(GENERIC_ERROR_MESSAGE.to_string())
        );
    }

    #[tokio::test]
    async fn test_timer_failure_discards_previous_snapshot() {
        let ctl = controller(QueueBackend::new(vec![Ok(BODY), Ok("not json at all")]));
        ctl.mount().await;
        let held = ctl.snapshot().await.unwrap();

        let mut rx = ctl.subscribe();
        assert_eq!(ctl.load_data(Trigger::Timer).await, LoadOutcome::Failed);

        // Straight to Failed, no Loading in between.
        assert_eq!(
            drain(&mut rx),
            vec![DashboardState::Failed(GENERIC_ERROR_MESSAGE.to_string())]
        );
        assert_eq!(ctl.snapshot().await, None);
        // A reference taken earlier still sees the old data.
        assert_eq!(held.readings.temperature.as_deref(), Some("21"));
    }

    #[tokio::test]
    async fn test_manual_refresh_from_ready_keeps_snapshot_visible() {
        let ctl = controller(QueueBackend::new(vec![Ok(BODY), Ok(r#"{"temperature":"22"}"#)]));
        ctl.mount().await;

        let mut rx = ctl.subscribe();
        assert_eq!(ctl.refresh().await, LoadOutcome::Updated);

        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], DashboardState::Ready(s) if s.readings.temperature.as_deref() == Some("22")));
    }

    #[tokio::test]
    async fn test_manual_retry_from_failed_goes_through_loading() {
        let ctl = controller(QueueBackend::new(vec![Err("boom"), Ok(BODY)]));
        ctl.mount().await;

        let mut rx = ctl.subscribe();
        ctl.refresh().await;

        let events = drain(&mut rx);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], DashboardState::Loading);
        assert!(matches!(events[1], DashboardState::Ready(_)));
    }

    #[tokio::test]
    async fn test_trigger_during_in_flight_load_is_skipped() {
        let backend = Arc::new(GatedBackend {
            entered: Notify::new(),
            release: Notify::new(),
        });
        let ctl = Arc::new(controller(backend.clone()));

        let first = tokio::spawn({
            let ctl = ctl.clone();
            async move { ctl.mount().await }
        });
        backend.entered.notified().await;

        assert!(ctl.is_refreshing());
        assert_eq!(ctl.refresh().await, LoadOutcome::Skipped);
        assert_eq!(ctl.load_data(Trigger::Timer).await, LoadOutcome::Skipped);
        assert!(ctl.view().await.refreshing);

        backend.release.notify_one();
        assert_eq!(first.await.unwrap(), LoadOutcome::Updated);
        assert!(!ctl.is_refreshing());
    }
}
