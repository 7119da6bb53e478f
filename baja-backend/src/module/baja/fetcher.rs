///! Data fetcher
///!
///! Prompt → backend → sanitize/parse/validate → `Snapshot` stamped with
///! the local clock. No retries, no caching; that is the controller's call.

use chrono::{DateTime, Local, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

use baja_common::Snapshot;
use super::error::FetchError;
use super::parser::parse_readings;
use super::prompt::build_prompt;
use crate::config::LocationConfig;
use crate::module::gemini::{GenerateRequest, GenerativeBackend};

/// Format of `Snapshot::last_updated`, the way a Hungarian locale prints a time.
pub const LAST_UPDATED_FORMAT: &str = "%H:%M:%S";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Source of "now" for prompt dates and snapshot timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

pub struct DataFetcher {
    backend: Arc<dyn GenerativeBackend>,
    clock: Arc<dyn Clock>,
    location: LocationConfig,
    timeout: Duration,
}

impl DataFetcher {
    pub fn new(backend: Arc<dyn GenerativeBackend>, location: LocationConfig) -> Self {
        Self {
            backend,
            clock: Arc::new(SystemClock),
            location,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Upper bound for one backend call; expiry is a `FetchError::Backend`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// One request, one answer, one snapshot (or an error saying which kind of failure).
    pub async fn fetch(&self) -> Result<Snapshot, FetchError> {
        let fetch_id = uuid::Uuid::now_v7();
        let span = tracing::info_span!("fetch", %fetch_id);
        self.fetch_inner().instrument(span).await
    }

    async fn fetch_inner(&self) -> Result<Snapshot, FetchError> {
        let request = GenerateRequest {
            prompt: build_prompt(&self.location, self.clock.now().date_naive()),
            web_search: true,
        };

        tracing::info!("Requesting snapshot for {}", self.location.town);

        let raw = match tokio::time::timeout(self.timeout, self.backend.generate(&request)).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                let err = FetchError::from_backend_message(format!("{:#}", e));
                tracing::warn!(kind = err.kind(), "Backend call failed: {:#}", e);
                return Err(err);
            }
            Err(_) => {
                tracing::warn!("Backend call timed out after {:?}", self.timeout);
                return Err(FetchError::Backend(format!(
                    "Backend request timed out after {} ms",
                    self.timeout.as_millis()
                )));
            }
        };

        tracing::debug!("Raw backend answer ({} bytes): {}", raw.len(), raw);

        let readings = parse_readings(&raw).inspect_err(|e| {
            tracing::warn!(kind = e.kind(), "Rejected backend answer: {}", e);
        })?;

        let captured = self.clock.now();
        let snapshot = Snapshot {
            readings,
            last_updated: captured.format(LAST_UPDATED_FORMAT).to_string(),
            fetched_at: captured.with_timezone(&Utc),
        };

        tracing::info!(
            "Snapshot accepted: {}/9 fields, last updated {}",
            snapshot.readings.present_count(),
            snapshot.last_updated
        );

        Ok(snapshot)
    }
}
