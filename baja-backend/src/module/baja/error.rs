use thiserror::Error;

/// Shown to the user when the backend reports rate or quota exhaustion.
pub const QUOTA_EXCEEDED_MESSAGE: &str =
    "Az adatszolgáltató napi kerete elfogyott (kvótatúllépés). Kérjük, próbálja újra később.";

/// Why a fetch produced no snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The backend answered, but not with a usable JSON object.
    #[error("Backend returned malformed data: {0}")]
    DataFormat(String),
    /// The backend refused for rate/quota reasons.
    #[error("{message}")]
    QuotaExceeded { message: String, detail: String },
    /// Transport, auth, timeout or any other service failure, message unchanged.
    #[error("{0}")]
    Backend(String),
}

impl FetchError {
    /// Reclassify a backend failure by its message.
    pub fn from_backend_message(message: String) -> Self {
        if is_quota_error(&message) {
            FetchError::QuotaExceeded {
                message: QUOTA_EXCEEDED_MESSAGE.to_string(),
                detail: message,
            }
        } else {
            FetchError::Backend(message)
        }
    }

    /// Stable label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::DataFormat(_) => "data_format",
            FetchError::QuotaExceeded { .. } => "quota_exceeded",
            FetchError::Backend(_) => "backend",
        }
    }
}

/// Rate limiting shows up as an HTTP 429 or a message mentioning the quota.
pub fn is_quota_error(message: &str) -> bool {
    message.contains("429") || message.to_lowercase().contains("quota")
}
