use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    /// Background refresh period
    #[serde(default = "default_refresh_interval_minutes")]
    pub refresh_interval_minutes: u64,

    /// Fetch once immediately on startup (the "mount")
    #[serde(default = "default_perform_initial_update")]
    pub perform_initial_update: bool,

    #[serde(default)]
    pub gemini: GeminiConfig,

    #[serde(default)]
    pub location: LocationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,

    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Sent as `generationConfig.responseMimeType`. Some models reject it together with search grounding.
    #[serde(default)]
    pub response_mime_type: Option<String>,
}

/// Where the dashboard is about. Only used to phrase the prompt and the page header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default = "default_town")]
    pub town: String,

    #[serde(default = "default_country")]
    pub country: String,

    #[serde(default = "default_region")]
    pub region: String,

    #[serde(default = "default_river")]
    pub river: String,

    #[serde(default = "default_water_level_source")]
    pub water_level_source: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_refresh_interval_minutes() -> u64 {
    15
}

fn default_perform_initial_update() -> bool {
    true
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_gemini_model() -> String {
    "gemini-3-flash-preview".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_town() -> String {
    "Baja".to_string()
}

fn default_country() -> String {
    "Hungary".to_string()
}

fn default_region() -> String {
    "Magyarország, Bács-Kiskun".to_string()
}

fn default_river() -> String {
    "Danube (Duna)".to_string()
}

fn default_water_level_source() -> String {
    "hydroinfo.hu".to_string()
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: default_gemini_base_url(),
            model: default_gemini_model(),
            api_key_env: default_api_key_env(),
            request_timeout_secs: default_request_timeout_secs(),
            response_mime_type: None,
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            town: default_town(),
            country: default_country(),
            region: default_region(),
            river: default_river(),
            water_level_source: default_water_level_source(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_dir: default_log_dir(),
            refresh_interval_minutes: default_refresh_interval_minutes(),
            perform_initial_update: default_perform_initial_update(),
            gemini: GeminiConfig::default(),
            location: LocationConfig::default(),
        }
    }
}

impl DashboardConfig {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        let config: DashboardConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file '{}'", path.display()))?;
        Ok(config)
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_minutes.max(1).saturating_mul(60))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.gemini.request_timeout_secs.max(1))
    }

    /// The API key from the environment, if set and non-empty.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.gemini.api_key_env)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }
}

pub static CONFIG: OnceLock<DashboardConfig> = OnceLock::new();

/// Load `path` into [`CONFIG`]. A missing file means all defaults.
///
/// Returns whether the file existed, so the caller can log it once logging is up.
pub fn read_config(path: impl AsRef<Path>) -> anyhow::Result<bool> {
    let path = path.as_ref();
    let found = path.exists();
    let config = if found {
        DashboardConfig::from_file(path)?
    } else {
        DashboardConfig::default()
    };

    CONFIG
        .set(config)
        .map_err(|_| anyhow::anyhow!("Configuration already loaded"))?;

    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_from_empty_file() {
        let config: DashboardConfig = toml::from_str("").unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.refresh_interval_minutes, 15);
        assert_eq!(config.refresh_interval(), Duration::from_secs(900));
        assert_eq!(config.gemini.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.gemini.response_mime_type, None);
        assert_eq!(config.location.town, "Baja");
        assert!(config.perform_initial_update);
    }

    #[test]
    fn test_from_file_partial_sections() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
port = 9000
log_level = "debug"
refresh_interval_minutes = 5

[gemini]
model = "gemini-2.5-flash"
request_timeout_secs = 20
response_mime_type = "application/json"

[location]
town = "Mohács"
"#
        )
        .unwrap();

        let config = DashboardConfig::from_file(file.path()).unwrap();
        assert_eq!(config.server_address(), "0.0.0.0:9000");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.refresh_interval(), Duration::from_secs(300));
        assert_eq!(config.gemini.model, "gemini-2.5-flash");
        assert_eq!(config.request_timeout(), Duration::from_secs(20));
        assert_eq!(
            config.gemini.base_url,
            "https://generativelanguage.googleapis.com/v1beta"
        );
        assert_eq!(config.gemini.response_mime_type.as_deref(), Some("application/json"));
        assert_eq!(config.location.town, "Mohács");
        assert_eq!(config.location.river, "Danube (Duna)");
    }

    #[test]
    fn test_from_file_rejects_bad_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "port = \"not a number\"").unwrap();
        assert!(DashboardConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn test_zero_intervals_are_clamped() {
        let config = DashboardConfig {
            refresh_interval_minutes: 0,
            gemini: GeminiConfig {
                request_timeout_secs: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(config.refresh_interval(), Duration::from_secs(60));
        assert_eq!(config.request_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_huge_refresh_interval_saturates() {
        let config: DashboardConfig =
            toml::from_str("refresh_interval_minutes = 18446744073709551615").unwrap();
        assert_eq!(config.refresh_interval(), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_api_key_from_named_env_var() {
        let config = DashboardConfig {
            gemini: GeminiConfig {
                api_key_env: "BAJA_TEST_MISSING_KEY_VAR".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(config.api_key(), None);
    }
}
