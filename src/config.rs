use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Duration;

/// Main configuration structure for the ops console core
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OpslineConfig {
    /// Backend API settings
    pub api: ApiConfig,
    /// Workflow engine settings
    pub workflow: WorkflowConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Base URL of the REST backend
    pub base_url: String,
    /// Bearer token (usually set via env var)
    pub token: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_seconds: u64,
    /// Client-side rate limiting
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Sustained requests per second
    pub requests_per_second: u32,
    /// Burst capacity
    pub burst_capacity: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkflowConfig {
    /// Confirmation prompt window in milliseconds
    pub confirmation_window_ms: u64,
    /// Retry policy for list fetches
    pub list_retry: ListRetryConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListRetryConfig {
    /// Retries after the initial attempt
    pub max_attempts: u32,
    /// First backoff delay in milliseconds
    pub base_delay_ms: u64,
    /// Backoff ceiling in milliseconds
    pub max_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level directive
    pub log_level: String,
    /// Emit JSON log lines
    pub json_logs: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            token: None,
            timeout_seconds: 30,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 5,
            burst_capacity: 10,
        }
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            confirmation_window_ms: 5_000,
            list_retry: ListRetryConfig::default(),
        }
    }
}

impl Default for ListRetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
            max_delay_ms: 30_000,
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: true,
        }
    }
}

impl OpslineConfig {
    /// Load `opsline.toml` and `OPSLINE_*` environment variables over the
    /// defaults. A missing file is fine; the environment always wins.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let defaults = Config::try_from(&OpslineConfig::default())?;
        let merged = Config::builder()
            .add_source(defaults)
            .add_source(File::with_name("opsline").required(false))
            .add_source(Environment::with_prefix("OPSLINE").separator("__"))
            .build()?;
        Ok(merged.try_deserialize()?)
    }

    pub fn confirmation_window(&self) -> Duration {
        Duration::from_millis(self.workflow.confirmation_window_ms)
    }
}

static CONFIG: OnceLock<OpslineConfig> = OnceLock::new();

/// Load and store the global configuration.
pub fn init_config() -> Result<&'static OpslineConfig> {
    let loaded = OpslineConfig::load()?;
    Ok(CONFIG.get_or_init(|| loaded))
}

/// Global configuration; defaults apply when `init_config` was never called.
pub fn config() -> &'static OpslineConfig {
    CONFIG.get_or_init(OpslineConfig::default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_observed_system() {
        let cfg = OpslineConfig::default();
        assert_eq!(cfg.workflow.confirmation_window_ms, 5_000);
        assert_eq!(cfg.confirmation_window(), Duration::from_millis(5_000));
        assert_eq!(cfg.api.timeout_seconds, 30);
        assert!(cfg.api.token.is_none());
    }

    #[test]
    fn retry_defaults_are_bounded() {
        let retry = ListRetryConfig::default();
        assert!(retry.max_attempts <= 5);
        assert!(retry.base_delay_ms < retry.max_delay_ms);
    }
}
