//! Application configuration module
//! Handles environment variable loading and defaults for the payment flow.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Aggregated configuration for the payment subsystem.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub gateway: GatewayConfig,
    pub session: SessionConfig,
    pub staging: StagingConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        // Load .env file if it exists
        let _ = dotenv::dotenv();

        AppConfig {
            gateway: GatewayConfig::from_env(),
            session: SessionConfig::from_env(),
            staging: StagingConfig::from_env(),
            logging: LoggingConfig::from_env(),
        }
    }
}

/// Payment gateway endpoint configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "https://gateway.mboapay.local".to_string(),
            timeout_secs: 30,
        }
    }
}

impl GatewayConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: env::var("PAYMENT_GATEWAY_BASE_URL").unwrap_or(defaults.base_url),
            timeout_secs: env::var("PAYMENT_GATEWAY_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(defaults.timeout_secs),
        }
    }
}

/// Session polling configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Gap between scheduled status polls.
    pub poll_interval: Duration,
    /// Absolute window, measured from entry into the awaiting state, after
    /// which the session times out and stops polling.
    pub confirmation_deadline: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            confirmation_deadline: Duration::from_secs(600),
        }
    }
}

impl SessionConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            poll_interval: Duration::from_secs(
                env::var("PAYMENT_POLL_INTERVAL_SECONDS")
                    .ok()
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(defaults.poll_interval.as_secs()),
            ),
            confirmation_deadline: Duration::from_secs(
                env::var("PAYMENT_CONFIRMATION_DEADLINE_SECONDS")
                    .ok()
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(defaults.confirmation_deadline.as_secs()),
            ),
        }
    }
}

/// Where the staged-order record lives.
#[derive(Debug, Clone)]
pub struct StagingConfig {
    pub dir: PathBuf,
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./checkout_staging"),
        }
    }
}

impl StagingConfig {
    pub fn from_env() -> Self {
        Self {
            dir: env::var("CHECKOUT_STAGING_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| Self::default().dir),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log format options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Plain,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Plain,
        }
    }
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            level: env::var("LOG_LEVEL").unwrap_or(defaults.level),
            format: match env::var("LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                _ => defaults.format,
            },
        }
    }
}
