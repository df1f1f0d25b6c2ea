//! Configuration model for the client process.
//!
//! Every field has a default so that an empty or missing `config.toml`
//! yields a working configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Object type id of plain "Task" objects in a stock tracking-service schema.
pub const DEFAULT_TASK_TYPE_ID: &str = "11c137c0-ee7e-4f9c-91c5-8c77cec22b2c";

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    pub connection: ConnectionConfig,
    pub publish: PublishConfig,
    pub tracking: TrackingConfig,
    pub logging: LoggingConfig,
}

/// Remote-call channel settings.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    /// Number of connect attempts before giving up.
    pub max_attempts: u32,
    /// Delay slept before each connect attempt.
    pub retry_delay_ms: u64,
    /// Minimum spacing between two keep-alive pings.
    pub heartbeat_interval_ms: u64,
    /// Sleep between two iterations of the client loop.
    pub loop_interval_ms: u64,
    /// Upper bound on a synchronous remote call.
    pub call_timeout_ms: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 18861,
            max_attempts: 120,
            retry_delay_ms: 2_000,
            heartbeat_interval_ms: 1_000,
            loop_interval_ms: 10,
            call_timeout_ms: 30_000,
        }
    }
}

impl ConnectionConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }

    pub fn loop_interval(&self) -> Duration {
        Duration::from_millis(self.loop_interval_ms)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PublishConfig {
    /// Only tasks of this type get their status updated after a publish.
    pub task_type_id: String,
    /// Frame rate used for the recorder when the shot has none.
    pub default_fps: f64,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            task_type_id: DEFAULT_TASK_TYPE_ID.to_string(),
            default_fps: 24.0,
        }
    }
}

/// Tracking service endpoint. Credentials come from the launch environment.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct TrackingConfig {
    pub server_url: Option<String>,
    /// Location name used when registering component paths.
    pub location: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is not set.
    pub level: String,
    /// When set, logs are also written to daily files in this directory.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}
