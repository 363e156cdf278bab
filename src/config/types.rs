use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub event_loop: EventLoopConfig,
    #[serde(default)]
    pub debug: DebugConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for the manual event loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventLoopConfig {
    /// Upper bound on tasks run by a single `drain` call (default: 10000).
    /// Guards tests against effects that keep re-posting themselves.
    #[serde(default = "default_max_drain_steps")]
    pub max_drain_steps: usize,
}

/// Settings for the debug middleware.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DebugConfig {
    /// Maximum number of history entries kept; the oldest are evicted.
    /// Unbounded when absent.
    #[serde(default)]
    pub history_capacity: Option<usize>,
}

/// Settings for `logging::init_tracing`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive (default: "info").
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Write logs to this file instead of stderr.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_max_drain_steps() -> usize {
    10_000
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for EventLoopConfig {
    fn default() -> Self {
        Self {
            max_drain_steps: default_max_drain_steps(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            file: None,
        }
    }
}
