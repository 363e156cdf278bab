use tracing_subscriber::EnvFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;

/// Environment variable overriding the configured filter directive.
pub const LOG_ENV: &str = "STATELOOM_LOG";

/// Initialize tracing for applications embedding the runtime.
///
/// The filter comes from `STATELOOM_LOG` when set, otherwise from
/// `config.filter`. Output goes to `config.file` when configured, else to
/// stderr. Returns `false` if a global subscriber was already installed or
/// the log file could not be created.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(&config.filter));

    match &config.file {
        Some(path) => {
            let Ok(file) = std::fs::File::create(path) else {
                eprintln!("Warning: Failed to create log file: {}", path.display());
                return false;
            };
            let file_layer = fmt::layer()
                .with_writer(file)
                .with_ansi(false)
                .with_target(true)
                .with_level(true);
            tracing_subscriber::registry()
                .with(filter)
                .with(file_layer)
                .try_init()
                .is_ok()
        }
        None => {
            let stderr_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_timer(fmt::time::UtcTime::rfc_3339());
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .try_init()
                .is_ok()
        }
    }
}
