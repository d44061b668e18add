//! Structured logging setup.
//!
//! # Usage
//!
//! Initialize tracing at application startup and keep the returned guard
//! alive until exit so buffered file output is flushed:
//!
//! ```no_run
//! use starknet_position_indexer::observability;
//!
//! let _guard = observability::init_tracing(None, None, false)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Environment Configuration
//!
//! ```bash
//! # Set log level for all modules
//! RUST_LOG=debug cargo run
//!
//! # Per-position call logging without dependency noise
//! RUST_LOG=starknet_position_indexer=debug,warn cargo run
//!
//! # JSON console output plus a daily-rotated log file
//! LOG_JSON=true LOG_FILE=./logs/indexer.log cargo run
//! ```

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Filter used when neither `RUST_LOG` nor an explicit level is given.
pub const DEFAULT_FILTER: &str = "starknet_position_indexer=info,warn";

/// Logging options read from `RUST_LOG`, `LOG_FILE` and `LOG_JSON`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogSettings {
    /// Filter directives
    pub level: Option<String>,
    /// Daily-rotated JSON log file
    pub file: Option<PathBuf>,
    /// JSON console output
    pub json: bool,
}

impl LogSettings {
    /// Read logging options from the process environment.
    ///
    /// Loads `.env` first so the keys it sets apply before the subscriber is
    /// installed.
    #[must_use]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read logging options from an arbitrary key lookup.
    ///
    /// Anything other than `"true"` for `LOG_JSON` means pretty output.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            level: lookup("RUST_LOG").filter(|v| !v.trim().is_empty()),
            file: lookup("LOG_FILE")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            json: lookup("LOG_JSON")
                .and_then(|v| v.trim().parse::<bool>().ok())
                .unwrap_or(false),
        }
    }
}

/// Initialize the tracing subscriber.
///
/// # Arguments
///
/// * `log_level` - Filter directive used when `RUST_LOG` is unset
/// * `log_file` - Optional file path; enables a daily-rotated JSON layer
/// * `json_output` - JSON console output instead of the pretty format
///
/// # Returns
///
/// The file writer's guard when `log_file` is set. Dropping it stops the
/// background writer.
///
/// # Errors
///
/// Returns an error if the log directory cannot be created or a global
/// subscriber is already installed.
pub fn init_tracing(
    log_level: Option<String>,
    log_file: Option<PathBuf>,
    json_output: bool,
) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error>> {
    let env_filter = if let Ok(filter) = std::env::var("RUST_LOG") {
        EnvFilter::new(filter)
    } else if let Some(level) = log_level {
        EnvFilter::new(level)
    } else {
        EnvFilter::new(DEFAULT_FILTER)
    };

    let console_layer = if json_output {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    } else {
        fmt::layer()
            .pretty()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    let (file_layer, guard) = if let Some(ref path) = log_file {
        let directory = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(directory)?;

        let file_appender = tracing_appender::rolling::daily(
            directory,
            path.file_name().unwrap_or_else(|| OsStr::new("indexer.log")),
        );
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        // File output is always JSON
        let layer = fmt::layer()
            .json()
            .with_writer(non_blocking)
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    info!(
        json_output,
        file_logging = log_file.is_some(),
        "Tracing initialized successfully"
    );

    Ok(guard)
}

/// Route logs to the test harness at debug level.
///
/// Safe to call from many tests; only the first call installs a subscriber.
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        assert!(DEFAULT_FILTER.parse::<EnvFilter>().is_ok());
    }

    #[test]
    fn test_log_settings_defaults() {
        assert_eq!(LogSettings::from_lookup(|_| None), LogSettings::default());
    }

    #[test]
    fn test_log_settings_from_dotenv_file() {
        let dir = tempfile::tempdir();
        assert!(dir.is_ok());

        if let Ok(dir) = dir {
            let path = dir.path().join(".env");
            let written = std::fs::write(
                &path,
                "RUST_LOG=starknet_position_indexer=debug\nLOG_JSON=true\nLOG_FILE=./logs/indexer.log\n",
            );
            assert!(written.is_ok());

            let vars: Result<std::collections::HashMap<String, String>, _> =
                dotenvy::from_path_iter(&path).and_then(Iterator::collect);
            assert!(vars.is_ok());

            if let Ok(vars) = vars {
                let settings = LogSettings::from_lookup(|key| vars.get(key).cloned());
                assert_eq!(
                    settings.level.as_deref(),
                    Some("starknet_position_indexer=debug")
                );
                assert_eq!(settings.file, Some(PathBuf::from("./logs/indexer.log")));
                assert!(settings.json);
            }
        }
    }

    #[test]
    fn test_log_settings_invalid_json_flag() {
        let settings = LogSettings::from_lookup(|key| (key == "LOG_JSON").then(|| "yes".to_string()));
        assert!(!settings.json);
    }

    #[test]
    fn test_init_tracing_twice_does_not_panic() {
        init_test_tracing();
        // A subscriber is already installed, so this must fail cleanly
        let result = init_tracing(Some("debug".to_string()), None, false);
        assert!(result.is_err());
    }
}
