//! Tracing setup for AOCC.
//!
//! Two sinks share one registry:
//!
//! - `~/.aocc/logs/aocc.log.<date>`: every event as a flattened JSON line
//! - stderr: warnings only, or everything with `-v`
//!
//! `RUST_LOG` replaces the file filter. Tests call [`init_test_logging`].
//!
//! ```no_run
//! let _guard = aocc_core::init_logging(None, false)?;
//! tracing::info!(alert_id = 2, "alert resolved");
//! # Ok::<(), aocc_core::AoccError>(())
//! ```

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer, filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::error::{AoccError, Result};

/// Log file name inside the log directory (the appender adds a date suffix).
const LOG_FILE_NAME: &str = "aocc.log";

/// Keeps the non-blocking file writer alive. Drop it last to flush.
pub struct LogGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Filter for the JSON file: `RUST_LOG` if set, otherwise the AOCC crates
/// at INFO (DEBUG when verbose).
fn file_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(format!("aocc={level},aocc_core={level},aocc_console={level}"))
    })
}

/// Initialize the AOCC logging system.
///
/// Everything goes to the daily-rolled JSON file under `log_dir`
/// (default `~/.aocc/logs/`). Stderr only shows warnings unless `verbose`
/// is set, so snapshot output printed by the CLI stays readable.
///
/// Keep the returned [`LogGuard`] alive for the lifetime of the process.
pub fn init_logging(log_dir: Option<PathBuf>, verbose: bool) -> Result<LogGuard> {
    let log_dir = match log_dir {
        Some(dir) => dir,
        None => default_log_dir()?,
    };
    std::fs::create_dir_all(&log_dir).map_err(|e| AoccError::DirectoryCreation {
        path: log_dir.clone(),
        source: e,
    })?;

    let (file_writer, file_guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(&log_dir, LOG_FILE_NAME));

    let file_layer = fmt::layer()
        .json()
        .flatten_event(true)
        .with_writer(file_writer)
        .with_ansi(false)
        .with_filter(file_filter(verbose));

    let stderr_level = if verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };
    let stderr_layer = fmt::layer()
        .compact()
        .without_time()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .with_filter(stderr_level);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .init();

    tracing::debug!(log_dir = %log_dir.display(), verbose, "logging initialized");
    Ok(LogGuard {
        _file_guard: Some(file_guard),
    })
}

/// Initialize minimal console-only logging for tests.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

/// Root of AOCC's per-user state: `~/.aocc/`.
pub fn aocc_home() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(".aocc"))
        .ok_or_else(|| AoccError::internal("home directory could not be determined"))
}

/// Get the default log directory path (`~/.aocc/logs/`).
pub fn default_log_dir() -> Result<PathBuf> {
    Ok(aocc_home()?.join("logs"))
}

/// Log a session lifecycle event under the `aocc::session` target.
///
/// ```ignore
/// log_session_event!("status_toggled", status = %new_status);
/// log_session_event!("disposed");
/// ```
#[macro_export]
macro_rules! log_session_event {
    ($event:expr) => {
        tracing::info!(
            target: "aocc::session",
            event = $event,
            "session event"
        )
    };
    ($event:expr, $($field:tt)*) => {
        tracing::info!(
            target: "aocc::session",
            event = $event,
            $($field)*,
            "session event"
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_default_log_dir() {
        // SAFETY: serialized with the other HOME-mutating tests
        unsafe { std::env::set_var("HOME", "/tmp/aocc-test-home") };
        let dir = default_log_dir().unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/aocc-test-home/.aocc/logs"));
    }

    #[test]
    #[serial]
    fn test_file_filter_defaults_to_aocc_crates() {
        // SAFETY: serialized with the other env-mutating tests
        unsafe { std::env::remove_var("RUST_LOG") };
        let filter = file_filter(true).to_string();
        assert!(filter.contains("aocc_console=debug"));
        assert!(file_filter(false).to_string().contains("aocc_core=info"));
    }

    #[test]
    fn test_init_test_logging() {
        init_test_logging();
        log_session_event!("test_event", detail = "ok");
    }
}
