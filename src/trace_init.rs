//! JSON trace output for annotation runs.
//!
//! Events go to `<dir>/furi-trace.jsonl` through a non-blocking writer. The
//! writer thread drains its queue when the returned [`TraceGuard`] drops, so a
//! short-lived caller such as `furitool` keeps every event up to exit.

use std::io;
use std::path::{Path, PathBuf};

pub const TRACE_FILE: &str = "furi-trace.jsonl";

/// Env var with an `EnvFilter` directive that replaces [`DEFAULT_FILTER`].
pub const FILTER_ENV: &str = "FURI_TRACE";

pub const DEFAULT_FILTER: &str = "furi_engine=debug,furi_core=debug";

#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    #[error("cannot create trace directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid {FILTER_ENV} directive: {0}")]
    Filter(String),
    #[error("a tracing subscriber is already installed")]
    AlreadyInstalled,
}

/// Hold for as long as events should be written.
#[must_use = "trace output stops when the guard is dropped"]
pub struct TraceGuard {
    #[cfg(feature = "trace")]
    _worker: tracing_appender::non_blocking::WorkerGuard,
}

/// Install the JSON file subscriber, creating `log_dir` if needed.
#[cfg(feature = "trace")]
pub fn init_tracing(log_dir: &Path) -> Result<TraceGuard, TraceError> {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    std::fs::create_dir_all(log_dir).map_err(|source| TraceError::CreateDir {
        path: log_dir.to_path_buf(),
        source,
    })?;

    let filter = match std::env::var(FILTER_ENV) {
        Ok(directive) => {
            EnvFilter::try_new(&directive).map_err(|e| TraceError::Filter(e.to_string()))?
        }
        Err(_) => EnvFilter::new(DEFAULT_FILTER),
    };

    let file_appender = tracing_appender::rolling::never(log_dir, TRACE_FILE);
    let (non_blocking, worker) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .json()
        .with_writer(non_blocking)
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_env_filter(filter)
        .try_init()
        .map_err(|_| TraceError::AlreadyInstalled)?;

    Ok(TraceGuard { _worker: worker })
}

/// Without the `trace` feature nothing is installed and nothing is written.
#[cfg(not(feature = "trace"))]
pub fn init_tracing(_log_dir: &Path) -> Result<TraceGuard, TraceError> {
    Ok(TraceGuard {})
}
