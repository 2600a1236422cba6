//! Error type shared by the harness and the entry point.

use std::io;
use std::process::ExitStatus;

use thiserror::Error;

/// Result type alias for harness operations.
pub type Result<T> = std::result::Result<T, BenchError>;

/// Errors raised while configuring or executing a benchmark run.
#[derive(Debug, Error)]
pub enum BenchError {
    /// Run options failed validation.
    #[error("invalid option: {0}")]
    InvalidOption(String),
    /// No registered benchmark matched the include selectors.
    #[error("no benchmarks match the selection {includes:?}")]
    TargetNotFound {
        /// Include selectors that were tried.
        includes: Vec<String>,
    },
    /// A benchmark with the same name is already registered.
    #[error("benchmark '{0}' is already registered")]
    DuplicateBenchmark(String),
    /// A worker process could not be started.
    #[error("failed to spawn fork worker: {source}")]
    Spawn {
        /// Underlying spawn failure.
        source: io::Error,
    },
    /// A worker process exited unsuccessfully.
    #[error("fork {fork} of '{benchmark}' failed with {status}")]
    ForkFailed {
        /// Benchmark the worker was running.
        benchmark: String,
        /// 1-based fork number.
        fork: u32,
        /// Exit status reported by the worker.
        status: ExitStatus,
    },
    /// A worker produced output that does not follow the fork protocol.
    #[error("fork protocol error: {0}")]
    Protocol(String),
    /// An environment setting could not be parsed.
    #[error("invalid value '{value}' for {key}")]
    Settings {
        /// Environment variable name.
        key: &'static str,
        /// Raw value that was rejected.
        value: String,
    },
    /// I/O error.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// JSON encoding or decoding error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl BenchError {
    pub(crate) fn invalid_option(msg: impl Into<String>) -> Self {
        BenchError::InvalidOption(msg.into())
    }
}
