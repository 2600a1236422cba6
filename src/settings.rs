//! Environment-driven harness settings.
//!
//! The entry point ignores its command-line arguments, so the few knobs that
//! are allowed to vary between runs are read from the environment here.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{BenchError, Result};

/// Duration of each warmup and measurement iteration, in milliseconds.
pub const ITERATION_MS_VAR: &str = "FIRSTBENCH_ITERATION_MS";
/// Path of the optional JSON result file.
pub const RESULT_PATH_VAR: &str = "FIRSTBENCH_RESULT";

const DEFAULT_ITERATION: Duration = Duration::from_secs(10);

/// Settings that tune a run without changing its shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HarnessSettings {
    /// Time spent in each iteration.
    pub iteration_time: Duration,
    /// Where to write the JSON result file, if anywhere.
    pub result_path: Option<PathBuf>,
}

impl Default for HarnessSettings {
    fn default() -> Self {
        Self {
            iteration_time: DEFAULT_ITERATION,
            result_path: None,
        }
    }
}

impl HarnessSettings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through an arbitrary lookup function.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();
        if let Some(raw) = lookup(ITERATION_MS_VAR) {
            let millis: u64 = raw.trim().parse().map_err(|_| BenchError::Settings {
                key: ITERATION_MS_VAR,
                value: raw.clone(),
            })?;
            if millis == 0 {
                return Err(BenchError::Settings {
                    key: ITERATION_MS_VAR,
                    value: raw,
                });
            }
            settings.iteration_time = Duration::from_millis(millis);
        }
        settings.result_path = lookup(RESULT_PATH_VAR)
            .filter(|raw| !raw.trim().is_empty())
            .map(PathBuf::from);
        Ok(settings)
    }
}
