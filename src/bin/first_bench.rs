//! Runs the sleep benchmark: 1 fork, 3 warmup and 3 measurement iterations.
//!
//! Command-line arguments are ignored. See `firstbench::settings` for the
//! environment variables that tune iteration length and result output.
#![forbid(unsafe_code)]

use std::process::ExitCode;

use firstbench::harness::fork;
use firstbench::logging::init_logging;
use firstbench::settings::HarnessSettings;
use firstbench::{sleep_bench, Result};
use tracing::error;

fn main() -> ExitCode {
    init_logging();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "first-bench failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let registry = sleep_bench::benchmarks()?;
    if fork::serve_if_requested(&registry)? {
        return Ok(());
    }
    let settings = HarnessSettings::from_env()?;
    let options = sleep_bench::run_options(&settings)?;
    sleep_bench::run(&registry, options, &settings)?;
    Ok(())
}
