//! The benchmarked sleep and its fixed run configuration.

use std::time::Duration;

use tracing::trace;

use crate::error::Result;
use crate::harness::{BenchmarkDef, Mode, Options, Registry, RunResult, Runner, Scope, TimeUnit};
use crate::interrupt::interruptible_sleep;
use crate::settings::HarnessSettings;

/// Selector matching every benchmark in this module.
pub const BENCHMARK_GROUP: &str = "SleepBenchmark";
/// Registered name of [`sleep_a_while`].
pub const SLEEP_A_WHILE: &str = "SleepBenchmark.sleep_a_while";
/// How long [`sleep_a_while`] blocks.
pub const SLEEP_DURATION: Duration = Duration::from_millis(50);

/// Worker processes used by the entry point.
pub const FORKS: u32 = 1;
/// Warmup iterations used by the entry point.
pub const WARMUP_ITERATIONS: u32 = 3;
/// Measurement iterations used by the entry point.
pub const MEASUREMENT_ITERATIONS: u32 = 3;

/// Blocks the calling thread for [`SLEEP_DURATION`] and returns `0`.
///
/// An interrupt ends the sleep early but is not an error; the sentinel is
/// returned either way.
pub fn sleep_a_while() -> i32 {
    if interruptible_sleep(SLEEP_DURATION).is_err() {
        trace!("sleep interrupted");
    }
    0
}

/// Registry holding the sleep benchmark.
pub fn benchmarks() -> Result<Registry> {
    let mut registry = Registry::new();
    registry.register_def(
        BenchmarkDef::new(SLEEP_A_WHILE, sleep_a_while)
            .with_mode(Mode::AverageTime)
            .with_time_unit(TimeUnit::Microseconds)
            .with_scope(Scope::Thread),
    )?;
    Ok(registry)
}

/// The entry point's run configuration.
///
/// Only iteration durations come from `settings`; target and counts are fixed.
pub fn run_options(settings: &HarnessSettings) -> Result<Options> {
    Options::builder()
        .include(BENCHMARK_GROUP)
        .forks(FORKS)
        .warmup_iterations(WARMUP_ITERATIONS)
        .warmup_time(settings.iteration_time)
        .measurement_iterations(MEASUREMENT_ITERATIONS)
        .measurement_time(settings.iteration_time)
        .build()
}

/// Runs `options` against `registry`, reporting to stdout.
pub fn run(
    registry: &Registry,
    options: Options,
    settings: &HarnessSettings,
) -> Result<Vec<RunResult>> {
    Runner::new(options)
        .with_result_path(settings.result_path.clone())
        .run(registry)
}
