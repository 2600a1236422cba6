use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{BenchError, Result};

/// What a benchmark score measures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Average time per operation over time-bounded iterations.
    AverageTime,
    /// Operations completed per unit of time.
    Throughput,
    /// Time of a single invocation per iteration.
    SingleShotTime,
}

impl Mode {
    /// Short label used in report tables.
    pub fn short_label(self) -> &'static str {
        match self {
            Mode::AverageTime => "avgt",
            Mode::Throughput => "thrpt",
            Mode::SingleShotTime => "ss",
        }
    }

    /// Whether each iteration invokes the routine exactly once.
    pub fn is_single_shot(self) -> bool {
        matches!(self, Mode::SingleShotTime)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Mode::AverageTime => "Average time, time/op",
            Mode::Throughput => "Throughput, ops/time",
            Mode::SingleShotTime => "Single shot invocation time",
        };
        f.write_str(label)
    }
}

/// Unit in which scores are reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeUnit {
    /// Nanoseconds.
    Nanoseconds,
    /// Microseconds.
    Microseconds,
    /// Milliseconds.
    Milliseconds,
    /// Seconds.
    Seconds,
}

impl TimeUnit {
    /// Nanoseconds in one unit.
    pub fn nanos_per_unit(self) -> f64 {
        match self {
            TimeUnit::Nanoseconds => 1.0,
            TimeUnit::Microseconds => 1_000.0,
            TimeUnit::Milliseconds => 1_000_000.0,
            TimeUnit::Seconds => 1_000_000_000.0,
        }
    }

    /// Abbreviation used in score units (`us`, `ms`, ...).
    pub fn abbreviation(self) -> &'static str {
        match self {
            TimeUnit::Nanoseconds => "ns",
            TimeUnit::Microseconds => "us",
            TimeUnit::Milliseconds => "ms",
            TimeUnit::Seconds => "s",
        }
    }

    /// Converts a nanosecond count into this unit.
    pub fn from_nanos(self, nanos: f64) -> f64 {
        nanos / self.nanos_per_unit()
    }
}

/// How benchmark state is shared between worker threads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    /// Each thread gets its own state.
    #[default]
    Thread,
    /// One state instance shared by all threads.
    Benchmark,
}

/// Immutable configuration of a benchmark run.
///
/// Build with [`Options::builder`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    /// Substring selectors matched against benchmark names; empty selects all.
    pub includes: Vec<String>,
    /// Worker processes per benchmark; zero runs in the current process.
    pub forks: u32,
    /// Untimed iterations run before measuring.
    pub warmup_iterations: u32,
    /// Duration of each warmup iteration.
    pub warmup_time: Duration,
    /// Timed iterations whose scores are aggregated.
    pub measurement_iterations: u32,
    /// Duration of each measurement iteration.
    pub measurement_time: Duration,
    /// Overrides the benchmark's own mode when set.
    pub mode: Option<Mode>,
    /// Overrides the benchmark's own output unit when set.
    pub time_unit: Option<TimeUnit>,
}

impl Options {
    /// Starts a builder populated with the defaults.
    pub fn builder() -> OptionsBuilder {
        OptionsBuilder::default()
    }
}

/// Builder for [`Options`].
///
/// Starts from 5 forks and 5 warmup plus 5 measurement iterations of 10 s
/// each, selecting every registered benchmark.
#[derive(Clone, Debug)]
pub struct OptionsBuilder {
    includes: Vec<String>,
    forks: u32,
    warmup_iterations: u32,
    warmup_time: Duration,
    measurement_iterations: u32,
    measurement_time: Duration,
    mode: Option<Mode>,
    time_unit: Option<TimeUnit>,
}

impl Default for OptionsBuilder {
    fn default() -> Self {
        Self {
            includes: Vec::new(),
            forks: 5,
            warmup_iterations: 5,
            warmup_time: Duration::from_secs(10),
            measurement_iterations: 5,
            measurement_time: Duration::from_secs(10),
            mode: None,
            time_unit: None,
        }
    }
}

impl OptionsBuilder {
    /// Adds a benchmark selector.
    pub fn include(mut self, selector: impl Into<String>) -> Self {
        self.includes.push(selector.into());
        self
    }

    /// Sets the number of worker processes per benchmark.
    pub fn forks(mut self, forks: u32) -> Self {
        self.forks = forks;
        self
    }

    /// Sets the number of warmup iterations.
    pub fn warmup_iterations(mut self, count: u32) -> Self {
        self.warmup_iterations = count;
        self
    }

    /// Sets the duration of each warmup iteration.
    pub fn warmup_time(mut self, time: Duration) -> Self {
        self.warmup_time = time;
        self
    }

    /// Sets the number of measurement iterations.
    pub fn measurement_iterations(mut self, count: u32) -> Self {
        self.measurement_iterations = count;
        self
    }

    /// Sets the duration of each measurement iteration.
    pub fn measurement_time(mut self, time: Duration) -> Self {
        self.measurement_time = time;
        self
    }

    /// Overrides the measurement mode of every selected benchmark.
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Overrides the output unit of every selected benchmark.
    pub fn time_unit(mut self, unit: TimeUnit) -> Self {
        self.time_unit = Some(unit);
        self
    }

    /// Validates the configuration and freezes it.
    pub fn build(self) -> Result<Options> {
        if self.measurement_iterations == 0 {
            return Err(BenchError::invalid_option(
                "measurement iterations must be at least 1",
            ));
        }
        if self.measurement_time.is_zero() {
            return Err(BenchError::invalid_option(
                "measurement time must be greater than zero",
            ));
        }
        if self.warmup_iterations > 0 && self.warmup_time.is_zero() {
            return Err(BenchError::invalid_option(
                "warmup time must be greater than zero when warmup iterations are set",
            ));
        }
        if let Some(empty) = self.includes.iter().find(|s| s.trim().is_empty()) {
            return Err(BenchError::invalid_option(format!(
                "include selector {empty:?} is blank"
            )));
        }
        Ok(Options {
            includes: self.includes,
            forks: self.forks,
            warmup_iterations: self.warmup_iterations,
            warmup_time: self.warmup_time,
            measurement_iterations: self.measurement_iterations,
            measurement_time: self.measurement_time,
            mode: self.mode,
            time_unit: self.time_unit,
        })
    }
}
