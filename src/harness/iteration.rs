//! Warmup and measurement iteration loop.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::harness::options::{Mode, Options, TimeUnit};
use crate::harness::registry::BenchmarkDef;

/// Which part of a fork an iteration belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Untimed stabilisation iterations.
    Warmup,
    /// Iterations whose scores are aggregated.
    Measurement,
}

/// Raw outcome of one iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IterationResult {
    /// Phase the iteration ran in.
    pub phase: Phase,
    /// 1-based index within its phase.
    pub index: u32,
    /// Routine invocations completed.
    pub ops: u64,
    /// Wall-clock time spent invoking the routine.
    pub elapsed_nanos: u64,
}

impl IterationResult {
    /// Score of this iteration in `unit` for `mode`.
    ///
    /// Time modes yield time per operation; throughput yields operations per
    /// unit of time.
    pub fn score(&self, mode: Mode, unit: TimeUnit) -> f64 {
        let elapsed = self.elapsed_nanos.max(1) as f64;
        let ops = self.ops.max(1) as f64;
        match mode {
            Mode::AverageTime | Mode::SingleShotTime => unit.from_nanos(elapsed / ops),
            Mode::Throughput => ops / unit.from_nanos(elapsed),
        }
    }
}

/// Per-benchmark iteration settings with option overrides applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IterationPlan {
    /// Effective measurement mode.
    pub mode: Mode,
    /// Effective output unit.
    pub time_unit: TimeUnit,
    /// Untimed iterations.
    pub warmup_iterations: u32,
    /// Duration of each warmup iteration.
    pub warmup_time: Duration,
    /// Timed iterations.
    pub measurement_iterations: u32,
    /// Duration of each measurement iteration.
    pub measurement_time: Duration,
}

impl IterationPlan {
    /// Combines a benchmark's defaults with run options.
    pub fn resolve(def: &BenchmarkDef, opts: &Options) -> Self {
        Self {
            mode: opts.mode.unwrap_or(def.mode()),
            time_unit: opts.time_unit.unwrap_or(def.time_unit()),
            warmup_iterations: opts.warmup_iterations,
            warmup_time: opts.warmup_time,
            measurement_iterations: opts.measurement_iterations,
            measurement_time: opts.measurement_time,
        }
    }

    /// Score unit label, e.g. `us/op` or `ops/us`.
    pub fn score_unit(&self) -> String {
        let unit = self.time_unit.abbreviation();
        match self.mode {
            Mode::Throughput => format!("ops/{unit}"),
            Mode::AverageTime | Mode::SingleShotTime => format!("{unit}/op"),
        }
    }
}

/// Runs every warmup then measurement iteration of `def`.
///
/// `on_result` sees each iteration as soon as it finishes; an error from it
/// stops the run.
pub fn run_iterations<F>(def: &BenchmarkDef, plan: &IterationPlan, mut on_result: F) -> Result<()>
where
    F: FnMut(IterationResult) -> Result<()>,
{
    let phases = [
        (Phase::Warmup, plan.warmup_iterations, plan.warmup_time),
        (Phase::Measurement, plan.measurement_iterations, plan.measurement_time),
    ];
    for (phase, count, time) in phases {
        for index in 1..=count {
            let result = run_one(def, plan.mode, phase, index, time);
            debug!(
                benchmark = def.name(),
                ?phase,
                index,
                ops = result.ops,
                elapsed_nanos = result.elapsed_nanos,
                "iteration finished"
            );
            on_result(result)?;
        }
    }
    Ok(())
}

fn run_one(
    def: &BenchmarkDef,
    mode: Mode,
    phase: Phase,
    index: u32,
    time: Duration,
) -> IterationResult {
    let start = Instant::now();
    let mut ops = 0u64;
    loop {
        def.invoke();
        ops += 1;
        if mode.is_single_shot() || start.elapsed() >= time {
            break;
        }
    }
    let elapsed_nanos = u64::try_from(start.elapsed().as_nanos()).unwrap_or(u64::MAX);
    IterationResult {
        phase,
        index,
        ops,
        elapsed_nanos,
    }
}
