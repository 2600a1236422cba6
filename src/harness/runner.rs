//! The run driver: resolve, execute per fork, aggregate.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{error, info};

use crate::error::{BenchError, Result};
use crate::harness::fork;
use crate::harness::iteration::{run_iterations, IterationPlan, IterationResult, Phase};
use crate::harness::options::{Mode, Options, TimeUnit};
use crate::harness::registry::{BenchmarkDef, Registry};
use crate::harness::report;
use crate::harness::stats::Statistics;

/// Lifecycle of a [`Runner`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    /// `run` has not been called.
    NotStarted,
    /// A run is in progress.
    Running,
    /// The last run finished successfully.
    Completed,
    /// The last run stopped with an error.
    Failed,
}

/// Aggregated measurement of one benchmark.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunResult {
    /// Benchmark name.
    pub benchmark: String,
    /// Mode the scores were measured in.
    pub mode: Mode,
    /// Unit the scores are expressed in.
    pub time_unit: TimeUnit,
    /// Score unit label, e.g. `us/op`.
    pub score_unit: String,
    /// Forks the samples were collected from; zero means in-process.
    pub forks: u32,
    /// Measurement scores from every fork, in order.
    pub samples: Vec<f64>,
    /// Summary of `samples`.
    pub statistics: Statistics,
}

/// Executes the benchmarks selected by an [`Options`] value.
#[derive(Debug)]
pub struct Runner {
    options: Options,
    state: RunState,
    worker: Option<PathBuf>,
    result_path: Option<PathBuf>,
}

impl Runner {
    /// Creates a runner for `options`.
    pub fn new(options: Options) -> Self {
        Self {
            options,
            state: RunState::NotStarted,
            worker: None,
            result_path: None,
        }
    }

    /// Uses `path` as the fork worker instead of the current executable.
    pub fn with_worker(mut self, path: impl Into<PathBuf>) -> Self {
        self.worker = Some(path.into());
        self
    }

    /// Writes the results as JSON to `path` after a successful run.
    pub fn with_result_path(mut self, path: Option<PathBuf>) -> Self {
        self.result_path = path;
        self
    }

    /// Options this runner was built with.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Runs the selected benchmarks, reporting to stdout.
    pub fn run(&mut self, registry: &Registry) -> Result<Vec<RunResult>> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.run_to(registry, &mut out)
    }

    /// Runs the selected benchmarks, reporting to `out`.
    pub fn run_to<W: Write>(&mut self, registry: &Registry, out: &mut W) -> Result<Vec<RunResult>> {
        self.state = RunState::Running;
        info!(
            includes = ?self.options.includes,
            forks = self.options.forks,
            warmup_iterations = self.options.warmup_iterations,
            measurement_iterations = self.options.measurement_iterations,
            "benchmark run started"
        );
        match self.execute(registry, out) {
            Ok(results) => {
                self.state = RunState::Completed;
                info!(benchmarks = results.len(), "benchmark run completed");
                Ok(results)
            }
            Err(err) => {
                self.state = RunState::Failed;
                error!(%err, "benchmark run failed");
                Err(err)
            }
        }
    }

    fn execute<W: Write>(&self, registry: &Registry, out: &mut W) -> Result<Vec<RunResult>> {
        let defs = registry.resolve(&self.options.includes)?;
        if self.options.forks > 0 && fork::is_worker() {
            return Err(BenchError::Protocol(format!(
                "nested fork: {} is set, serve the request instead of forking again",
                fork::FORK_REQUEST_VAR
            )));
        }
        let worker = match (&self.worker, self.options.forks) {
            (_, 0) => None,
            (Some(path), _) => Some(path.clone()),
            (None, _) => {
                Some(std::env::current_exe().map_err(|source| BenchError::Spawn { source })?)
            }
        };

        let mut results = Vec::with_capacity(defs.len());
        for def in defs {
            writeln!(out)?;
            let result = self.run_benchmark(def, worker.as_deref(), out)?;
            report::write_result(out, &result)?;
            results.push(result);
        }
        report::write_summary(out, &results)?;

        if let Some(path) = &self.result_path {
            report::write_json(path, &results)?;
            info!(path = %path.display(), "wrote result file");
        }
        Ok(results)
    }

    fn run_benchmark<W: Write>(
        &self,
        def: &BenchmarkDef,
        worker: Option<&Path>,
        out: &mut W,
    ) -> Result<RunResult> {
        let opts = &self.options;
        let plan = IterationPlan::resolve(def, opts);
        report::write_run_header(out, def, &plan, opts)?;

        let mut samples = Vec::new();
        for fork in 1..=opts.forks.max(1) {
            report::write_fork_header(out, fork, opts.forks)?;
            let record = |result: IterationResult| -> Result<()> {
                report::write_iteration(out, &plan, &result)?;
                if result.phase == Phase::Measurement {
                    samples.push(result.score(plan.mode, plan.time_unit));
                }
                Ok(())
            };
            match worker {
                Some(worker) => fork::run_fork(worker, def.name(), fork, opts, record)?,
                None => run_iterations(def, &plan, record)?,
            }
        }

        let expected = plan.measurement_iterations as usize * opts.forks.max(1) as usize;
        if samples.len() != expected {
            return Err(BenchError::Protocol(format!(
                "expected {expected} measurement iterations for '{}', got {}",
                def.name(),
                samples.len()
            )));
        }
        let statistics = Statistics::from_samples(&samples).ok_or_else(|| {
            BenchError::Protocol(format!("no measurements recorded for '{}'", def.name()))
        })?;
        Ok(RunResult {
            benchmark: def.name().to_string(),
            mode: plan.mode,
            time_unit: plan.time_unit,
            score_unit: plan.score_unit(),
            forks: opts.forks,
            samples,
            statistics,
        })
    }
}
