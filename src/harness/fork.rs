//! Worker processes.
//!
//! The runner re-executes a binary once per fork with a JSON [`ForkRequest`]
//! in [`FORK_REQUEST_VAR`]. The worker answers on stdout with one JSON
//! [`ForkEvent`] per line: every iteration in order, then `Complete`.

use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{BenchError, Result};
use crate::harness::iteration::{run_iterations, IterationPlan, IterationResult};
use crate::harness::options::Options;
use crate::harness::registry::Registry;

/// Environment variable carrying the fork request to a worker.
pub const FORK_REQUEST_VAR: &str = "FIRSTBENCH_FORK_REQUEST";

/// What a worker process must run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForkRequest {
    /// Exact benchmark name.
    pub benchmark: String,
    /// 1-based fork number, for logging.
    pub fork: u32,
    /// Options of the parent run.
    pub options: Options,
}

/// One line of worker output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ForkEvent {
    /// A finished iteration.
    Iteration(IterationResult),
    /// All iterations were reported.
    Complete,
}

/// Serves a fork request when this process was started as a worker.
///
/// Returns `Ok(false)` when [`FORK_REQUEST_VAR`] is not set, in which case
/// the caller should carry on as the parent.
pub fn serve_if_requested(registry: &Registry) -> Result<bool> {
    let Some(raw) = std::env::var_os(FORK_REQUEST_VAR) else {
        return Ok(false);
    };
    let raw = raw
        .into_string()
        .map_err(|_| BenchError::Protocol(format!("{FORK_REQUEST_VAR} is not valid UTF-8")))?;
    let request: ForkRequest = serde_json::from_str(&raw)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    serve(registry, &request, &mut out)?;
    Ok(true)
}

/// Runs `request` against `registry`, streaming events to `out`.
pub fn serve<W: Write>(registry: &Registry, request: &ForkRequest, out: &mut W) -> Result<()> {
    let def = registry
        .get(&request.benchmark)
        .ok_or_else(|| BenchError::TargetNotFound {
            includes: vec![request.benchmark.clone()],
        })?;
    info!(benchmark = def.name(), fork = request.fork, "worker started");
    let plan = IterationPlan::resolve(def, &request.options);
    run_iterations(def, &plan, |result| {
        write_event(out, &ForkEvent::Iteration(result))
    })?;
    write_event(out, &ForkEvent::Complete)
}

fn write_event<W: Write>(out: &mut W, event: &ForkEvent) -> Result<()> {
    serde_json::to_writer(&mut *out, event)?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

/// Runs one fork of `benchmark` in a child process of `worker`.
///
/// Each reported iteration is passed to `on_result` as it arrives.
pub fn run_fork<F>(
    worker: &Path,
    benchmark: &str,
    fork: u32,
    options: &Options,
    on_result: F,
) -> Result<()>
where
    F: FnMut(IterationResult) -> Result<()>,
{
    let request = ForkRequest {
        benchmark: benchmark.to_string(),
        fork,
        options: options.clone(),
    };
    debug!(worker = %worker.display(), benchmark, fork, "spawning fork");
    let mut child = Command::new(worker)
        .env(FORK_REQUEST_VAR, serde_json::to_string(&request)?)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|source| BenchError::Spawn { source })?;

    let outcome = match child.stdout.take() {
        Some(stdout) => consume_events(BufReader::new(stdout), on_result),
        None => Err(BenchError::Protocol("worker stdout was not captured".into())),
    };
    let complete = match outcome {
        Ok(complete) => complete,
        Err(err) => {
            // the worker may still be writing; its kill status says nothing about `err`
            if let Err(kill_err) = child.kill() {
                warn!(%kill_err, benchmark, fork, "failed to kill fork worker");
            }
            if let Err(wait_err) = child.wait() {
                warn!(%wait_err, benchmark, fork, "failed to reap fork worker");
            }
            return Err(err);
        }
    };

    let status = child.wait()?;
    if !status.success() {
        return Err(BenchError::ForkFailed {
            benchmark: benchmark.to_string(),
            fork,
            status,
        });
    }
    if !complete {
        return Err(incomplete_stream());
    }
    Ok(())
}

/// Consumes a worker's event stream up to and including `Complete`.
pub fn read_events<R, F>(reader: R, on_result: F) -> Result<()>
where
    R: BufRead,
    F: FnMut(IterationResult) -> Result<()>,
{
    if consume_events(reader, on_result)? {
        Ok(())
    } else {
        Err(incomplete_stream())
    }
}

/// Returns whether `Complete` was seen before the stream closed.
fn consume_events<R, F>(reader: R, mut on_result: F) -> Result<bool>
where
    R: BufRead,
    F: FnMut(IterationResult) -> Result<()>,
{
    let mut complete = false;
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        if complete {
            return Err(BenchError::Protocol(format!(
                "unexpected output after completion: {line:?}"
            )));
        }
        let event: ForkEvent = serde_json::from_str(&line)
            .map_err(|err| BenchError::Protocol(format!("malformed event {line:?}: {err}")))?;
        match event {
            ForkEvent::Iteration(result) => on_result(result)?,
            ForkEvent::Complete => complete = true,
        }
    }
    Ok(complete)
}

fn incomplete_stream() -> BenchError {
    BenchError::Protocol("worker exited before reporting completion".into())
}

/// Whether this process was started as a fork worker.
pub fn is_worker() -> bool {
    std::env::var_os(FORK_REQUEST_VAR).is_some()
}
