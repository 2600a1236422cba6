//! Human-readable run report and JSON result export.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use crate::error::Result;
use crate::harness::iteration::{IterationPlan, IterationResult, Phase};
use crate::harness::options::Options;
use crate::harness::registry::BenchmarkDef;
use crate::harness::runner::RunResult;

/// Formats an iteration duration the way the run header shows it.
pub fn format_duration(d: Duration) -> String {
    let micros = d.as_micros();
    if micros < 1_000 {
        format!("{micros} us")
    } else if micros < 1_000_000 {
        if micros % 1_000 == 0 {
            format!("{} ms", micros / 1_000)
        } else {
            format!("{:.2} ms", micros as f64 / 1_000.0)
        }
    } else if micros % 1_000_000 == 0 {
        format!("{} s", micros / 1_000_000)
    } else {
        format!("{:.2} s", micros as f64 / 1_000_000.0)
    }
}

pub(crate) fn write_run_header<W: Write>(
    out: &mut W,
    def: &BenchmarkDef,
    plan: &IterationPlan,
    opts: &Options,
) -> Result<()> {
    writeln!(out, "# Benchmark: {}", def.name())?;
    writeln!(out, "# Benchmark mode: {}", plan.mode)?;
    writeln!(out, "# Output unit: {}", plan.score_unit())?;
    if plan.warmup_iterations == 0 {
        writeln!(out, "# Warmup: <none>")?;
    } else {
        writeln!(
            out,
            "# Warmup: {} iterations, {} each",
            plan.warmup_iterations,
            format_duration(plan.warmup_time)
        )?;
    }
    writeln!(
        out,
        "# Measurement: {} iterations, {} each",
        plan.measurement_iterations,
        format_duration(plan.measurement_time)
    )?;
    writeln!(out, "# State scope: {:?}", def.scope())?;
    writeln!(out, "# Forks: {}", opts.forks)?;
    Ok(())
}

pub(crate) fn write_fork_header<W: Write>(out: &mut W, fork: u32, forks: u32) -> Result<()> {
    writeln!(out)?;
    if forks == 0 {
        writeln!(out, "# Fork: N/A, test runs in the host process")?;
    } else {
        writeln!(out, "# Fork: {fork} of {forks}")?;
    }
    Ok(())
}

pub(crate) fn write_iteration<W: Write>(
    out: &mut W,
    plan: &IterationPlan,
    result: &IterationResult,
) -> Result<()> {
    let prefix = match result.phase {
        Phase::Warmup => "# Warmup Iteration",
        Phase::Measurement => "Iteration",
    };
    writeln!(
        out,
        "{prefix} {:>3}: {:.3} {}",
        result.index,
        result.score(plan.mode, plan.time_unit),
        plan.score_unit()
    )?;
    out.flush()?;
    Ok(())
}

pub(crate) fn write_result<W: Write>(out: &mut W, result: &RunResult) -> Result<()> {
    let stats = &result.statistics;
    writeln!(out)?;
    writeln!(out, "Result \"{}\":", result.benchmark)?;
    match stats.std_dev {
        Some(sd) => writeln!(
            out,
            "  {:.3} ±(sd) {:.3} {}",
            stats.mean, sd, result.score_unit
        )?,
        None => writeln!(out, "  {:.3} {}", stats.mean, result.score_unit)?,
    }
    writeln!(
        out,
        "  (min, avg, max) = ({:.3}, {:.3}, {:.3})",
        stats.min, stats.mean, stats.max
    )?;
    writeln!(out)?;
    Ok(())
}

/// Writes the closing summary table.
pub fn write_summary<W: Write>(out: &mut W, results: &[RunResult]) -> Result<()> {
    let name_width = results
        .iter()
        .map(|r| r.benchmark.len())
        .chain(std::iter::once("Benchmark".len()))
        .max()
        .unwrap_or_default();
    let rows: Vec<[String; 5]> = results
        .iter()
        .map(|r| {
            [
                r.mode.short_label().to_string(),
                r.statistics.count.to_string(),
                format!("{:.3}", r.statistics.mean),
                r.statistics
                    .std_dev
                    .map(|sd| format!("± {sd:.3}"))
                    .unwrap_or_default(),
                r.score_unit.clone(),
            ]
        })
        .collect();
    let width = |col: usize, header: &str| {
        rows.iter()
            .map(|row| row[col].chars().count())
            .chain(std::iter::once(header.len()))
            .max()
            .unwrap_or_default()
    };
    let (mode_w, cnt_w, score_w, err_w) = (
        width(0, "Mode"),
        width(1, "Cnt"),
        width(2, "Score"),
        width(3, "Error"),
    );

    writeln!(out)?;
    writeln!(
        out,
        "{:<name_width$}  {:>mode_w$}  {:>cnt_w$}  {:>score_w$}  {:>err_w$}  Units",
        "Benchmark", "Mode", "Cnt", "Score", "Error"
    )?;
    for (result, row) in results.iter().zip(&rows) {
        writeln!(
            out,
            "{:<name_width$}  {:>mode_w$}  {:>cnt_w$}  {:>score_w$}  {:>err_w$}  {}",
            result.benchmark, row[0], row[1], row[2], row[3], row[4]
        )?;
    }
    out.flush()?;
    Ok(())
}

/// Writes `results` as pretty JSON to `path`, creating parent directories.
pub fn write_json(path: &Path, results: &[RunResult]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_vec_pretty(results)?)?;
    Ok(())
}
