#![allow(missing_docs)]

use std::fs;
use std::time::Duration;

use assert_cmd::cargo::cargo_bin_cmd;
use firstbench::harness::fork::{ForkEvent, ForkRequest, FORK_REQUEST_VAR};
use firstbench::harness::{Options, Phase};
use firstbench::settings::{ITERATION_MS_VAR, RESULT_PATH_VAR};
use firstbench::sleep_bench::SLEEP_A_WHILE;
use serde_json::Value;
use tempfile::TempDir;

fn stdout_of(output: &std::process::Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("utf-8 stdout")
}

#[test]
fn entry_point_runs_one_fork_and_reports() {
    let dir = TempDir::new().expect("tempdir");
    let result_path = dir.path().join("result.json");

    let output = cargo_bin_cmd!("first-bench")
        .env(ITERATION_MS_VAR, "60")
        .env(RESULT_PATH_VAR, &result_path)
        .assert()
        .success()
        .get_output()
        .clone();
    let stdout = stdout_of(&output);

    assert!(stdout.contains(&format!("# Benchmark: {SLEEP_A_WHILE}")));
    assert!(stdout.contains("# Benchmark mode: Average time, time/op"));
    assert!(stdout.contains("# Fork: 1 of 1"));
    assert_eq!(stdout.matches("# Warmup Iteration").count(), 3);
    assert_eq!(
        stdout
            .lines()
            .filter(|l| l.starts_with("Iteration "))
            .count(),
        3
    );
    let summary = stdout
        .lines()
        .find(|l| l.starts_with(SLEEP_A_WHILE))
        .expect("summary row");
    assert!(summary.contains("avgt"));
    assert!(summary.ends_with("us/op"));

    let json: Value =
        serde_json::from_slice(&fs::read(&result_path).expect("result file")).expect("valid json");
    assert_eq!(json[0]["benchmark"], SLEEP_A_WHILE);
    assert_eq!(json[0]["forks"], 1);
    assert_eq!(json[0]["statistics"]["count"], 3);
    let mean = json[0]["statistics"]["mean"].as_f64().expect("mean");
    assert!(mean >= 50_000.0, "mean {mean} us/op is below the sleep time");
}

#[test]
fn arguments_are_ignored() {
    cargo_bin_cmd!("first-bench")
        .env(ITERATION_MS_VAR, "50")
        .args(["--definitely-not-a-flag", "extra"])
        .assert()
        .success();
}

#[test]
fn invalid_setting_exits_non_zero() {
    let output = cargo_bin_cmd!("first-bench")
        .env(ITERATION_MS_VAR, "soon")
        .assert()
        .failure()
        .get_output()
        .clone();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains(ITERATION_MS_VAR), "{stderr}");
}

#[test]
fn worker_mode_streams_events() {
    let options = Options::builder()
        .forks(1)
        .warmup_iterations(1)
        .warmup_time(Duration::from_millis(10))
        .measurement_iterations(2)
        .measurement_time(Duration::from_millis(10))
        .build()
        .expect("options");
    let request = ForkRequest {
        benchmark: SLEEP_A_WHILE.to_string(),
        fork: 1,
        options,
    };

    let output = cargo_bin_cmd!("first-bench")
        .env(FORK_REQUEST_VAR, serde_json::to_string(&request).expect("request"))
        .assert()
        .success()
        .get_output()
        .clone();
    let events: Vec<ForkEvent> = stdout_of(&output)
        .lines()
        .map(|l| serde_json::from_str(l).expect("event"))
        .collect();

    assert_eq!(events.len(), 4);
    assert_eq!(events.last(), Some(&ForkEvent::Complete));
    let phases: Vec<Phase> = events
        .iter()
        .filter_map(|e| match e {
            ForkEvent::Iteration(r) => Some(r.phase),
            ForkEvent::Complete => None,
        })
        .collect();
    assert_eq!(phases, [Phase::Warmup, Phase::Measurement, Phase::Measurement]);
}

#[test]
fn worker_with_unknown_target_exits_non_zero() {
    let request = ForkRequest {
        benchmark: "SleepBenchmark.missing".to_string(),
        fork: 1,
        options: Options::builder().build().expect("options"),
    };
    cargo_bin_cmd!("first-bench")
        .env(FORK_REQUEST_VAR, serde_json::to_string(&request).expect("request"))
        .assert()
        .failure();
}
