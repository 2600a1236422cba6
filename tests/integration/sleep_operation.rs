#![allow(missing_docs)]

use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use firstbench::harness::{Options, RunState, Runner};
use firstbench::interrupt::Interrupter;
use firstbench::settings::HarnessSettings;
use firstbench::sleep_bench::{self, SLEEP_A_WHILE, SLEEP_DURATION};
use firstbench::BenchError;

#[test]
fn interrupt_during_sleep_returns_sentinel() {
    let (tx, rx) = mpsc::channel();
    let sleeper = thread::spawn(move || {
        tx.send(Interrupter::current()).expect("send handle");
        let start = Instant::now();
        (sleep_bench::sleep_a_while(), start.elapsed())
    });

    let handle = rx.recv().expect("handle");
    thread::sleep(Duration::from_millis(10));
    handle.interrupt();

    let (value, elapsed) = sleeper.join().expect("sleeper thread");
    assert_eq!(value, 0);
    assert!(elapsed < Duration::from_secs(1));
}

#[test]
fn repeated_interrupts_never_fail() {
    for _ in 0..5 {
        Interrupter::current().interrupt();
        assert_eq!(sleep_bench::sleep_a_while(), 0);
    }
    let start = Instant::now();
    assert_eq!(sleep_bench::sleep_a_while(), 0);
    assert!(start.elapsed() >= SLEEP_DURATION);
}

#[test]
fn in_process_run_measures_the_sleep() {
    let registry = sleep_bench::benchmarks().expect("registry");
    let options = Options::builder()
        .include(sleep_bench::BENCHMARK_GROUP)
        .forks(0)
        .warmup_iterations(1)
        .warmup_time(Duration::from_millis(60))
        .measurement_iterations(2)
        .measurement_time(Duration::from_millis(60))
        .build()
        .expect("options");
    let mut runner = Runner::new(options);
    let results = runner
        .run_to(&registry, &mut Vec::new())
        .expect("run succeeds");

    assert_eq!(runner.state(), RunState::Completed);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].benchmark, SLEEP_A_WHILE);
    for score in &results[0].samples {
        assert!(*score >= 50_000.0, "score {score} us/op below the sleep time");
    }
}

#[test]
fn unresolvable_target_is_fatal() {
    let registry = sleep_bench::benchmarks().expect("registry");
    let options = Options::builder()
        .include("NoSuchBenchmark")
        .forks(1)
        .build()
        .expect("options");
    let mut runner = Runner::new(options);
    let err = runner.run_to(&registry, &mut Vec::new()).unwrap_err();
    assert!(matches!(err, BenchError::TargetNotFound { .. }));
    assert_eq!(runner.state(), RunState::Failed);
}

#[test]
fn entry_configuration_is_idempotent() {
    let settings = HarnessSettings::default();
    let first = sleep_bench::run_options(&settings).expect("options");
    let second = sleep_bench::run_options(&settings).expect("options");
    assert_eq!(first, second);
    assert_eq!(first.forks, sleep_bench::FORKS);
    assert_eq!(first.warmup_iterations, sleep_bench::WARMUP_ITERATIONS);
    assert_eq!(first.measurement_iterations, sleep_bench::MEASUREMENT_ITERATIONS);
}
