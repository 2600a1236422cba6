#![allow(missing_docs)]

// Runs in its own test binary: the fork request variable is process-wide and
// would leak into every forking test sharing the process.

use std::time::Duration;

use firstbench::harness::fork::FORK_REQUEST_VAR;
use firstbench::harness::{Options, Registry, RunState, Runner};
use firstbench::BenchError;

fn options(forks: u32) -> Options {
    Options::builder()
        .include("Noop")
        .forks(forks)
        .warmup_iterations(0)
        .measurement_iterations(1)
        .measurement_time(Duration::from_millis(1))
        .build()
        .expect("options")
}

#[test]
fn worker_refuses_to_fork_again() {
    let mut registry = Registry::new();
    registry.register("Noop.noop", || ()).expect("register");
    std::env::set_var(FORK_REQUEST_VAR, "{}");

    let dir = tempfile::tempdir().expect("tempdir");
    let mut runner = Runner::new(options(1)).with_worker(dir.path().join("never-spawned"));
    let err = runner.run_to(&registry, &mut Vec::new()).unwrap_err();
    match err {
        BenchError::Protocol(msg) => assert!(msg.contains("nested fork"), "{msg}"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(runner.state(), RunState::Failed);

    let mut in_process = Runner::new(options(0));
    let results = in_process.run_to(&registry, &mut Vec::new()).expect("in-process run");
    assert_eq!(results.len(), 1);
    assert_eq!(in_process.state(), RunState::Completed);
}
