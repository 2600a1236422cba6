//! A small benchmark runner with warmup, measurement and process forks.
//!
//! Benchmarks are registered explicitly in a [`Registry`], selected and
//! tuned by an immutable [`Options`] value and executed by a [`Runner`].
//! With `forks > 0` each fork runs in a fresh child process (see [`fork`]);
//! with `forks == 0` iterations run in the calling process.

pub mod fork;
pub mod iteration;
pub mod options;
pub mod registry;
pub mod report;
pub mod runner;
pub mod stats;

pub use iteration::{IterationPlan, IterationResult, Phase};
pub use options::{Mode, Options, OptionsBuilder, Scope, TimeUnit};
pub use registry::{BenchmarkDef, Registry};
pub use runner::{RunResult, RunState, Runner};
pub use stats::Statistics;
