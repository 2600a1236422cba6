//! Micro-benchmark harness measuring a fixed-duration sleep.
//!
//! [`sleep_bench`] holds the benchmarked operation and the fixed run
//! configuration; [`harness`] is the runner it is handed to.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod harness;
pub mod interrupt;
pub mod logging;
pub mod settings;
pub mod sleep_bench;

pub use error::{BenchError, Result};
