//! Benchmark harness.
//!
//! A [`BenchmarkRunner`] evaluates every (instance, scheduler, seed) triple.
//! Each `plan` call runs on its own supervised thread; the returned schedule
//! is judged by the feasibility engine and scored. Configuration mistakes
//! fail the whole run up front, while per-evaluation problems (timeouts,
//! faults, panics, infeasible schedules) become rows of the
//! [`BenchmarkReport`].

mod config;
mod error;
mod report;
mod result;
mod runner;
mod supervisor;

pub use config::BenchmarkConfig;
pub use error::BenchmarkError;
pub use report::{BenchmarkReport, InstanceSummary, RunStats, SchedulerSummary};
pub use result::{BenchmarkResult, Diagnostics, Outcome};
pub use runner::BenchmarkRunner;

#[cfg(test)]
mod tests;
