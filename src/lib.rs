//! satplan - Satellite task planning core and benchmark harness
//!
//! Models the Satellite Task Planning Problem (platforms with resource
//! budgets and agility limits, tasks with visibility windows), judges
//! candidate schedules with a deterministic feasibility oracle, scores them
//! under a declared objective, and benchmarks pluggable planning algorithms
//! under per-run time budgets.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use satplan::benchmark::{BenchmarkConfig, BenchmarkRunner};
//! use satplan::generator::{generate, GeneratorConfig};
//!
//! let instance = Arc::new(generate(&GeneratorConfig::new(2, 100).unwrap()).unwrap());
//! let config = BenchmarkConfig::default().with_time_budget(Duration::from_secs(2));
//! let report = BenchmarkRunner::with_builtins(config)
//!     .run(&[instance], &["greedy-reward", "greedy-window-count"])
//!     .unwrap();
//! assert_eq!(report.len(), 2);
//! assert!(report.records().iter().all(|r| r.outcome().is_feasible()));
//! ```

pub mod algorithms;
pub mod benchmark;
pub mod feasibility;
pub mod generator;
#[cfg(feature = "serde")]
pub mod io;
pub mod model;
pub mod schedule;
pub mod scoring;
pub mod units;
pub mod window;

// Re-export unit conversion traits for ergonomic use
pub use units::{convert, SameDim};

/// Identifier type used for tasks and platforms.
pub type Id = String;
