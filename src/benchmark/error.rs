use thiserror::Error;

use crate::algorithms::RegistryError;

/// Errors that stop a benchmark before any evaluation runs.
///
/// Per-evaluation problems (infeasible schedules, timeouts, faults) are
/// recorded in the report instead.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BenchmarkError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Invalid benchmark configuration: {0}")]
    InvalidConfig(String),

    #[error("No instances to benchmark")]
    NoInstances,
}
