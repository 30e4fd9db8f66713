//! Planning algorithms and the registry that names them.
//!
//! Every algorithm implements [`Scheduler`]. The built-ins share the
//! [`Planner`] insertion decoder, so anything they return is feasible:
//!
//! | Name | Type |
//! |---|---|
//! | `greedy-reward` | [`GreedyByReward`] |
//! | `greedy-window-count` | [`GreedyByWindowCount`] |
//! | `local-search` | [`LocalSearch`] |
//! | `exact` | [`ExactSolver`] |

mod budget;
mod error;
mod exact;
mod greedy;
mod local_search;
mod placement;
mod registry;

pub use budget::TimeBudget;
pub use error::SchedulerError;
pub use exact::ExactSolver;
pub use greedy::{GreedyByReward, GreedyByWindowCount};
pub use local_search::{LocalSearch, LocalSearchConfig};
pub use placement::Planner;
pub use registry::{RegistryError, SchedulerFactory, SchedulerRegistry};

use crate::model::ProblemInstance;
use crate::schedule::Schedule;

/// A planning algorithm.
///
/// Implementations must be deterministic for a given `seed` and must give up
/// with [`SchedulerError::TimeoutExceeded`] once `budget` expires, returning
/// what they had committed to so far. Any other failure is a
/// [`SchedulerError::Fault`]. A panic inside `plan` is treated as a fault by
/// the benchmark runner.
pub trait Scheduler: Send {
    /// Registry name.
    fn name(&self) -> &str;

    /// Builds a schedule for `instance`.
    fn plan(&self, instance: &ProblemInstance, budget: &TimeBudget, seed: u64) -> Result<Schedule, SchedulerError>;
}
