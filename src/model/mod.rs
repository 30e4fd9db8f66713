//! Problem model: platforms, tasks, visibility windows, resource budgets and
//! the objective, frozen into an immutable [`ProblemInstance`].

mod agility;
mod error;
mod instance;
mod objective;
mod platform;
mod task;

pub use agility::{AgilityModel, Orientation};
pub use error::InstanceError;
pub use instance::{InstanceBuilder, ProblemInstance};
pub use objective::{ObjectiveKind, ObjectiveSpec};
pub use platform::{BudgetCurve, BudgetStep, Platform};
pub use task::{ResourceCost, Task, TaskDuration, VisibilityWindow};
