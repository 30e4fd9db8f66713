use thiserror::Error;

use crate::window::{IntervalError, TimeInterval};
use crate::Id;

/// Errors raised while constructing a [`ProblemInstance`](super::ProblemInstance).
///
/// All of them are fatal: an instance that fails to build never reaches a
/// scheduler.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InstanceError {
    #[error(transparent)]
    InvalidInterval(#[from] IntervalError),

    #[error("Task {task} references unknown platform {platform}")]
    ReferenceIntegrity { task: Id, platform: Id },

    #[error("Task ID already exists: {0}")]
    DuplicateTaskId(Id),

    #[error("Platform ID already exists: {0}")]
    DuplicatePlatformId(Id),

    #[error("Window {window} of task {task} lies outside the planning horizon {horizon}")]
    WindowOutsideHorizon {
        task: Id,
        window: TimeInterval,
        horizon: TimeInterval,
    },

    #[error("Invalid {field} for {owner}: {value}")]
    InvalidValue {
        owner: Id,
        field: &'static str,
        value: f64,
    },

    #[error("Task {task} consumes resource '{resource}' which platform {platform} does not provide")]
    UnknownResource {
        task: Id,
        platform: Id,
        resource: String,
    },

    #[error("Unknown objective kind: {0}")]
    UnknownObjective(String),
}
