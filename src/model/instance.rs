//! Immutable problem instance and its validating builder.

use std::collections::HashMap;

use log::warn;

use super::error::InstanceError;
use super::objective::ObjectiveSpec;
use super::platform::Platform;
use super::task::{Task, TaskDuration};
use crate::window::{IntervalSet, TimeInterval};
use crate::Id;

/// A closed Satellite Task Planning Problem.
///
/// Built only through [`InstanceBuilder::build`], which validates every
/// invariant. Once built nothing can mutate it, so it is shared between
/// concurrent scheduler runs (usually behind an `Arc`).
#[derive(Debug, Clone)]
pub struct ProblemInstance {
    name: String,
    horizon: TimeInterval,
    objective: ObjectiveSpec,
    platforms: Vec<Platform>,
    tasks: Vec<Task>,
    platform_index: HashMap<Id, usize>,
    task_index: HashMap<Id, usize>,
}

impl ProblemInstance {
    pub fn builder(name: impl Into<String>, horizon: TimeInterval) -> InstanceBuilder {
        InstanceBuilder::new(name, horizon)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn horizon(&self) -> TimeInterval {
        self.horizon
    }

    pub fn objective(&self) -> &ObjectiveSpec {
        &self.objective
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn platform(&self, id: &str) -> Option<&Platform> {
        self.platform_index.get(id).map(|&i| &self.platforms[i])
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.task_index.get(id).map(|&i| &self.tasks[i])
    }

    /// Position of the task in [`tasks`](Self::tasks).
    pub fn task_position(&self, id: &str) -> Option<usize> {
        self.task_index.get(id).copied()
    }

    /// Times at which at least one task window is open, on any platform.
    pub fn visibility(&self) -> IntervalSet {
        self.tasks
            .iter()
            .flat_map(|t| t.windows().iter().map(|w| w.interval))
            .collect()
    }

    /// Tasks that no schedule can ever contain: no admissible window, or no
    /// window long enough for their fixed duration.
    pub fn unschedulable_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| !t.has_usable_window())
    }
}

/// Collects platforms, tasks and the objective, then validates them.
#[derive(Debug, Clone)]
pub struct InstanceBuilder {
    name: String,
    horizon: TimeInterval,
    objective: ObjectiveSpec,
    platforms: Vec<Platform>,
    tasks: Vec<Task>,
}

impl InstanceBuilder {
    pub fn new(name: impl Into<String>, horizon: TimeInterval) -> Self {
        Self {
            name: name.into(),
            horizon,
            objective: ObjectiveSpec::default(),
            platforms: Vec::new(),
            tasks: Vec::new(),
        }
    }

    pub fn objective(mut self, objective: ObjectiveSpec) -> Self {
        self.objective = objective;
        self
    }

    pub fn platform(mut self, platform: Platform) -> Self {
        self.platforms.push(platform);
        self
    }

    pub fn platforms(mut self, platforms: impl IntoIterator<Item = Platform>) -> Self {
        self.platforms.extend(platforms);
        self
    }

    pub fn task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn tasks(mut self, tasks: impl IntoIterator<Item = Task>) -> Self {
        self.tasks.extend(tasks);
        self
    }

    /// Validates and freezes the instance.
    ///
    /// # Errors
    ///
    /// - duplicate platform or task ids
    /// - a window naming a platform absent from the instance
    /// - a window outside the horizon
    /// - negative or non-finite priorities, durations, costs, agility values,
    ///   objective resource weights; quality factors outside `[0, 1]`
    /// - a positive cost for a resource that a platform the task may run on
    ///   does not budget
    pub fn build(self) -> Result<ProblemInstance, InstanceError> {
        let InstanceBuilder {
            name,
            horizon,
            objective,
            platforms,
            mut tasks,
        } = self;

        for (resource, weight) in objective.resource_weights() {
            if !weight.is_finite() || weight < 0.0 {
                return Err(InstanceError::InvalidValue {
                    owner: resource.to_string(),
                    field: "resource weight",
                    value: weight,
                });
            }
        }

        let mut platform_index = HashMap::with_capacity(platforms.len());
        for (i, platform) in platforms.iter().enumerate() {
            if platform_index.insert(platform.id().to_string(), i).is_some() {
                return Err(InstanceError::DuplicatePlatformId(platform.id().to_string()));
            }
            platform
                .agility()
                .validate()
                .map_err(|value| InstanceError::InvalidValue {
                    owner: platform.id().to_string(),
                    field: "agility",
                    value,
                })?;
        }

        let mut task_index = HashMap::with_capacity(tasks.len());
        for (i, task) in tasks.iter_mut().enumerate() {
            if task_index.insert(task.id().to_string(), i).is_some() {
                return Err(InstanceError::DuplicateTaskId(task.id().to_string()));
            }
            validate_task(task, &platforms, &platform_index, &horizon)?;
            task.sort_windows();
        }

        let instance = ProblemInstance {
            name,
            horizon,
            objective,
            platforms,
            tasks,
            platform_index,
            task_index,
        };

        for task in instance.unschedulable_tasks() {
            warn!(
                "instance {}: task {} has no usable visibility window",
                instance.name,
                task.id()
            );
        }

        Ok(instance)
    }
}

fn validate_task(
    task: &Task,
    platforms: &[Platform],
    platform_index: &HashMap<Id, usize>,
    horizon: &TimeInterval,
) -> Result<(), InstanceError> {
    let invalid = |field: &'static str, value: f64| InstanceError::InvalidValue {
        owner: task.id().to_string(),
        field,
        value,
    };

    if !task.priority().is_finite() || task.priority() < 0.0 {
        return Err(invalid("priority", task.priority()));
    }
    if let TaskDuration::Fixed(length) = task.duration() {
        if !length.value().is_finite() || length.value() <= 0.0 {
            return Err(invalid("duration", length.value()));
        }
    }
    for (_, cost) in task.costs() {
        for value in [cost.per_execution, cost.per_second] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid("resource cost", value));
            }
        }
    }

    for window in task.windows() {
        let Some(&p) = platform_index.get(&window.platform_id) else {
            return Err(InstanceError::ReferenceIntegrity {
                task: task.id().to_string(),
                platform: window.platform_id.clone(),
            });
        };
        if !horizon.contains_interval(&window.interval) {
            return Err(InstanceError::WindowOutsideHorizon {
                task: task.id().to_string(),
                window: window.interval,
                horizon: *horizon,
            });
        }
        if !(0.0..=1.0).contains(&window.quality) {
            return Err(invalid("quality factor", window.quality));
        }
        let platform = &platforms[p];
        for (resource, cost) in task.costs() {
            if !cost.is_zero() && platform.budget(resource).is_none() {
                return Err(InstanceError::UnknownResource {
                    task: task.id().to_string(),
                    platform: platform.id().to_string(),
                    resource: resource.to_string(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AgilityModel, BudgetCurve, ObjectiveKind, ResourceCost};
    use crate::units::secs;

    fn iv(start: f64, end: f64) -> TimeInterval {
        TimeInterval::from_secs(start, end).unwrap()
    }

    fn base() -> InstanceBuilder {
        ProblemInstance::builder("unit", iv(0.0, 1000.0))
            .platform(Platform::new("sat-1").with_budget("energy", BudgetCurve::constant(10.0).unwrap()))
    }

    #[test]
    fn builds_and_indexes() {
        let instance = base()
            .objective(ObjectiveSpec::new(ObjectiveKind::CoverageFraction))
            .task(Task::new("b", 1.0, TaskDuration::Fixed(secs(10.0))).with_window("sat-1", iv(500.0, 600.0), 1.0))
            .task(Task::new("a", 2.0, TaskDuration::Fixed(secs(10.0))).with_window("sat-1", iv(0.0, 100.0), 0.5))
            .build()
            .unwrap();
        assert_eq!(instance.tasks().len(), 2);
        assert_eq!(instance.task("a").unwrap().priority(), 2.0);
        assert_eq!(instance.task_position("b"), Some(0));
        assert!(instance.platform("sat-1").is_some());
        assert!(instance.platform("sat-2").is_none());
        assert_eq!(instance.objective().kind(), ObjectiveKind::CoverageFraction);
    }

    #[test]
    fn unknown_platform_is_reference_error() {
        let err = base()
            .task(Task::new("a", 1.0, TaskDuration::Fixed(secs(10.0))).with_window("ghost", iv(0.0, 100.0), 1.0))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            InstanceError::ReferenceIntegrity {
                task: "a".to_string(),
                platform: "ghost".to_string()
            }
        );
    }

    #[test]
    fn duplicates_rejected() {
        let err = base()
            .task(Task::new("a", 1.0, TaskDuration::Fixed(secs(10.0))))
            .task(Task::new("a", 1.0, TaskDuration::Fixed(secs(10.0))))
            .build()
            .unwrap_err();
        assert_eq!(err, InstanceError::DuplicateTaskId("a".to_string()));

        let err = base().platform(Platform::new("sat-1")).build().unwrap_err();
        assert_eq!(err, InstanceError::DuplicatePlatformId("sat-1".to_string()));
    }

    #[test]
    fn window_outside_horizon_rejected() {
        let err = base()
            .task(Task::new("a", 1.0, TaskDuration::Fixed(secs(10.0))).with_window("sat-1", iv(900.0, 1100.0), 1.0))
            .build()
            .unwrap_err();
        assert!(matches!(err, InstanceError::WindowOutsideHorizon { .. }));
    }

    #[test]
    fn invalid_values_rejected() {
        let neg_priority = base().task(Task::new("a", -1.0, TaskDuration::Fixed(secs(10.0)))).build();
        assert!(matches!(neg_priority, Err(InstanceError::InvalidValue { field: "priority", .. })));

        let zero_len = base().task(Task::new("a", 1.0, TaskDuration::Fixed(secs(0.0)))).build();
        assert!(matches!(zero_len, Err(InstanceError::InvalidValue { field: "duration", .. })));

        let bad_quality = base()
            .task(Task::new("a", 1.0, TaskDuration::Fixed(secs(1.0))).with_window("sat-1", iv(0.0, 10.0), 1.5))
            .build();
        assert!(matches!(bad_quality, Err(InstanceError::InvalidValue { field: "quality factor", .. })));

        let bad_agility = base()
            .platform(Platform::new("sat-2").with_agility(AgilityModel::Constant { transition: secs(-5.0) }))
            .build();
        assert!(matches!(bad_agility, Err(InstanceError::InvalidValue { field: "agility", .. })));
    }

    #[test]
    fn objective_weights_must_be_finite_and_non_negative() {
        for weight in [-0.5, f64::NAN, f64::INFINITY] {
            let err = base()
                .objective(ObjectiveSpec::new(ObjectiveKind::ResourceEfficiency).with_resource_weight("energy", weight))
                .build()
                .unwrap_err();
            assert!(
                matches!(err, InstanceError::InvalidValue { field: "resource weight", ref owner, .. } if owner == "energy"),
                "weight {weight}: {err}"
            );
        }

        let zero = base()
            .objective(ObjectiveSpec::new(ObjectiveKind::ResourceEfficiency).with_resource_weight("energy", 0.0))
            .build();
        assert!(zero.is_ok());
    }

    #[test]
    fn unbudgeted_resource_rejected() {
        let err = base()
            .task(
                Task::new("a", 1.0, TaskDuration::Fixed(secs(10.0)))
                    .with_cost("storage", ResourceCost::per_execution(1.0))
                    .with_window("sat-1", iv(0.0, 100.0), 1.0),
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, InstanceError::UnknownResource { ref resource, .. } if resource == "storage"));
    }

    #[test]
    fn windowless_task_is_kept_and_flagged() {
        let instance = base()
            .task(Task::new("orphan", 1.0, TaskDuration::Fixed(secs(10.0))))
            .task(Task::new("ok", 1.0, TaskDuration::Fixed(secs(10.0))).with_window("sat-1", iv(0.0, 100.0), 1.0))
            .build()
            .unwrap();
        assert_eq!(instance.tasks().len(), 2);
        let flagged: Vec<&str> = instance.unschedulable_tasks().map(|t| t.id()).collect();
        assert_eq!(flagged, vec!["orphan"]);
    }

    #[test]
    fn visibility_merges_windows_across_tasks() {
        let instance = base()
            .task(Task::new("a", 1.0, TaskDuration::Fixed(secs(1.0))).with_window("sat-1", iv(0.0, 100.0), 1.0))
            .task(
                Task::new("b", 1.0, TaskDuration::Fixed(secs(1.0)))
                    .with_window("sat-1", iv(50.0, 150.0), 1.0)
                    .with_window("sat-1", iv(400.0, 500.0), 1.0),
            )
            .build()
            .unwrap();
        let visibility = instance.visibility();
        assert_eq!(&visibility[..], &[iv(0.0, 150.0), iv(400.0, 500.0)]);
        assert_eq!(visibility.fraction_of(&instance.horizon()), 0.25);
    }

    #[test]
    fn windows_are_sorted_on_build() {
        let instance = base()
            .task(
                Task::new("a", 1.0, TaskDuration::Fixed(secs(1.0)))
                    .with_window("sat-1", iv(300.0, 400.0), 1.0)
                    .with_window("sat-1", iv(0.0, 100.0), 1.0),
            )
            .build()
            .unwrap();
        let starts: Vec<f64> = instance.task("a").unwrap().windows().iter().map(|w| w.interval.start().value()).collect();
        assert_eq!(starts, vec![0.0, 300.0]);
    }
}
