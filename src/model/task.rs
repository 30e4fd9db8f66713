//! Tasks: observation or communication requests to be scheduled.

use std::collections::BTreeMap;

use super::agility::Orientation;
use crate::units::Time;
use crate::window::TimeInterval;
use crate::Id;

/// How long a task executes once started.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TaskDuration {
    /// Executes for a fixed length of time.
    Fixed(Time),
    /// Executes from its start until the end of the chosen window
    /// (e.g. a downlink that uses the whole remaining pass).
    FromWindow,
}

/// Consumption of one named resource by a single execution.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResourceCost {
    /// Charged in full at the start of the execution.
    pub per_execution: f64,
    /// Charged continuously while executing.
    pub per_second: f64,
}

impl ResourceCost {
    pub const fn new(per_execution: f64, per_second: f64) -> Self {
        Self {
            per_execution,
            per_second,
        }
    }

    pub const fn per_execution(amount: f64) -> Self {
        Self::new(amount, 0.0)
    }

    pub const fn per_second(rate: f64) -> Self {
        Self::new(0.0, rate)
    }

    /// Total consumed by an execution lasting `length`.
    pub fn total_for(&self, length: Time) -> f64 {
        self.per_execution + self.per_second * length.value()
    }

    pub fn is_zero(&self) -> bool {
        self.per_execution == 0.0 && self.per_second == 0.0
    }
}

/// An interval during which a platform can execute a task.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityWindow {
    pub platform_id: Id,
    pub interval: TimeInterval,
    /// Scales achievable reward, in `[0, 1]` (e.g. elevation-dependent).
    pub quality: f64,
}

/// A unit of work to be scheduled.
#[derive(Debug, Clone)]
pub struct Task {
    id: Id,
    priority: f64,
    duration: TaskDuration,
    costs: BTreeMap<String, ResourceCost>,
    orientation: Orientation,
    repeatable: bool,
    windows: Vec<VisibilityWindow>,
}

impl Task {
    pub fn new(id: impl Into<Id>, priority: f64, duration: TaskDuration) -> Self {
        Self {
            id: id.into(),
            priority,
            duration,
            costs: BTreeMap::new(),
            orientation: Orientation::default(),
            repeatable: false,
            windows: Vec::new(),
        }
    }

    pub fn with_cost(mut self, resource: impl Into<String>, cost: ResourceCost) -> Self {
        self.costs.insert(resource.into(), cost);
        self
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Allows the task to be executed more than once in a schedule.
    pub fn repeatable(mut self) -> Self {
        self.repeatable = true;
        self
    }

    /// Adds an admissible visibility window.
    pub fn with_window(
        mut self,
        platform_id: impl Into<Id>,
        interval: TimeInterval,
        quality: f64,
    ) -> Self {
        self.windows.push(VisibilityWindow {
            platform_id: platform_id.into(),
            interval,
            quality,
        });
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn priority(&self) -> f64 {
        self.priority
    }

    pub fn duration(&self) -> TaskDuration {
        self.duration
    }

    pub fn orientation(&self) -> &Orientation {
        &self.orientation
    }

    pub fn is_repeatable(&self) -> bool {
        self.repeatable
    }

    pub fn costs(&self) -> impl Iterator<Item = (&str, &ResourceCost)> {
        self.costs.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn cost(&self, resource: &str) -> Option<&ResourceCost> {
        self.costs.get(resource)
    }

    pub fn windows(&self) -> &[VisibilityWindow] {
        &self.windows
    }

    /// Admissible windows on one platform, in start order.
    pub fn windows_on<'a>(&'a self, platform_id: &'a str) -> impl Iterator<Item = &'a VisibilityWindow> + 'a {
        self.windows.iter().filter(move |w| w.platform_id == platform_id)
    }

    /// Execution interval when started at `start` inside `window`.
    ///
    /// Returns `None` when the execution would be empty or its bounds invalid.
    pub fn execution_interval(&self, window: &TimeInterval, start: Time) -> Option<TimeInterval> {
        match self.duration {
            TaskDuration::Fixed(length) => TimeInterval::starting_at(start, length).ok(),
            TaskDuration::FromWindow => TimeInterval::new(start, window.end()).ok(),
        }
    }

    /// The admissible window on `platform_id` that contains `interval`.
    ///
    /// When several admissible windows contain it, the one with the highest
    /// quality wins (earliest start on ties).
    pub fn admissible_window(&self, platform_id: &str, interval: &TimeInterval) -> Option<&VisibilityWindow> {
        self.windows
            .iter()
            .filter(|w| w.platform_id == platform_id && w.interval.contains_interval(interval))
            .fold(None, |best: Option<&VisibilityWindow>, w| match best {
                Some(b) if b.quality >= w.quality => Some(b),
                _ => Some(w),
            })
    }

    /// Reward earned for one execution inside `window`.
    pub fn reward_in(&self, window: &VisibilityWindow) -> f64 {
        self.priority * window.quality
    }

    /// Returns true if at least one window can host an execution.
    pub fn has_usable_window(&self) -> bool {
        self.windows.iter().any(|w| match self.duration {
            TaskDuration::Fixed(length) => length.value() <= w.interval.duration().value(),
            TaskDuration::FromWindow => true,
        })
    }

    pub(crate) fn sort_windows(&mut self) {
        self.windows.sort_by(|a, b| {
            a.platform_id
                .cmp(&b.platform_id)
                .then(a.interval.start().value().total_cmp(&b.interval.start().value()))
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::secs;

    fn iv(start: f64, end: f64) -> TimeInterval {
        TimeInterval::from_secs(start, end).unwrap()
    }

    #[test]
    fn fixed_execution_interval() {
        let task = Task::new("t", 1.0, TaskDuration::Fixed(secs(30.0)));
        let exec = task.execution_interval(&iv(0.0, 100.0), secs(10.0)).unwrap();
        assert_eq!(exec, iv(10.0, 40.0));
    }

    #[test]
    fn from_window_execution_runs_to_window_end() {
        let task = Task::new("dl", 1.0, TaskDuration::FromWindow);
        let exec = task.execution_interval(&iv(0.0, 100.0), secs(60.0)).unwrap();
        assert_eq!(exec, iv(60.0, 100.0));
        assert!(task.execution_interval(&iv(0.0, 100.0), secs(100.0)).is_none());
    }

    #[test]
    fn admissible_window_prefers_quality() {
        let task = Task::new("t", 10.0, TaskDuration::Fixed(secs(5.0)))
            .with_window("sat", iv(0.0, 100.0), 0.4)
            .with_window("sat", iv(0.0, 50.0), 0.9)
            .with_window("other", iv(0.0, 100.0), 1.0);
        let w = task.admissible_window("sat", &iv(10.0, 15.0)).unwrap();
        assert_eq!(w.quality, 0.9);
        let w = task.admissible_window("sat", &iv(60.0, 65.0)).unwrap();
        assert_eq!(w.quality, 0.4);
        assert!(task.admissible_window("nope", &iv(10.0, 15.0)).is_none());
        assert_eq!(task.reward_in(w), 4.0);
    }

    #[test]
    fn resource_cost_totals() {
        let cost = ResourceCost::new(2.0, 0.5);
        assert_eq!(cost.total_for(secs(10.0)), 7.0);
        assert!(ResourceCost::default().is_zero());
    }

    #[test]
    fn usable_window_detection() {
        let too_long = Task::new("t", 1.0, TaskDuration::Fixed(secs(500.0))).with_window("sat", iv(0.0, 100.0), 1.0);
        assert!(!too_long.has_usable_window());
        let no_windows = Task::new("u", 1.0, TaskDuration::Fixed(secs(5.0)));
        assert!(!no_windows.has_usable_window());
    }
}
