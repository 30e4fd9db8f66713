//! Single-pass greedy schedulers.
//!
//! Both build on the [`Planner`] and differ only in the order in which they
//! offer work to it. Neither uses randomness, so the seed is ignored.

use std::cmp::Ordering;

use super::placement::Planner;
use super::{Scheduler, SchedulerError, TimeBudget};
use crate::model::{ProblemInstance, Task, TaskDuration};
use crate::schedule::Schedule;

/// Offers (task, window) options by descending `priority * quality`.
///
/// Ties are broken by task id, then window start.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyByReward;

impl GreedyByReward {
    pub const NAME: &'static str = "greedy-reward";

    pub fn new() -> Self {
        Self
    }
}

impl Scheduler for GreedyByReward {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn plan(&self, instance: &ProblemInstance, budget: &TimeBudget, _seed: u64) -> Result<Schedule, SchedulerError> {
        let tasks = instance.tasks();
        let mut options: Vec<(usize, usize)> = tasks
            .iter()
            .enumerate()
            .flat_map(|(t, task)| (0..task.windows().len()).map(move |w| (t, w)))
            .collect();
        options.sort_by(|&(ta, wa), &(tb, wb)| {
            let (a, b) = (&tasks[ta], &tasks[tb]);
            let (win_a, win_b) = (&a.windows()[wa], &b.windows()[wb]);
            b.reward_in(win_b)
                .total_cmp(&a.reward_in(win_a))
                .then_with(|| a.id().cmp(b.id()))
                .then_with(|| {
                    win_a
                        .interval
                        .start()
                        .value()
                        .total_cmp(&win_b.interval.start().value())
                })
                .then_with(|| win_a.platform_id.cmp(&win_b.platform_id))
        });

        let mut planner = Planner::new(instance);
        for (task, window) in options {
            if planner.is_scheduled(task) {
                continue;
            }
            if budget.tick() {
                return Err(budget.exceeded(planner.into_schedule()));
            }
            planner.place_in(task, window);
        }
        Ok(planner.into_schedule())
    }
}

/// Fewest-options-first: tasks with fewer windows, then lower flexibility,
/// are placed before more flexible ones.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyByWindowCount;

impl GreedyByWindowCount {
    pub const NAME: &'static str = "greedy-window-count";

    pub fn new() -> Self {
        Self
    }
}

/// Σ over windows of `window length / execution length`.
///
/// A `FromWindow` task always fills the rest of its window, so each window
/// counts as one slot.
pub(crate) fn flexibility(task: &Task) -> f64 {
    match task.duration() {
        TaskDuration::Fixed(length) => task
            .windows()
            .iter()
            .map(|w| w.interval.duration().value() / length.value())
            .sum(),
        TaskDuration::FromWindow => task.windows().len() as f64,
    }
}

fn fewest_options_first(a: &Task, b: &Task) -> Ordering {
    a.windows()
        .len()
        .cmp(&b.windows().len())
        .then_with(|| flexibility(a).total_cmp(&flexibility(b)))
        .then_with(|| b.priority().total_cmp(&a.priority()))
        .then_with(|| a.id().cmp(b.id()))
}

impl Scheduler for GreedyByWindowCount {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn plan(&self, instance: &ProblemInstance, budget: &TimeBudget, _seed: u64) -> Result<Schedule, SchedulerError> {
        let tasks = instance.tasks();
        let mut order: Vec<usize> = (0..tasks.len())
            .filter(|&t| tasks[t].has_usable_window())
            .collect();
        order.sort_by(|&a, &b| fewest_options_first(&tasks[a], &tasks[b]));

        let mut planner = Planner::new(instance);
        for task in order {
            if budget.tick() {
                return Err(budget.exceeded(planner.into_schedule()));
            }
            planner.place(task);
        }
        Ok(planner.into_schedule())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feasibility::evaluate;
    use crate::model::Platform;
    use crate::units::secs;
    use crate::window::TimeInterval;
    use std::time::Duration;

    fn iv(start: f64, end: f64) -> TimeInterval {
        TimeInterval::from_secs(start, end).unwrap()
    }

    /// `rich` is worth more but blocks `poor`'s only window; `flex` fits anywhere.
    fn contested() -> ProblemInstance {
        ProblemInstance::builder("contested", iv(0.0, 100.0))
            .platform(Platform::new("sat"))
            .task(
                Task::new("rich", 9.0, TaskDuration::Fixed(secs(10.0)))
                    .with_window("sat", iv(0.0, 10.0), 1.0)
                    .with_window("sat", iv(50.0, 60.0), 0.5),
            )
            .task(Task::new("poor", 2.0, TaskDuration::Fixed(secs(10.0))).with_window("sat", iv(0.0, 10.0), 1.0))
            .task(Task::new("flex", 1.0, TaskDuration::Fixed(secs(5.0))).with_window("sat", iv(0.0, 100.0), 1.0))
            .build()
            .unwrap()
    }

    #[test]
    fn test_greedy_reward_takes_richest_option_first() {
        let instance = contested();
        let schedule = GreedyByReward
            .plan(&instance, &TimeBudget::unlimited(), 0)
            .unwrap();
        assert!(evaluate(&instance, &schedule).is_feasible());
        assert_eq!(schedule.assignments()[0].task_id, "rich");
        assert_eq!(schedule.assignments()[0].start.value(), 0.0);
        assert!(!schedule.contains_task("poor"));
        assert!(schedule.contains_task("flex"));
    }

    #[test]
    fn test_window_count_places_constrained_tasks_first() {
        let instance = contested();
        let schedule = GreedyByWindowCount
            .plan(&instance, &TimeBudget::unlimited(), 0)
            .unwrap();
        assert!(evaluate(&instance, &schedule).is_feasible());
        assert_eq!(schedule.assignments()[0].task_id, "poor");
        assert_eq!(schedule.len(), 3);
    }

    #[test]
    fn test_flexibility_sums_window_ratios() {
        let instance = contested();
        assert_eq!(flexibility(&instance.tasks()[0]), 2.0);
        assert_eq!(flexibility(&instance.tasks()[2]), 20.0);
    }

    #[test]
    fn test_expired_budget_returns_partial() {
        let instance = contested();
        let err = GreedyByReward
            .plan(&instance, &TimeBudget::new(Duration::ZERO), 0)
            .unwrap_err();
        match err {
            SchedulerError::TimeoutExceeded { partial, .. } => assert!(partial.is_empty()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_same_seed_same_schedule() {
        let instance = contested();
        for scheduler in [&GreedyByReward as &dyn Scheduler, &GreedyByWindowCount] {
            let a = scheduler.plan(&instance, &TimeBudget::unlimited(), 7).unwrap();
            let b = scheduler.plan(&instance, &TimeBudget::unlimited(), 7).unwrap();
            assert_eq!(a, b);
        }
    }
}
