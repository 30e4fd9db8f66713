//! Insertion decoder shared by the built-in schedulers.
//!
//! A [`Planner`] keeps one [`Timeline`] per platform and inserts tasks one at a
//! time at the earliest start that keeps the partial schedule feasible. Every
//! schedule it produces passes [`evaluate`](crate::feasibility::evaluate).

use qtty::Quantity;

use crate::feasibility::{check_platform, evaluate, Execution};
use crate::model::{ObjectiveKind, Platform, ProblemInstance, Task, TaskDuration, VisibilityWindow};
use crate::schedule::{Assignment, Entry, F64Key, Schedule, Timeline};
use crate::scoring::score;
use crate::units::Time;
use crate::window::TimeInterval;

/// Width, in seconds, below which a budget-limited start search stops.
const START_RESOLUTION: f64 = 1e-3;
const MAX_BISECTIONS: usize = 64;

/// Outcome of trying one start time.
enum Fit {
    Fits(TimeInterval),
    /// Fits the window and the neighbours but not a resource budget.
    OverBudget,
    Rejected,
}

/// Incremental, always-feasible schedule builder.
#[derive(Debug, Clone)]
pub struct Planner<'a> {
    instance: &'a ProblemInstance,
    timelines: Vec<Timeline>,
    scheduled: Vec<bool>,
    assignments: Vec<Assignment>,
    history: Vec<Placement>,
    reward: f64,
}

/// Undo record of one `place_in` call.
#[derive(Debug, Clone, Copy)]
struct Placement {
    task: usize,
    window: usize,
    platform: usize,
    start: Time,
    reward_before: f64,
}

impl<'a> Planner<'a> {
    pub fn new(instance: &'a ProblemInstance) -> Self {
        Self {
            instance,
            timelines: vec![Timeline::new(); instance.platforms().len()],
            scheduled: vec![false; instance.tasks().len()],
            assignments: Vec::new(),
            history: Vec::new(),
            reward: 0.0,
        }
    }

    pub fn instance(&self) -> &'a ProblemInstance {
        self.instance
    }

    pub fn is_scheduled(&self, task: usize) -> bool {
        self.scheduled[task]
    }

    /// Number of placed executions.
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Σ `priority * quality` of the placed executions.
    pub fn reward(&self) -> f64 {
        self.reward
    }

    /// Objective value of the schedule built so far.
    pub fn objective_value(&self) -> f64 {
        match self.instance.objective().kind() {
            ObjectiveKind::WeightedReward => self.reward,
            ObjectiveKind::CoverageFraction => match self.scheduled.len() {
                0 => 0.0,
                n => self.scheduled.iter().filter(|s| **s).count() as f64 / n as f64,
            },
            ObjectiveKind::ResourceEfficiency => {
                let schedule = self.snapshot();
                let verdict = evaluate(self.instance, &schedule);
                score(self.instance, &schedule, &verdict).value
            }
        }
    }

    /// `(task, window)` of every placement, in placement order.
    ///
    /// Replaying them through [`place_in`](Self::place_in) on a fresh planner
    /// rebuilds the same schedule.
    pub fn decisions(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.history.iter().map(|p| (p.task, p.window))
    }

    /// Reverts the most recent placement. Returns `false` if there is none.
    pub fn undo(&mut self) -> bool {
        let Some(last) = self.history.pop() else {
            return false;
        };
        self.timelines[last.platform].remove_at(last.start);
        self.scheduled[last.task] = false;
        self.assignments.pop();
        self.reward = last.reward_before;
        true
    }

    /// Copy of the schedule built so far.
    pub fn snapshot(&self) -> Schedule {
        self.assignments.clone().into()
    }

    pub fn into_schedule(self) -> Schedule {
        self.assignments.into()
    }

    /// Places task `task` (its position in the instance) in the first window,
    /// by descending quality then start, that can host it.
    ///
    /// Returns `false` when the task is already scheduled or fits nowhere.
    pub fn place(&mut self, task: usize) -> bool {
        let Some(t) = self.instance.tasks().get(task) else {
            return false;
        };
        let mut order: Vec<usize> = (0..t.windows().len()).collect();
        order.sort_by(|&a, &b| {
            let (wa, wb) = (&t.windows()[a], &t.windows()[b]);
            wb.quality
                .total_cmp(&wa.quality)
                .then(wa.interval.start().value().total_cmp(&wb.interval.start().value()))
                .then(a.cmp(&b))
        });
        order.into_iter().any(|w| self.place_in(task, w))
    }

    /// Places task `task` inside its window number `window`, at the earliest
    /// feasible start.
    pub fn place_in(&mut self, task: usize, window: usize) -> bool {
        if self.scheduled.get(task).copied().unwrap_or(true) {
            return false;
        }
        let instance = self.instance;
        let t = &instance.tasks()[task];
        let Some(w) = t.windows().get(window) else {
            return false;
        };
        let Some(p) = instance.platforms().iter().position(|p| p.id() == w.platform_id) else {
            return false;
        };
        let Some(interval) = self.earliest_fit(t, w, &instance.platforms()[p], &self.timelines[p]) else {
            return false;
        };

        let entry = Entry::new(task, w.interval, interval);
        if self.timelines[p].add(entry).is_err() {
            return false;
        }
        self.scheduled[task] = true;
        self.history.push(Placement {
            task,
            window,
            platform: p,
            start: interval.start(),
            reward_before: self.reward,
        });
        let credited = t.admissible_window(&w.platform_id, &w.interval).unwrap_or(w);
        self.reward += t.reward_in(credited);
        self.assignments
            .push(Assignment::new(t.id(), w.platform_id.clone(), w.interval, interval.start()));
        true
    }

    fn earliest_fit(
        &self,
        task: &Task,
        window: &VisibilityWindow,
        platform: &Platform,
        timeline: &Timeline,
    ) -> Option<TimeInterval> {
        let tasks = self.instance.tasks();
        let agility = platform.agility();

        let mut starts: Vec<F64Key> = vec![F64Key(window.interval.start().value())];
        for entry in timeline.iter() {
            let earliest = entry.interval().end() + agility.transition(&tasks[entry.task()], task);
            if window.interval.contains(earliest) {
                starts.push(F64Key(earliest.value()));
            }
        }
        let consumes = platform
            .budgets()
            .any(|(name, _)| task.cost(name).is_some_and(|c| !c.is_zero()));
        if consumes {
            for (_, curve) in platform.budgets() {
                starts.extend(
                    curve
                        .steps()
                        .iter()
                        .filter(|s| window.interval.contains(s.at))
                        .map(|s| F64Key(s.at.value())),
                );
            }
        }
        starts.sort_unstable();
        starts.dedup();

        for (i, key) in starts.iter().enumerate() {
            match self.try_start(task, window, platform, timeline, consumes, key.value()) {
                Fit::Fits(interval) => return Some(interval),
                Fit::OverBudget => {
                    let until = starts.get(i + 1).map(|k| k.value());
                    let delayed = self.first_start_within_budgets(task, window, platform, timeline, key.value(), until);
                    if delayed.is_some() {
                        return delayed;
                    }
                }
                Fit::Rejected => {}
            }
        }
        None
    }

    fn try_start(
        &self,
        task: &Task,
        window: &VisibilityWindow,
        platform: &Platform,
        timeline: &Timeline,
        consumes: bool,
        start: f64,
    ) -> Fit {
        let Some(interval) = task.execution_interval(&window.interval, Quantity::new(start)) else {
            return Fit::Rejected;
        };
        if !window.interval.contains_interval(&interval) {
            return Fit::Rejected;
        }
        if !self.respects_neighbours(task, &interval, platform, timeline) {
            return Fit::Rejected;
        }
        if consumes && !self.within_budgets(task, interval, platform, timeline) {
            return Fit::OverBudget;
        }
        Fit::Fits(interval)
    }

    /// Earliest start in `(from, until]` that the resource budgets allow,
    /// staying in the gap `from` lies in.
    ///
    /// Delaying an execution only delays its consumption, so within one gap
    /// budget feasibility is monotone in the start and bisection finds the
    /// threshold. Executions running to the window end are not shifted.
    fn first_start_within_budgets(
        &self,
        task: &Task,
        window: &VisibilityWindow,
        platform: &Platform,
        timeline: &Timeline,
        from: f64,
        until: Option<f64>,
    ) -> Option<TimeInterval> {
        let TaskDuration::Fixed(length) = task.duration() else {
            return None;
        };
        let mut latest = window.interval.end().value() - length.value();
        if let Some(next) = timeline.at_or_after(Quantity::new(from)) {
            let transition = platform.agility().transition(task, &self.instance.tasks()[next.task()]);
            latest = latest.min(next.interval().start().value() - transition.value() - length.value());
        }
        if let Some(until) = until {
            latest = latest.min(until);
        }
        if latest <= from {
            return None;
        }
        let Fit::Fits(mut found) = self.try_start(task, window, platform, timeline, true, latest) else {
            return None;
        };

        let (mut lo, mut hi) = (from, latest);
        for _ in 0..MAX_BISECTIONS {
            if hi - lo <= START_RESOLUTION {
                break;
            }
            let mid = 0.5 * (lo + hi);
            match self.try_start(task, window, platform, timeline, true, mid) {
                Fit::Fits(interval) => {
                    hi = mid;
                    found = interval;
                }
                _ => lo = mid,
            }
        }
        Some(found)
    }

    fn respects_neighbours(
        &self,
        task: &Task,
        interval: &TimeInterval,
        platform: &Platform,
        timeline: &Timeline,
    ) -> bool {
        let tasks = self.instance.tasks();
        let agility = platform.agility();
        if let Some(prev) = timeline.before(interval.start()) {
            let earliest = prev.interval().end() + agility.transition(&tasks[prev.task()], task);
            if interval.start().value() < earliest.value() {
                return false;
            }
        }
        if let Some(next) = timeline.at_or_after(interval.start()) {
            let latest_end = interval.end() + agility.transition(task, &tasks[next.task()]);
            if next.interval().start().value() < latest_end.value() {
                return false;
            }
        }
        true
    }

    fn within_budgets(&self, task: &Task, interval: TimeInterval, platform: &Platform, timeline: &Timeline) -> bool {
        let tasks = self.instance.tasks();
        let mut executions: Vec<Execution<'_>> = timeline
            .iter()
            .enumerate()
            .map(|(index, e)| Execution {
                index,
                task: &tasks[e.task()],
                interval: e.interval(),
            })
            .collect();
        executions.push(Execution {
            index: executions.len(),
            task,
            interval,
        });
        check_platform(platform, &executions).is_ok()
    }
}
