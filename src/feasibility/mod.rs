//! Feasibility engine.
//!
//! [`evaluate`] judges a [`Schedule`] against a [`ProblemInstance`]. Checks
//! run in a fixed order and each one covers every assignment before the next
//! starts, so the reported violation is always the first violated check:
//!
//! 1. reference integrity
//! 2. window containment
//! 3. per-platform non-overlap (agility included)
//! 4. resource budgets
//! 5. uniqueness of non-repeatable tasks
//!
//! The engine is pure and holds no state; it may be called from any number of
//! threads at once.

use std::collections::HashMap;

mod resources;
mod violation;

pub use resources::{ResourceSeries, UsageSample, UsageTrace};
pub use violation::{Violation, ViolationKind};

pub(crate) use resources::{check_platform, Execution};

use crate::model::{ProblemInstance, Task};
use crate::schedule::{Assignment, Schedule};
use crate::window::TimeInterval;


/// Outcome of a feasibility evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Every constraint holds; carries the resource usage over time.
    Feasible(UsageTrace),
    /// The first violated constraint.
    Infeasible(Violation),
}

impl Verdict {
    pub fn is_feasible(&self) -> bool {
        matches!(self, Verdict::Feasible(_))
    }

    pub fn violation(&self) -> Option<&Violation> {
        match self {
            Verdict::Infeasible(v) => Some(v),
            Verdict::Feasible(_) => None,
        }
    }

    pub fn trace(&self) -> Option<&UsageTrace> {
        match self {
            Verdict::Feasible(trace) => Some(trace),
            Verdict::Infeasible(_) => None,
        }
    }
}

/// Evaluates `schedule` against every hard constraint of `instance`.
pub fn evaluate(instance: &ProblemInstance, schedule: &Schedule) -> Verdict {
    match run_checks(instance, schedule) {
        Ok(trace) => Verdict::Feasible(trace),
        Err(violation) => Verdict::Infeasible(violation),
    }
}

fn run_checks(instance: &ProblemInstance, schedule: &Schedule) -> Result<UsageTrace, Violation> {
    let resolved = check_references(instance, schedule)?;
    let intervals = check_windows(schedule, &resolved)?;
    check_overlap(instance, schedule, &resolved, &intervals)?;
    let trace = check_resources(instance, schedule, &resolved, &intervals)?;
    check_uniqueness(schedule, &resolved)?;
    Ok(trace)
}

// ─────────────────────────────────────────────────────────────────────────────
// 1. Reference integrity
// ─────────────────────────────────────────────────────────────────────────────

/// Resolves every assignment to its task.
fn check_references<'a>(
    instance: &'a ProblemInstance,
    schedule: &Schedule,
) -> Result<Vec<&'a Task>, Violation> {
    schedule
        .iter()
        .enumerate()
        .map(|(index, a)| {
            let task = instance.task(&a.task_id).ok_or_else(|| {
                Violation::new(
                    ViolationKind::ReferenceIntegrity,
                    vec![index],
                    format!("unknown task '{}'", a.task_id),
                )
            })?;
            if instance.platform(&a.platform_id).is_none() {
                return Err(Violation::new(
                    ViolationKind::ReferenceIntegrity,
                    vec![index],
                    format!("unknown platform '{}'", a.platform_id),
                ));
            }
            Ok(task)
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// 2. Window containment
// ─────────────────────────────────────────────────────────────────────────────

fn check_windows(schedule: &Schedule, resolved: &[&Task]) -> Result<Vec<TimeInterval>, Violation> {
    schedule
        .iter()
        .zip(resolved)
        .enumerate()
        .map(|(index, (a, task))| execution_in_window(index, a, task))
        .collect()
}

fn execution_in_window(index: usize, a: &Assignment, task: &Task) -> Result<TimeInterval, Violation> {
    let containment = |detail: String| Violation::new(ViolationKind::WindowContainment, vec![index], detail);

    if task.admissible_window(&a.platform_id, &a.window).is_none() {
        return Err(containment(format!(
            "window {} of task '{}' is not inside any admissible window on platform '{}'",
            a.window, a.task_id, a.platform_id
        )));
    }
    let interval = task.execution_interval(&a.window, a.start).ok_or_else(|| {
        containment(format!(
            "task '{}' has an empty execution when started at {:.3}",
            a.task_id,
            a.start.value()
        ))
    })?;
    if !a.window.contains_interval(&interval) {
        return Err(containment(format!(
            "execution {} of task '{}' leaves its window {}",
            interval, a.task_id, a.window
        )));
    }
    Ok(interval)
}

// ─────────────────────────────────────────────────────────────────────────────
// 3. Non-overlap with agility
// ─────────────────────────────────────────────────────────────────────────────

fn check_overlap(
    instance: &ProblemInstance,
    schedule: &Schedule,
    resolved: &[&Task],
    intervals: &[TimeInterval],
) -> Result<(), Violation> {
    for platform in instance.platforms() {
        let mut onboard: Vec<usize> = schedule.on_platform(platform.id()).map(|(i, _)| i).collect();
        onboard.sort_by(|&a, &b| {
            intervals[a]
                .start()
                .value()
                .total_cmp(&intervals[b].start().value())
                .then(a.cmp(&b))
        });

        for pair in onboard.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            let gap = platform
                .agility()
                .transition(resolved[prev], resolved[next]);
            let earliest = intervals[prev].end() + gap;
            if intervals[next].start().value() < earliest.value() {
                let mut offenders = vec![prev, next];
                offenders.sort_unstable();
                return Err(Violation::new(
                    ViolationKind::PlatformOverlap,
                    offenders,
                    format!(
                        "platform '{}': '{}' {} needs {:.3}s before '{}' {}",
                        platform.id(),
                        resolved[prev].id(),
                        intervals[prev],
                        gap.value(),
                        resolved[next].id(),
                        intervals[next]
                    ),
                ));
            }
        }
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// 4. Resource budgets
// ─────────────────────────────────────────────────────────────────────────────

fn check_resources(
    instance: &ProblemInstance,
    schedule: &Schedule,
    resolved: &[&Task],
    intervals: &[TimeInterval],
) -> Result<UsageTrace, Violation> {
    let mut series = Vec::new();
    for platform in instance.platforms() {
        let executions: Vec<Execution<'_>> = schedule
            .on_platform(platform.id())
            .map(|(index, _)| Execution {
                index,
                task: resolved[index],
                interval: intervals[index],
            })
            .collect();
        series.extend(check_platform(platform, &executions)?);
    }
    Ok(UsageTrace::new(series))
}

// ─────────────────────────────────────────────────────────────────────────────
// 5. Uniqueness
// ─────────────────────────────────────────────────────────────────────────────

fn check_uniqueness(schedule: &Schedule, resolved: &[&Task]) -> Result<(), Violation> {
    let mut first_seen: HashMap<&str, usize> = HashMap::new();
    for (index, task) in resolved.iter().enumerate() {
        if task.is_repeatable() {
            continue;
        }
        if let Some(&first) = first_seen.get(task.id()) {
            return Err(Violation::new(
                ViolationKind::Duplicate,
                vec![first, index],
                format!(
                    "non-repeatable task '{}' is assigned more than once",
                    schedule.assignments()[index].task_id
                ),
            ));
        }
        first_seen.insert(task.id(), index);
    }
    Ok(())
}
