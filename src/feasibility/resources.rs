//! Resource-budget sweep and the usage trace it produces.
//!
//! For one platform and one resource, cumulative consumption `C(t)` is a
//! non-decreasing function with jumps at execution starts (per-execution
//! charges) and linear ramps while executions run (per-second charges). The
//! available budget `A(t)` is a right-continuous step function. Between two
//! consecutive events `A` is constant and `C` grows, so comparing the left
//! limit and the value at every event instant is enough to prove
//! `C(t) <= A(t)` everywhere.

use std::collections::BTreeMap;

use qtty::Quantity;

use super::violation::{Violation, ViolationKind};
use crate::model::{BudgetCurve, Platform, Task};
use crate::schedule::F64Key;
use crate::units::Time;
use crate::window::TimeInterval;
use crate::Id;

const EPSILON: f64 = 1e-9;

/// Consumption and availability of a resource at an event instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsageSample {
    pub time: Time,
    /// Cumulative consumption `C(t)`, including charges made at `t`.
    pub consumed: f64,
    /// Available budget `A(t)`, including replenishment at `t`.
    pub available: f64,
}

impl UsageSample {
    pub fn headroom(&self) -> f64 {
        self.available - self.consumed
    }
}

/// Usage of one resource on one platform over time.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceSeries {
    platform_id: Id,
    resource: String,
    samples: Vec<UsageSample>,
}

impl ResourceSeries {
    pub fn platform_id(&self) -> &str {
        &self.platform_id
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn samples(&self) -> &[UsageSample] {
        &self.samples
    }

    /// Total consumed by the end of the schedule.
    pub fn total_consumed(&self) -> f64 {
        self.samples.last().map_or(0.0, |s| s.consumed)
    }

    /// Smallest margin between budget and consumption at any event.
    pub fn min_headroom(&self) -> Option<f64> {
        self.samples
            .iter()
            .map(UsageSample::headroom)
            .min_by(|a, b| a.total_cmp(b))
    }
}

/// Per-platform, per-resource usage of a feasible schedule.
///
/// Series are ordered by platform (instance order) then resource name.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageTrace {
    series: Vec<ResourceSeries>,
}

impl UsageTrace {
    pub(crate) fn new(series: Vec<ResourceSeries>) -> Self {
        Self { series }
    }

    pub fn series(&self) -> &[ResourceSeries] {
        &self.series
    }

    pub fn series_for(&self, platform_id: &str, resource: &str) -> Option<&ResourceSeries> {
        self.series
            .iter()
            .find(|s| s.platform_id == platform_id && s.resource == resource)
    }

    /// Total consumption of `resource` summed over all platforms.
    pub fn total_consumed(&self, resource: &str) -> f64 {
        self.series
            .iter()
            .filter(|s| s.resource == resource)
            .map(ResourceSeries::total_consumed)
            .sum()
    }
}

/// An execution resolved against the instance.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Execution<'a> {
    pub index: usize,
    pub task: &'a Task,
    pub interval: TimeInterval,
}

#[derive(Default)]
struct EventGroup {
    increments: f64,
    starts: Vec<(usize, f64, f64)>,
    ends: Vec<(usize, f64)>,
}

/// Checks every budget of `platform` against `executions`.
pub(crate) fn check_platform(
    platform: &Platform,
    executions: &[Execution<'_>],
) -> Result<Vec<ResourceSeries>, Violation> {
    platform
        .budgets()
        .map(|(resource, curve)| sweep(platform.id(), resource, curve, executions))
        .collect()
}

fn sweep(
    platform_id: &str,
    resource: &str,
    curve: &BudgetCurve,
    executions: &[Execution<'_>],
) -> Result<ResourceSeries, Violation> {
    let mut events: BTreeMap<F64Key, EventGroup> = BTreeMap::new();
    for step in curve.steps() {
        events.entry(F64Key(step.at.value())).or_default().increments += step.increment;
    }
    for exec in executions {
        let Some(cost) = exec.task.cost(resource) else {
            continue;
        };
        if cost.is_zero() {
            continue;
        }
        events
            .entry(F64Key(exec.interval.start().value()))
            .or_default()
            .starts
            .push((exec.index, cost.per_execution, cost.per_second));
        if cost.per_second > 0.0 {
            events
                .entry(F64Key(exec.interval.end().value()))
                .or_default()
                .ends
                .push((exec.index, cost.per_second));
        }
    }

    let exceeds = |consumed: f64, level: f64| consumed > level + EPSILON * level.abs().max(1.0);

    let mut samples = Vec::with_capacity(events.len());
    let mut level = curve.initial();
    let mut consumed = 0.0;
    let mut rate = 0.0;
    let mut running: Vec<(usize, f64)> = Vec::new();
    let mut previous: Option<f64> = None;

    for (key, group) in events {
        let t = key.value();
        if let Some(t_prev) = previous {
            consumed += rate * (t - t_prev);
            if exceeds(consumed, level) {
                let mut offenders: Vec<usize> = running.iter().map(|(i, _)| *i).collect();
                offenders.sort_unstable();
                return Err(budget_violation(platform_id, resource, t, consumed, level, offenders));
            }
        }

        level += group.increments;
        for (index, per_second) in &group.ends {
            rate -= per_second;
            running.retain(|(i, _)| i != index);
        }
        if running.is_empty() {
            rate = 0.0;
        }
        for (index, per_execution, per_second) in &group.starts {
            consumed += per_execution;
            if *per_second > 0.0 {
                rate += per_second;
                running.push((*index, *per_second));
            }
        }
        if exceeds(consumed, level) {
            let mut offenders: Vec<usize> = group.starts.iter().map(|(i, _, _)| *i).collect();
            offenders.sort_unstable();
            return Err(budget_violation(platform_id, resource, t, consumed, level, offenders));
        }

        samples.push(UsageSample {
            time: Quantity::new(t),
            consumed,
            available: level,
        });
        previous = Some(t);
    }

    Ok(ResourceSeries {
        platform_id: platform_id.to_string(),
        resource: resource.to_string(),
        samples,
    })
}

fn budget_violation(
    platform_id: &str,
    resource: &str,
    t: f64,
    consumed: f64,
    available: f64,
    offenders: Vec<usize>,
) -> Violation {
    Violation::new(
        ViolationKind::ResourceBudget,
        offenders,
        format!(
            "platform {platform_id}: '{resource}' consumption {consumed:.6} exceeds available {available:.6} at t={t:.3}"
        ),
    )
}
