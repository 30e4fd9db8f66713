//! Scoring engine.
//!
//! Turns a schedule and its feasibility verdict into a [`Score`] under the
//! instance's [`ObjectiveSpec`](crate::model::ObjectiveSpec). An infeasible
//! verdict scores zero whatever the objective.

use crate::feasibility::{UsageTrace, Verdict};
use crate::model::{ObjectiveKind, ObjectiveSpec, ProblemInstance};
use crate::schedule::Schedule;

/// Every objective component of a feasible schedule.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoreBreakdown {
    /// Σ `priority * quality` over assignments.
    pub reward: f64,
    /// Distinct tasks scheduled over total tasks.
    pub coverage: f64,
    /// Reward per unit of weighted consumption.
    pub efficiency: f64,
    /// Resource consumption aggregated with the objective's weights.
    pub weighted_consumption: f64,
}

impl ScoreBreakdown {
    /// Value of the component selected by `kind`.
    pub fn component(&self, kind: ObjectiveKind) -> f64 {
        match kind {
            ObjectiveKind::WeightedReward => self.reward,
            ObjectiveKind::CoverageFraction => self.coverage,
            ObjectiveKind::ResourceEfficiency => self.efficiency,
        }
    }

    /// `[reward, coverage, efficiency]`, in [`ObjectiveKind::ALL`] order.
    pub fn as_vector(&self) -> [f64; 3] {
        [self.reward, self.coverage, self.efficiency]
    }
}

/// Scalar objective value plus its breakdown.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Score {
    pub kind: ObjectiveKind,
    pub value: f64,
    pub breakdown: ScoreBreakdown,
}

impl Score {
    /// The score of an infeasible or missing schedule.
    pub fn zero(kind: ObjectiveKind) -> Self {
        Self {
            kind,
            value: 0.0,
            breakdown: ScoreBreakdown::default(),
        }
    }
}

/// Scores `schedule` under the objective of `instance`.
pub fn score(instance: &ProblemInstance, schedule: &Schedule, verdict: &Verdict) -> Score {
    let kind = instance.objective().kind();
    let Verdict::Feasible(trace) = verdict else {
        return Score::zero(kind);
    };
    let breakdown = breakdown(instance, schedule, trace);
    Score {
        kind,
        value: breakdown.component(kind),
        breakdown,
    }
}

fn breakdown(instance: &ProblemInstance, schedule: &Schedule, trace: &UsageTrace) -> ScoreBreakdown {
    let reward = total_reward(instance, schedule);
    let coverage = match instance.tasks().len() {
        0 => 0.0,
        n => schedule.task_ids().len() as f64 / n as f64,
    };
    let weighted_consumption = weighted_consumption(instance.objective(), trace);
    let efficiency = if weighted_consumption > 0.0 {
        reward / weighted_consumption
    } else {
        reward
    };
    ScoreBreakdown {
        reward,
        coverage,
        efficiency,
        weighted_consumption,
    }
}

/// Σ `priority * quality` using the admissible window hosting each assignment.
pub fn total_reward(instance: &ProblemInstance, schedule: &Schedule) -> f64 {
    schedule
        .iter()
        .filter_map(|a| {
            let task = instance.task(&a.task_id)?;
            let window = task.admissible_window(&a.platform_id, &a.window)?;
            Some(task.reward_in(window))
        })
        .sum()
}

fn weighted_consumption(objective: &ObjectiveSpec, trace: &UsageTrace) -> f64 {
    trace
        .series()
        .iter()
        .map(|s| objective.resource_weight(s.resource()) * s.total_consumed())
        .sum()
}
