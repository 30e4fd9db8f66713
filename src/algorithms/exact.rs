//! Depth-first branch and bound for small instances.
//!
//! Tasks are branched on in order of best achievable reward. Each task is
//! either placed left-justified in one of its windows or skipped. For
//! monotone objectives, a branch is pruned when even scheduling every
//! remaining task could not beat the incumbent. The search explores every
//! combination of task and window choices; it is exact with respect to the
//! left-justified insertion decoder.

use super::placement::Planner;
use super::{Scheduler, SchedulerError, TimeBudget};
use crate::model::{ObjectiveKind, ProblemInstance};
use crate::schedule::Schedule;

const BOUND_EPS: f64 = 1e-12;

/// Exhaustive search with an optimistic bound.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactSolver;

impl ExactSolver {
    pub const NAME: &'static str = "exact";

    pub fn new() -> Self {
        Self
    }
}

struct Search<'a> {
    instance: &'a ProblemInstance,
    budget: &'a TimeBudget,
    kind: ObjectiveKind,
    /// Tasks in branching order.
    order: Vec<usize>,
    /// `optimistic[d]`: best value the tasks `order[d..]` can add.
    optimistic: Vec<f64>,
    /// Partial plan of the node being visited.
    planner: Planner<'a>,
    best_value: f64,
    /// Placement decisions of the incumbent.
    best: Vec<(usize, usize)>,
}

/// Open node of the search. The planner holds the decisions for
/// `order[..depth]`; `next_window` counts the branches tried on
/// `order[depth]`, the last one being the branch that skips it.
struct Frame {
    depth: usize,
    next_window: usize,
    placed: bool,
}

impl<'a> Search<'a> {
    fn new(instance: &'a ProblemInstance, budget: &'a TimeBudget) -> Self {
        let tasks = instance.tasks();
        let kind = instance.objective().kind();
        let best_reward = |t: usize| {
            tasks[t]
                .windows()
                .iter()
                .map(|w| tasks[t].reward_in(w))
                .fold(0.0_f64, f64::max)
        };

        let mut order: Vec<usize> = (0..tasks.len())
            .filter(|&t| tasks[t].has_usable_window())
            .collect();
        order.sort_by(|&a, &b| {
            best_reward(b)
                .total_cmp(&best_reward(a))
                .then_with(|| tasks[a].id().cmp(tasks[b].id()))
        });

        let gain = |t: usize| match kind {
            ObjectiveKind::WeightedReward => best_reward(t),
            ObjectiveKind::CoverageFraction => 1.0 / tasks.len() as f64,
            ObjectiveKind::ResourceEfficiency => f64::INFINITY,
        };
        let mut optimistic = vec![0.0; order.len() + 1];
        for d in (0..order.len()).rev() {
            optimistic[d] = optimistic[d + 1] + gain(order[d]);
        }

        let planner = Planner::new(instance);
        Self {
            instance,
            budget,
            kind,
            order,
            optimistic,
            best_value: planner.objective_value(),
            planner,
            best: Vec::new(),
        }
    }

    /// Schedule of the incumbent, rebuilt from its decisions.
    fn best_schedule(&self) -> Schedule {
        let mut planner = Planner::new(self.instance);
        for (task, window) in self.best.iter().copied() {
            planner.place_in(task, window);
        }
        planner.into_schedule()
    }

    /// Visits the current plan as a node at `depth`. Returns `true` if its
    /// subtree still needs exploring.
    fn enter(&mut self, depth: usize) -> Result<bool, SchedulerError> {
        if self.budget.tick() {
            return Err(self.budget.exceeded(self.best_schedule()));
        }

        let value = self.planner.objective_value();
        if value > self.best_value + BOUND_EPS {
            self.best_value = value;
            self.best.clear();
            self.best.extend(self.planner.decisions());
        }
        if depth == self.order.len() {
            return Ok(false);
        }
        Ok(!(self.kind.is_monotone() && value + self.optimistic[depth] <= self.best_value + BOUND_EPS))
    }

    /// Depth-first walk with an explicit stack over a single planner that
    /// places on the way down and undoes on the way back. Each task tries its
    /// windows in order, then the branch that skips it.
    fn explore(&mut self) -> Result<(), SchedulerError> {
        let mut stack = Vec::with_capacity(self.order.len() + 1);
        if self.enter(0)? {
            stack.push(Frame {
                depth: 0,
                next_window: 0,
                placed: false,
            });
        }

        while let Some(frame) = stack.last_mut() {
            if frame.placed {
                self.planner.undo();
                frame.placed = false;
            }
            let task = self.order[frame.depth];
            let depth = frame.depth + 1;
            let windows = self.instance.tasks()[task].windows().len();

            let open = if frame.next_window < windows {
                let window = frame.next_window;
                frame.next_window += 1;
                if self.planner.place_in(task, window) {
                    frame.placed = true;
                    self.enter(depth)?
                } else {
                    false
                }
            } else if frame.next_window == windows {
                frame.next_window += 1;
                self.enter(depth)?
            } else {
                stack.pop();
                false
            };

            if open {
                stack.push(Frame {
                    depth,
                    next_window: 0,
                    placed: false,
                });
            }
        }
        Ok(())
    }
}

impl Scheduler for ExactSolver {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn plan(&self, instance: &ProblemInstance, budget: &TimeBudget, _seed: u64) -> Result<Schedule, SchedulerError> {
        let mut search = Search::new(instance, budget);
        search.explore()?;
        Ok(search.best_schedule())
    }
}
