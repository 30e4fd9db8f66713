//! Permutation local search over the insertion decoder.
//!
//! # Algorithm
//!
//! 1. Order tasks by best achievable reward and decode the order with the
//!    [`Planner`]
//! 2. Repeat until `max_iterations` neighbours have been evaluated:
//!    a. apply a random swap or relocate move to the current order
//!    b. decode it; keep it if it is at least as good (hill climbing)
//!    c. after `stall_limit` moves without strict improvement, restart from
//!       the best order perturbed by `perturbation_strength` random swaps
//! 3. Return the best schedule found
//!
//! Randomness comes only from a [`StdRng`] seeded with the `plan` seed.

mod config;

pub use config::LocalSearchConfig;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::placement::Planner;
use super::{Scheduler, SchedulerError, TimeBudget};
use crate::model::ProblemInstance;
use crate::schedule::Schedule;

const IMPROVEMENT_EPS: f64 = 1e-12;

/// Hill-climbing local search with perturbation restarts.
#[derive(Debug, Clone, Default)]
pub struct LocalSearch {
    config: LocalSearchConfig,
}

impl LocalSearch {
    pub const NAME: &'static str = "local-search";

    pub fn new(config: LocalSearchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LocalSearchConfig {
        &self.config
    }
}

/// A decoded task order.
struct Candidate {
    order: Vec<usize>,
    value: f64,
    schedule: Schedule,
}

fn decode(instance: &ProblemInstance, order: Vec<usize>) -> Candidate {
    let mut planner = Planner::new(instance);
    for &task in &order {
        planner.place(task);
    }
    Candidate {
        value: planner.objective_value(),
        schedule: planner.into_schedule(),
        order,
    }
}

/// Tasks with a usable window, best achievable reward first.
fn initial_order(instance: &ProblemInstance) -> Vec<usize> {
    let tasks = instance.tasks();
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
    order
}

fn neighbour<R: Rng>(order: &[usize], rng: &mut R) -> Vec<usize> {
    let mut next = order.to_vec();
    let n = next.len();
    let i = rng.gen_range(0..n);
    let mut j = rng.gen_range(0..n - 1);
    if j >= i {
        j += 1;
    }
    if rng.gen_bool(0.5) {
        next.swap(i, j);
    } else {
        let task = next.remove(i);
        next.insert(j, task);
    }
    next
}

fn perturb<R: Rng>(order: &[usize], strength: usize, rng: &mut R) -> Vec<usize> {
    let mut next = order.to_vec();
    let n = next.len();
    for _ in 0..strength {
        let i = rng.gen_range(0..n);
        let j = rng.gen_range(0..n);
        next.swap(i, j);
    }
    next
}

impl Scheduler for LocalSearch {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn plan(&self, instance: &ProblemInstance, budget: &TimeBudget, seed: u64) -> Result<Schedule, SchedulerError> {
        self.config.validate().map_err(SchedulerError::fault)?;

        let mut rng = StdRng::seed_from_u64(seed);
        let mut current = decode(instance, initial_order(instance));
        if budget.tick() {
            return Err(budget.exceeded(current.schedule));
        }
        if current.order.len() < 2 {
            return Ok(current.schedule);
        }

        let mut best_order = current.order.clone();
        let mut best_value = current.value;
        let mut best_schedule = current.schedule.clone();
        let mut stall = 0usize;

        for _ in 0..self.config.max_iterations {
            if budget.tick() {
                return Err(budget.exceeded(best_schedule));
            }

            let candidate = decode(instance, neighbour(&current.order, &mut rng));
            if candidate.value > current.value + IMPROVEMENT_EPS {
                stall = 0;
            } else {
                stall += 1;
            }
            if candidate.value + IMPROVEMENT_EPS >= current.value {
                current = candidate;
            }
            if current.value > best_value + IMPROVEMENT_EPS {
                best_value = current.value;
                best_order.clone_from(&current.order);
                best_schedule = current.schedule.clone();
            }

            if stall >= self.config.stall_limit {
                current = decode(
                    instance,
                    perturb(&best_order, self.config.perturbation_strength, &mut rng),
                );
                stall = 0;
            }
        }

        Ok(best_schedule)
    }
}
