//! One row of a benchmark report.

use std::fmt;
use std::time::Duration;

use crate::feasibility::Violation;
use crate::model::ProblemInstance;
use crate::schedule::Schedule;
use crate::scoring::Score;
use crate::window::IntervalSet;
use crate::Id;

/// What happened when a scheduler was run on an instance.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The schedule passed every feasibility check and was scored.
    Feasible,
    /// The schedule broke a constraint; it scores zero.
    Infeasible(Violation),
    /// The scheduler ran out of time, or never answered.
    TimedOut { partial_assignments: usize },
    /// The scheduler failed or panicked.
    Faulted { message: String },
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Feasible => "feasible",
            Outcome::Infeasible(_) => "infeasible",
            Outcome::TimedOut { .. } => "timed-out",
            Outcome::Faulted { .. } => "faulted",
        }
    }

    pub fn is_feasible(&self) -> bool {
        matches!(self, Outcome::Feasible)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Outcome::TimedOut { .. })
    }

    pub fn is_fault(&self) -> bool {
        matches!(self, Outcome::Faulted { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Feasible => f.write_str("feasible"),
            Outcome::Infeasible(v) => write!(f, "infeasible ({v})"),
            Outcome::TimedOut { partial_assignments } => {
                write!(f, "timed out with {partial_assignments} partial assignment(s)")
            }
            Outcome::Faulted { message } => write!(f, "faulted: {message}"),
        }
    }
}

/// What a schedule covered, and what no schedule could.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    /// Assignments returned (or committed before a timeout).
    pub assignments: usize,
    /// Distinct tasks among those assignments.
    pub distinct_tasks: usize,
    /// Tasks of the instance without any usable window.
    pub unschedulable: Vec<Id>,
    /// Tasks of the instance left out of the schedule, unschedulable ones
    /// included.
    pub unscheduled: usize,
    /// Share of the horizon during which some task window is open.
    pub visible_fraction: f64,
    /// Share of the horizon during which some platform is executing.
    pub busy_fraction: f64,
}

impl Diagnostics {
    pub(crate) fn of(instance: &ProblemInstance, schedule: Option<&Schedule>) -> Self {
        let unschedulable = instance.unschedulable_tasks().map(|t| t.id().to_string()).collect();
        let horizon = instance.horizon();
        let (assignments, distinct_tasks, busy) = match schedule {
            Some(s) => {
                let distinct = s
                    .task_ids()
                    .into_iter()
                    .filter(|id| instance.task(id).is_some())
                    .count();
                let busy: IntervalSet = s
                    .iter()
                    .filter_map(|a| instance.task(&a.task_id)?.execution_interval(&a.window, a.start))
                    .collect();
                (s.len(), distinct, busy)
            }
            None => (0, 0, IntervalSet::new()),
        };
        Self {
            assignments,
            distinct_tasks,
            unschedulable,
            unscheduled: instance.tasks().len() - distinct_tasks,
            visible_fraction: instance.visibility().fraction_of(&horizon),
            busy_fraction: busy.fraction_of(&horizon),
        }
    }
}

/// Result of one (instance, scheduler, seed) evaluation. Immutable.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkResult {
    instance: String,
    scheduler: String,
    seed: u64,
    outcome: Outcome,
    score: Score,
    wall_time: Duration,
    iterations: u64,
    diagnostics: Diagnostics,
}

impl BenchmarkResult {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        instance: String,
        scheduler: String,
        seed: u64,
        outcome: Outcome,
        score: Score,
        wall_time: Duration,
        iterations: u64,
        diagnostics: Diagnostics,
    ) -> Self {
        Self {
            instance,
            scheduler,
            seed,
            outcome,
            score,
            wall_time,
            iterations,
            diagnostics,
        }
    }

    pub fn instance(&self) -> &str {
        &self.instance
    }

    pub fn scheduler(&self) -> &str {
        &self.scheduler
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    /// Zero unless the outcome is [`Outcome::Feasible`].
    pub fn score(&self) -> &Score {
        &self.score
    }

    pub fn wall_time(&self) -> Duration {
        self.wall_time
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Sort key of report rows.
    pub(crate) fn key(&self) -> (&str, &str, u64) {
        (&self.scheduler, &self.instance, self.seed)
    }
}
