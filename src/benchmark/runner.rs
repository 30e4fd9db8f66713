//! Cross-product evaluation of instances, schedulers and seeds.

use std::collections::BTreeSet;
use std::sync::Arc;

use log::{debug, info, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::config::BenchmarkConfig;
use super::error::BenchmarkError;
use super::report::BenchmarkReport;
use super::result::{BenchmarkResult, Diagnostics, Outcome};
use super::supervisor::{supervise, Answer, Job};
use crate::algorithms::{SchedulerError, SchedulerRegistry};
use crate::feasibility::{evaluate, Verdict};
use crate::model::ProblemInstance;
use crate::scoring::{score, Score};

/// Runs every scheduler on every instance with every seed.
///
/// Instances and the registry are shared read-only; each evaluation hands its
/// result back by value and the caller's thread assembles the report.
#[derive(Debug, Clone)]
pub struct BenchmarkRunner {
    registry: Arc<SchedulerRegistry>,
    config: BenchmarkConfig,
}

impl BenchmarkRunner {
    pub fn new(registry: Arc<SchedulerRegistry>, config: BenchmarkConfig) -> Self {
        Self { registry, config }
    }

    /// A runner over the built-in schedulers.
    pub fn with_builtins(config: BenchmarkConfig) -> Self {
        Self::new(Arc::new(SchedulerRegistry::with_builtins()), config)
    }

    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    pub fn registry(&self) -> &SchedulerRegistry {
        &self.registry
    }

    /// Evaluates `{instances} × {schedulers} × {seeds}`.
    ///
    /// # Errors
    ///
    /// Fails before any evaluation starts if the configuration is invalid,
    /// there are no instances or schedulers, two instances share a name, or a
    /// scheduler name is not registered. Timeouts, faults and infeasible
    /// schedules are recorded in the report instead.
    pub fn run<S: AsRef<str>>(
        &self,
        instances: &[Arc<ProblemInstance>],
        schedulers: &[S],
    ) -> Result<BenchmarkReport, BenchmarkError> {
        self.config.validate()?;
        if instances.is_empty() {
            return Err(BenchmarkError::NoInstances);
        }
        if schedulers.is_empty() {
            return Err(BenchmarkError::InvalidConfig("no schedulers selected".into()));
        }
        let mut names = BTreeSet::new();
        for instance in instances {
            if !names.insert(instance.name()) {
                return Err(BenchmarkError::InvalidConfig(format!(
                    "duplicate instance name '{}'",
                    instance.name()
                )));
            }
        }
        let resolved = self.registry.resolve(schedulers)?;

        let jobs: Vec<Job> = instances
            .iter()
            .flat_map(|instance| {
                resolved.iter().flat_map(move |(name, factory)| {
                    self.config.seeds.iter().map(move |&seed| Job {
                        instance: Arc::clone(instance),
                        scheduler: name.clone(),
                        factory: Arc::clone(factory),
                        seed,
                    })
                })
            })
            .collect();

        info!(
            "benchmark: {} instance(s) x {} scheduler(s) x {} seed(s) = {} evaluation(s), budget {:?}",
            instances.len(),
            resolved.len(),
            self.config.seeds.len(),
            jobs.len(),
            self.config.time_budget
        );

        let mut records = self.evaluate_all(&jobs);
        records.sort_by(|a, b| a.key().cmp(&b.key()));

        let report = BenchmarkReport::new(records);
        info!(
            "benchmark: done; {} feasible, {} timed out, {} faulted",
            report.records().iter().filter(|r| r.outcome().is_feasible()).count(),
            report.records().iter().filter(|r| r.outcome().is_timeout()).count(),
            report.records().iter().filter(|r| r.outcome().is_fault()).count(),
        );
        Ok(report)
    }

    #[cfg(feature = "parallel")]
    fn evaluate_all(&self, jobs: &[Job]) -> Vec<BenchmarkResult> {
        if self.config.parallel {
            jobs.par_iter().map(|job| self.evaluate(job)).collect()
        } else {
            jobs.iter().map(|job| self.evaluate(job)).collect()
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn evaluate_all(&self, jobs: &[Job]) -> Vec<BenchmarkResult> {
        jobs.iter().map(|job| self.evaluate(job)).collect()
    }

    fn evaluate(&self, job: &Job) -> BenchmarkResult {
        let instance = job.instance.as_ref();
        let kind = instance.objective().kind();
        debug!("evaluating {} on {} (seed {})", job.scheduler, instance.name(), job.seed);

        let supervised = supervise(job, self.config.time_budget, self.config.grace);

        let (outcome, score, diagnostics) = match supervised.answer {
            Answer::Planned(Ok(schedule)) if supervised.wall_time > self.config.time_budget => {
                warn!(
                    "{} on {} (seed {}) answered after {:?}, past its {:?} budget",
                    job.scheduler,
                    instance.name(),
                    job.seed,
                    supervised.wall_time,
                    self.config.time_budget
                );
                (
                    Outcome::TimedOut {
                        partial_assignments: schedule.len(),
                    },
                    Score::zero(kind),
                    Diagnostics::of(instance, Some(&schedule)),
                )
            }
            Answer::Planned(Ok(schedule)) => {
                let verdict = evaluate(instance, &schedule);
                let score = score(instance, &schedule, &verdict);
                let outcome = match verdict {
                    Verdict::Feasible(_) => Outcome::Feasible,
                    Verdict::Infeasible(violation) => {
                        debug!(
                            "{} on {} (seed {}) is infeasible: {}",
                            job.scheduler,
                            instance.name(),
                            job.seed,
                            violation
                        );
                        Outcome::Infeasible(violation)
                    }
                };
                (outcome, score, Diagnostics::of(instance, Some(&schedule)))
            }
            Answer::Planned(Err(SchedulerError::TimeoutExceeded { partial, .. })) => {
                warn!(
                    "{} on {} (seed {}) exceeded its time budget",
                    job.scheduler,
                    instance.name(),
                    job.seed
                );
                (
                    Outcome::TimedOut {
                        partial_assignments: partial.len(),
                    },
                    Score::zero(kind),
                    Diagnostics::of(instance, Some(&partial)),
                )
            }
            Answer::Planned(Err(SchedulerError::Fault { message })) => {
                warn!("{} on {} (seed {}) faulted: {}", job.scheduler, instance.name(), job.seed, message);
                (
                    Outcome::Faulted { message },
                    Score::zero(kind),
                    Diagnostics::of(instance, None),
                )
            }
            Answer::Panicked(message) => {
                warn!("{} on {} (seed {}) panicked: {}", job.scheduler, instance.name(), job.seed, message);
                (
                    Outcome::Faulted {
                        message: format!("panicked: {message}"),
                    },
                    Score::zero(kind),
                    Diagnostics::of(instance, None),
                )
            }
            Answer::Silent => (
                Outcome::TimedOut { partial_assignments: 0 },
                Score::zero(kind),
                Diagnostics::of(instance, None),
            ),
        };

        BenchmarkResult::new(
            instance.name().to_string(),
            job.scheduler.clone(),
            job.seed,
            outcome,
            score,
            supervised.wall_time,
            supervised.iterations,
            diagnostics,
        )
    }
}
