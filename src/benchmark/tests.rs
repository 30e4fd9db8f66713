//! Test suite for the benchmark runner.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use super::*;
use crate::algorithms::{RegistryError, Scheduler, SchedulerError, SchedulerRegistry, TimeBudget};
use crate::model::{Platform, ProblemInstance, Task, TaskDuration};
use crate::schedule::{Assignment, Schedule};
use crate::units::secs;
use crate::window::TimeInterval;

fn iv(start: f64, end: f64) -> TimeInterval {
    TimeInterval::from_secs(start, end).unwrap()
}

/// One platform, one task worth 10 at quality 0.5, plus a task nothing can host.
fn instance(name: &str) -> Arc<ProblemInstance> {
    Arc::new(
        ProblemInstance::builder(name, iv(0.0, 100.0))
            .platform(Platform::new("sat"))
            .task(Task::new("obs", 10.0, TaskDuration::Fixed(secs(5.0))).with_window("sat", iv(10.0, 30.0), 0.5))
            .task(Task::new("orphan", 3.0, TaskDuration::Fixed(secs(5.0))))
            .build()
            .unwrap(),
    )
}

/// Faults on one named instance, returns an empty schedule elsewhere.
struct FaultOn(&'static str);

impl Scheduler for FaultOn {
    fn name(&self) -> &str {
        "fault-on"
    }

    fn plan(&self, instance: &ProblemInstance, _budget: &TimeBudget, _seed: u64) -> Result<Schedule, SchedulerError> {
        if instance.name() == self.0 {
            Err(SchedulerError::fault("solver diverged"))
        } else {
            Ok(Schedule::new())
        }
    }
}

struct Panics;

impl Scheduler for Panics {
    fn name(&self) -> &str {
        "panics"
    }

    fn plan(&self, _instance: &ProblemInstance, _budget: &TimeBudget, _seed: u64) -> Result<Schedule, SchedulerError> {
        panic!("index out of range")
    }
}

/// Ignores its budget entirely.
struct Sleeper;

impl Scheduler for Sleeper {
    fn name(&self) -> &str {
        "sleeper"
    }

    fn plan(&self, _instance: &ProblemInstance, _budget: &TimeBudget, _seed: u64) -> Result<Schedule, SchedulerError> {
        thread::sleep(Duration::from_secs(2));
        Ok(Schedule::new())
    }
}

/// Commits one assignment, then spins until the budget expires.
struct Spinner;

impl Scheduler for Spinner {
    fn name(&self) -> &str {
        "spinner"
    }

    fn plan(&self, _instance: &ProblemInstance, budget: &TimeBudget, _seed: u64) -> Result<Schedule, SchedulerError> {
        let partial: Schedule = vec![Assignment::at_window_start("obs", "sat", iv(10.0, 30.0))].into();
        while !budget.tick() {
            thread::sleep(Duration::from_millis(1));
        }
        Err(budget.exceeded(partial))
    }
}

/// Ignores its budget but answers before the supervisor gives up.
struct Overrun;

impl Scheduler for Overrun {
    fn name(&self) -> &str {
        "overrun"
    }

    fn plan(&self, _instance: &ProblemInstance, budget: &TimeBudget, _seed: u64) -> Result<Schedule, SchedulerError> {
        thread::sleep(budget.limit() + Duration::from_millis(200));
        Ok(vec![Assignment::at_window_start("obs", "sat", iv(10.0, 30.0))].into())
    }
}

/// Returns a schedule naming a task that does not exist.
struct Garbage;

impl Scheduler for Garbage {
    fn name(&self) -> &str {
        "garbage"
    }

    fn plan(&self, _instance: &ProblemInstance, _budget: &TimeBudget, _seed: u64) -> Result<Schedule, SchedulerError> {
        Ok(vec![Assignment::at_window_start("nope", "sat", iv(10.0, 30.0))].into())
    }
}

fn registry() -> Arc<SchedulerRegistry> {
    let mut registry = SchedulerRegistry::with_builtins();
    registry.register("fault-on-x", || Box::new(FaultOn("x"))).unwrap();
    registry.register("panics", || Box::new(Panics)).unwrap();
    registry.register("sleeper", || Box::new(Sleeper)).unwrap();
    registry.register("spinner", || Box::new(Spinner)).unwrap();
    registry.register("garbage", || Box::new(Garbage)).unwrap();
    registry.register("overrun", || Box::new(Overrun)).unwrap();
    Arc::new(registry)
}

fn runner(config: BenchmarkConfig) -> BenchmarkRunner {
    BenchmarkRunner::new(registry(), config)
}

fn fast() -> BenchmarkConfig {
    BenchmarkConfig::default()
        .with_time_budget(Duration::from_millis(500))
        .with_grace(Duration::from_millis(200))
}

#[cfg(test)]
mod outcomes {
    use super::*;

    #[test]
    fn test_feasible_single_assignment_scores_five() {
        let report = runner(fast()).run(&[instance("x")], &["greedy-reward"]).unwrap();
        assert_eq!(report.len(), 1);
        let record = &report.records()[0];
        assert_eq!(record.outcome(), &Outcome::Feasible);
        assert_eq!(record.score().value, 5.0);
        assert_eq!(record.diagnostics().assignments, 1);
        assert_eq!(record.diagnostics().distinct_tasks, 1);
        assert_eq!(record.diagnostics().visible_fraction, 0.2);
        assert_eq!(record.diagnostics().busy_fraction, 0.05);
    }

    #[test]
    fn test_unschedulable_task_appears_in_diagnostics() {
        let report = runner(fast())
            .run(&[instance("x")], &["greedy-reward", "greedy-window-count", "local-search", "exact"])
            .unwrap();
        for record in report.records() {
            assert_eq!(record.diagnostics().unschedulable, vec!["orphan".to_string()]);
            assert_eq!(record.diagnostics().unscheduled, 1);
        }
    }

    #[test]
    fn test_fault_is_recorded_and_sweep_continues() {
        let report = runner(fast())
            .run(&[instance("x"), instance("y")], &["fault-on-x"])
            .unwrap();
        let records = report.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].instance(), "x");
        assert!(matches!(records[0].outcome(), Outcome::Faulted { message } if message == "solver diverged"));
        assert_eq!(records[0].score().value, 0.0);
        assert_eq!(records[1].instance(), "y");
        assert_eq!(records[1].outcome(), &Outcome::Feasible);
    }

    #[test]
    fn test_panic_becomes_fault() {
        let report = runner(fast()).run(&[instance("x")], &["panics", "greedy-reward"]).unwrap();
        let panicked = report.for_scheduler("panics").next().unwrap();
        assert!(matches!(panicked.outcome(), Outcome::Faulted { message } if message.contains("index out of range")));
        assert_eq!(report.for_scheduler("greedy-reward").next().unwrap().score().value, 5.0);
    }

    #[test]
    fn test_unresponsive_scheduler_times_out() {
        let report = runner(fast()).run(&[instance("x")], &["sleeper", "greedy-reward"]).unwrap();
        let slept = report.for_scheduler("sleeper").next().unwrap();
        assert_eq!(slept.outcome(), &Outcome::TimedOut { partial_assignments: 0 });
        assert_eq!(slept.score().value, 0.0);
        assert!(report.for_scheduler("greedy-reward").next().unwrap().outcome().is_feasible());
    }

    #[test]
    fn test_answer_after_budget_within_grace_is_a_timeout() {
        let config = BenchmarkConfig::default()
            .with_time_budget(Duration::from_millis(300))
            .with_grace(Duration::from_secs(2));
        let report = runner(config).run(&[instance("x")], &["overrun"]).unwrap();
        let record = &report.records()[0];
        assert_eq!(record.outcome(), &Outcome::TimedOut { partial_assignments: 1 });
        assert_eq!(record.score().value, 0.0);
        assert!(record.wall_time() > Duration::from_millis(300));
        assert!(record.wall_time() < Duration::from_secs(2));
    }

    #[test]
    fn test_cooperative_timeout_keeps_partial_count() {
        let report = runner(fast()).run(&[instance("x")], &["spinner"]).unwrap();
        let record = &report.records()[0];
        assert_eq!(record.outcome(), &Outcome::TimedOut { partial_assignments: 1 });
        assert_eq!(record.score().value, 0.0);
        assert!(record.iterations() > 0);
    }

    #[test]
    fn test_garbage_schedule_is_infeasible_not_a_crash() {
        let report = runner(fast()).run(&[instance("x")], &["garbage"]).unwrap();
        match report.records()[0].outcome() {
            Outcome::Infeasible(v) => {
                assert_eq!(v.kind(), crate::feasibility::ViolationKind::ReferenceIntegrity)
            }
            other => panic!("unexpected outcome {other}"),
        }
    }
}

#[cfg(test)]
mod configuration_errors {
    use super::*;

    #[test]
    fn test_unknown_scheduler_fails_before_any_work() {
        let err = runner(fast())
            .run(&[instance("x")], &["greedy-reward", "sleeper", "does-not-exist"])
            .unwrap_err();
        assert!(matches!(
            err,
            BenchmarkError::Registry(RegistryError::UnknownScheduler { ref name, .. }) if name == "does-not-exist"
        ));
    }

    #[test]
    fn test_no_instances() {
        let err = runner(fast()).run(&[], &["greedy-reward"]).unwrap_err();
        assert_eq!(err, BenchmarkError::NoInstances);
    }

    #[test]
    fn test_no_schedulers() {
        let none: [&str; 0] = [];
        let err = runner(fast()).run(&[instance("x")], &none).unwrap_err();
        assert!(matches!(err, BenchmarkError::InvalidConfig(_)));
    }

    #[test]
    fn test_duplicate_instance_names() {
        let err = runner(fast())
            .run(&[instance("x"), instance("x")], &["greedy-reward"])
            .unwrap_err();
        assert!(matches!(err, BenchmarkError::InvalidConfig(ref m) if m.contains("duplicate")));
    }
}

#[cfg(test)]
mod aggregation {
    use super::*;

    fn comparable(summary: &SchedulerSummary) -> (String, usize, f64, f64, f64, f64, f64, usize, usize, f64) {
        let s = &summary.stats;
        (
            summary.scheduler.clone(),
            s.runs,
            s.mean_score,
            s.median_score,
            s.min_score,
            s.max_score,
            s.feasibility_rate,
            s.timeouts,
            s.faults,
            s.mean_iterations,
        )
    }

    #[test]
    fn test_records_sorted_by_scheduler_instance_seed() {
        let config = fast().with_seeds([2, 0, 1]);
        let report = runner(config)
            .run(&[instance("y"), instance("x")], &["local-search", "greedy-reward"])
            .unwrap();
        let keys: Vec<(String, String, u64)> = report
            .records()
            .iter()
            .map(|r| (r.scheduler().to_string(), r.instance().to_string(), r.seed()))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert_eq!(keys.len(), 12);
    }

    #[test]
    fn test_report_is_independent_of_input_and_execution_order() {
        let instances = [instance("x"), instance("y")];
        let reversed = [instance("y"), instance("x")];

        let a = runner(fast().with_seed_count(3).with_parallel(true))
            .run(&instances, &["greedy-reward", "local-search", "fault-on-x"])
            .unwrap();
        let b = runner(fast().with_seeds([2, 1, 0]).with_parallel(false))
            .run(&reversed, &["fault-on-x", "local-search", "greedy-reward"])
            .unwrap();

        let sa: Vec<_> = a.summaries().iter().map(comparable).collect();
        let sb: Vec<_> = b.summaries().iter().map(comparable).collect();
        assert_eq!(sa, sb);

        let scores_a: Vec<f64> = a.records().iter().map(|r| r.score().value).collect();
        let scores_b: Vec<f64> = b.records().iter().map(|r| r.score().value).collect();
        assert_eq!(scores_a, scores_b);
    }

    #[test]
    fn test_summary_statistics() {
        let report = runner(fast())
            .run(&[instance("x"), instance("y")], &["fault-on-x"])
            .unwrap();
        let summaries = report.summaries();
        assert_eq!(summaries.len(), 1);
        let stats = &summaries[0].stats;
        assert_eq!(stats.runs, 2);
        assert_eq!(stats.faults, 1);
        assert_eq!(stats.feasibility_rate, 0.5);
        assert_eq!(stats.mean_score, 0.0);

        let per_instance = report.instance_summaries();
        assert_eq!(per_instance.len(), 2);
        assert_eq!(per_instance[0].instance, "x");
        assert_eq!(per_instance[0].stats.faults, 1);
        assert_eq!(per_instance[1].stats.feasibility_rate, 1.0);
    }

    #[test]
    fn test_median_of_even_count() {
        let report = runner(fast().with_seed_count(2))
            .run(&[instance("x"), instance("y")], &["greedy-reward"])
            .unwrap();
        let stats = &report.summaries()[0].stats;
        assert_eq!(stats.runs, 4);
        assert_eq!(stats.median_score, 5.0);
        assert_eq!(stats.min_score, 5.0);
        assert_eq!(stats.max_score, 5.0);
    }
}
