use proptest::prelude::*;

use satplan::algorithms::{Scheduler, SchedulerRegistry, TimeBudget};
use satplan::feasibility::evaluate;
use satplan::model::{
    AgilityModel, BudgetCurve, Orientation, Platform, ProblemInstance, ResourceCost, Task, TaskDuration,
};
use satplan::scoring::score;
use satplan::units::secs;
use satplan::window::{intersect, overlaps, IntervalSet, TimeInterval};

fn interval() -> impl Strategy<Value = TimeInterval> {
    (-1_000.0f64..1_000.0, 0.001f64..500.0).prop_map(|(start, len)| TimeInterval::from_secs(start, start + len).unwrap())
}

/// (priority, duration, roll, energy per second, windows as (platform, start, length, quality))
type TaskParams = (f64, f64, f64, f64, Vec<(usize, f64, f64, f64)>);

fn task_params() -> impl Strategy<Value = TaskParams> {
    (
        0.0f64..10.0,
        1.0f64..30.0,
        -20.0f64..20.0,
        0.0f64..2.0,
        prop::collection::vec((0usize..3, 0.0f64..240.0, 5.0f64..60.0, 0.0f64..=1.0), 0..3),
    )
}

fn instance() -> impl Strategy<Value = ProblemInstance> {
    (
        1usize..=3,
        prop::collection::vec(0.0f64..80.0, 3),
        prop::collection::vec(task_params(), 1..8),
    )
        .prop_map(|(platforms, capacities, tasks)| {
            let mut builder = ProblemInstance::builder("random", TimeInterval::from_secs(0.0, 300.0).unwrap());
            for p in 0..platforms {
                builder = builder.platform(
                    Platform::new(format!("p{p}"))
                        .with_budget("energy", BudgetCurve::replenishing(capacities[p], [(secs(150.0), 20.0)]).unwrap())
                        .with_agility(AgilityModel::Slew {
                            rate_deg_per_s: 2.0,
                            settle: secs(1.0),
                        }),
                );
            }
            for (i, (priority, length, roll, power, windows)) in tasks.into_iter().enumerate() {
                let mut task = Task::new(format!("t{i}"), priority, TaskDuration::Fixed(secs(length)))
                    .with_orientation(Orientation::new(roll, 0.0))
                    .with_cost("energy", ResourceCost::per_second(power));
                for (platform, start, len, quality) in windows {
                    let window = TimeInterval::from_secs(start, start + len).unwrap();
                    task = task.with_window(format!("p{}", platform % platforms), window, quality);
                }
                builder = builder.task(task);
            }
            builder.build().unwrap()
        })
}

proptest! {
    #[test]
    fn overlap_is_symmetric(a in interval(), b in interval()) {
        prop_assert_eq!(overlaps(&a, &b), overlaps(&b, &a));
    }

    #[test]
    fn interval_overlaps_itself(a in interval()) {
        prop_assert!(overlaps(&a, &a));
    }

    #[test]
    fn intersection_lies_in_both(a in interval(), b in interval()) {
        match intersect(&a, &b) {
            Some(i) => {
                prop_assert!(a.contains_interval(&i));
                prop_assert!(b.contains_interval(&i));
                prop_assert!(overlaps(&a, &b));
            }
            None => prop_assert!(!overlaps(&a, &b)),
        }
    }

    #[test]
    fn interval_set_is_sorted_and_disjoint(items in prop::collection::vec(interval(), 0..12)) {
        let mut set = IntervalSet::new();
        for item in &items {
            set.push(*item);
        }
        for pair in set.windows(2) {
            prop_assert!(pair[0].end().value() < pair[1].start().value());
        }
        for item in &items {
            prop_assert!(set.iter().any(|member| member.contains_interval(item)));
        }
    }

    #[test]
    fn greedy_schedules_are_feasible_and_repeatable(instance in instance(), seed in any::<u64>()) {
        let registry = SchedulerRegistry::with_builtins();
        for name in ["greedy-reward", "greedy-window-count", "exact"] {
            let scheduler = registry.create(name).unwrap();
            let schedule = scheduler.plan(&instance, &TimeBudget::unlimited(), seed).unwrap();
            let again = scheduler.plan(&instance, &TimeBudget::unlimited(), seed).unwrap();
            prop_assert_eq!(&schedule, &again);

            let verdict = evaluate(&instance, &schedule);
            prop_assert!(verdict.is_feasible(), "{} produced {:?}", name, verdict.violation());
            prop_assert!(score(&instance, &schedule, &verdict).value >= 0.0);
        }
    }
}
