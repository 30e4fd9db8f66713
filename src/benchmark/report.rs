//! Benchmark report and its aggregated summaries.

use std::collections::BTreeMap;
use std::time::Duration;

use super::result::BenchmarkResult;

/// Aggregate statistics over a group of benchmark results.
///
/// Every field except `mean_wall_time` is reproducible for fixed inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct RunStats {
    pub runs: usize,
    pub mean_score: f64,
    pub median_score: f64,
    pub min_score: f64,
    pub max_score: f64,
    /// Fraction of runs whose outcome is feasible.
    pub feasibility_rate: f64,
    pub timeouts: usize,
    pub faults: usize,
    pub mean_wall_time: Duration,
    pub mean_iterations: f64,
}

impl RunStats {
    fn of<'a>(results: impl IntoIterator<Item = &'a BenchmarkResult>) -> Self {
        let results: Vec<&BenchmarkResult> = results.into_iter().collect();
        let runs = results.len();
        if runs == 0 {
            return Self {
                runs: 0,
                mean_score: 0.0,
                median_score: 0.0,
                min_score: 0.0,
                max_score: 0.0,
                feasibility_rate: 0.0,
                timeouts: 0,
                faults: 0,
                mean_wall_time: Duration::ZERO,
                mean_iterations: 0.0,
            };
        }

        let mut scores: Vec<f64> = results.iter().map(|r| r.score().value).collect();
        scores.sort_by(f64::total_cmp);
        let n = runs as f64;
        let median_score = if runs % 2 == 1 {
            scores[runs / 2]
        } else {
            (scores[runs / 2 - 1] + scores[runs / 2]) / 2.0
        };
        let total_wall: Duration = results.iter().map(|r| r.wall_time()).sum();

        Self {
            runs,
            mean_score: scores.iter().sum::<f64>() / n,
            median_score,
            min_score: scores[0],
            max_score: scores[runs - 1],
            feasibility_rate: results.iter().filter(|r| r.outcome().is_feasible()).count() as f64 / n,
            timeouts: results.iter().filter(|r| r.outcome().is_timeout()).count(),
            faults: results.iter().filter(|r| r.outcome().is_fault()).count(),
            mean_wall_time: total_wall.div_f64(n),
            mean_iterations: results.iter().map(|r| r.iterations() as f64).sum::<f64>() / n,
        }
    }
}

/// Statistics of one scheduler across all instances and seeds.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerSummary {
    pub scheduler: String,
    pub stats: RunStats,
}

/// Statistics of one scheduler on one instance across seeds.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceSummary {
    pub scheduler: String,
    pub instance: String,
    pub stats: RunStats,
}

/// All results of a sweep, sorted by (scheduler, instance, seed).
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkReport {
    records: Vec<BenchmarkResult>,
}

impl BenchmarkReport {
    pub(crate) fn new(records: Vec<BenchmarkResult>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[BenchmarkResult] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Results of one scheduler.
    pub fn for_scheduler<'a>(&'a self, scheduler: &'a str) -> impl Iterator<Item = &'a BenchmarkResult> + 'a {
        self.records.iter().filter(move |r| r.scheduler() == scheduler)
    }

    /// One summary per scheduler, sorted by scheduler name.
    pub fn summaries(&self) -> Vec<SchedulerSummary> {
        let mut groups: BTreeMap<&str, Vec<&BenchmarkResult>> = BTreeMap::new();
        for record in &self.records {
            groups.entry(record.scheduler()).or_default().push(record);
        }
        groups
            .into_iter()
            .map(|(scheduler, results)| SchedulerSummary {
                scheduler: scheduler.to_string(),
                stats: RunStats::of(results),
            })
            .collect()
    }

    /// One summary per (scheduler, instance), sorted by scheduler then
    /// instance name.
    pub fn instance_summaries(&self) -> Vec<InstanceSummary> {
        let mut groups: BTreeMap<(&str, &str), Vec<&BenchmarkResult>> = BTreeMap::new();
        for record in &self.records {
            groups
                .entry((record.scheduler(), record.instance()))
                .or_default()
                .push(record);
        }
        groups
            .into_iter()
            .map(|((scheduler, instance), results)| InstanceSummary {
                scheduler: scheduler.to_string(),
                instance: instance.to_string(),
                stats: RunStats::of(results),
            })
            .collect()
    }
}
