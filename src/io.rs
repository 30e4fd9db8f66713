//! JSON files for problem instances and benchmark reports.
//!
//! The on-disk schema is a set of plain data structs ([`InstanceFile`] and
//! friends) with every instant and duration given in seconds as `f64`.
//! Loading always goes through
//! [`InstanceBuilder::build`](crate::model::InstanceBuilder::build), so a file that
//! decodes but breaks an instance invariant is rejected.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::benchmark::{BenchmarkReport, BenchmarkResult, Outcome, RunStats};
use crate::feasibility::Violation;
use crate::model::{
    AgilityModel, BudgetCurve, InstanceError, ObjectiveKind, ObjectiveSpec, Orientation, Platform,
    ProblemInstance, ResourceCost, Task, TaskDuration,
};
use crate::scoring::Score;
use crate::units::secs;
use crate::window::TimeInterval;
use crate::Id;

/// Errors raised while reading or writing files.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid instance in {}: {source}", path.display())]
    Instance {
        path: PathBuf,
        #[source]
        source: InstanceError,
    },
}

// ─── Instance schema ────────────────────────────────────────────────────────

/// Serialized [`ProblemInstance`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceFile {
    pub name: String,
    pub horizon: TimeInterval,
    #[serde(default)]
    pub objective: ObjectiveFile,
    pub platforms: Vec<PlatformFile>,
    pub tasks: Vec<TaskFile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveFile {
    pub kind: ObjectiveKind,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub resource_weights: BTreeMap<String, f64>,
}

impl Default for ObjectiveFile {
    fn default() -> Self {
        Self {
            kind: ObjectiveKind::WeightedReward,
            resource_weights: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformFile {
    pub id: Id,
    #[serde(default)]
    pub budgets: BTreeMap<String, BudgetFile>,
    #[serde(default)]
    pub agility: AgilityFile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetFile {
    pub initial: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<BudgetStepFile>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetStepFile {
    pub at: f64,
    pub increment: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "kebab-case")]
pub enum AgilityFile {
    #[default]
    Instant,
    Constant {
        transition_secs: f64,
    },
    Slew {
        rate_deg_per_s: f64,
        settle_secs: f64,
    },
    Table {
        default_secs: f64,
        #[serde(default)]
        symmetric: bool,
        #[serde(default)]
        pairs: Vec<TransitionFile>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionFile {
    pub from: Id,
    pub to: Id,
    pub secs: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskFile {
    pub id: Id,
    pub priority: f64,
    pub duration: DurationFile,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub costs: BTreeMap<String, CostFile>,
    #[serde(default)]
    pub orientation: OrientationFile,
    #[serde(default)]
    pub repeatable: bool,
    #[serde(default)]
    pub windows: Vec<WindowFile>,
}

/// `{"fixed": 30.0}` or `"from-window"`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DurationFile {
    Fixed(f64),
    FromWindow,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostFile {
    #[serde(default)]
    pub per_execution: f64,
    #[serde(default)]
    pub per_second: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OrientationFile {
    pub roll_deg: f64,
    pub pitch_deg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowFile {
    pub platform: Id,
    pub start: f64,
    pub end: f64,
    #[serde(default = "full_quality")]
    pub quality: f64,
}

fn full_quality() -> f64 {
    1.0
}

impl From<&ProblemInstance> for InstanceFile {
    fn from(instance: &ProblemInstance) -> Self {
        Self {
            name: instance.name().to_string(),
            horizon: instance.horizon(),
            objective: ObjectiveFile {
                kind: instance.objective().kind(),
                resource_weights: instance
                    .objective()
                    .resource_weights()
                    .map(|(k, w)| (k.to_string(), w))
                    .collect(),
            },
            platforms: instance.platforms().iter().map(PlatformFile::from).collect(),
            tasks: instance.tasks().iter().map(TaskFile::from).collect(),
        }
    }
}

impl From<&Platform> for PlatformFile {
    fn from(platform: &Platform) -> Self {
        let budgets = platform
            .budgets()
            .map(|(name, curve)| {
                let file = BudgetFile {
                    initial: curve.initial(),
                    steps: curve
                        .steps()
                        .iter()
                        .map(|s| BudgetStepFile {
                            at: s.at.value(),
                            increment: s.increment,
                        })
                        .collect(),
                };
                (name.to_string(), file)
            })
            .collect();
        let agility = match platform.agility() {
            AgilityModel::Instant => AgilityFile::Instant,
            AgilityModel::Constant { transition } => AgilityFile::Constant {
                transition_secs: transition.value(),
            },
            AgilityModel::Slew {
                rate_deg_per_s,
                settle,
            } => AgilityFile::Slew {
                rate_deg_per_s: *rate_deg_per_s,
                settle_secs: settle.value(),
            },
            AgilityModel::Table {
                default,
                pairs,
                symmetric,
            } => AgilityFile::Table {
                default_secs: default.value(),
                symmetric: *symmetric,
                pairs: pairs
                    .iter()
                    .map(|((from, to), cost)| TransitionFile {
                        from: from.clone(),
                        to: to.clone(),
                        secs: cost.value(),
                    })
                    .collect(),
            },
        };
        Self {
            id: platform.id().to_string(),
            budgets,
            agility,
        }
    }
}

impl From<&Task> for TaskFile {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id().to_string(),
            priority: task.priority(),
            duration: match task.duration() {
                TaskDuration::Fixed(length) => DurationFile::Fixed(length.value()),
                TaskDuration::FromWindow => DurationFile::FromWindow,
            },
            costs: task
                .costs()
                .map(|(name, cost)| {
                    let file = CostFile {
                        per_execution: cost.per_execution,
                        per_second: cost.per_second,
                    };
                    (name.to_string(), file)
                })
                .collect(),
            orientation: OrientationFile {
                roll_deg: task.orientation().roll_deg,
                pitch_deg: task.orientation().pitch_deg,
            },
            repeatable: task.is_repeatable(),
            windows: task
                .windows()
                .iter()
                .map(|w| WindowFile {
                    platform: w.platform_id.clone(),
                    start: w.interval.start().value(),
                    end: w.interval.end().value(),
                    quality: w.quality,
                })
                .collect(),
        }
    }
}

impl TryFrom<InstanceFile> for ProblemInstance {
    type Error = InstanceError;

    fn try_from(file: InstanceFile) -> Result<Self, Self::Error> {
        let mut objective = ObjectiveSpec::new(file.objective.kind);
        for (resource, weight) in file.objective.resource_weights {
            objective = objective.with_resource_weight(resource, weight);
        }

        let mut builder = ProblemInstance::builder(file.name, file.horizon).objective(objective);
        for platform in file.platforms {
            builder = builder.platform(platform.into_platform()?);
        }
        for task in file.tasks {
            builder = builder.task(task.into_task()?);
        }
        builder.build()
    }
}

impl PlatformFile {
    fn into_platform(self) -> Result<Platform, InstanceError> {
        let mut platform = Platform::new(self.id);
        for (name, budget) in self.budgets {
            let steps = budget.steps.into_iter().map(|s| (secs(s.at), s.increment));
            platform = platform.with_budget(name, BudgetCurve::replenishing(budget.initial, steps)?);
        }
        let agility = match self.agility {
            AgilityFile::Instant => AgilityModel::Instant,
            AgilityFile::Constant { transition_secs } => AgilityModel::Constant {
                transition: secs(transition_secs),
            },
            AgilityFile::Slew {
                rate_deg_per_s,
                settle_secs,
            } => AgilityModel::Slew {
                rate_deg_per_s,
                settle: secs(settle_secs),
            },
            AgilityFile::Table {
                default_secs,
                symmetric,
                pairs,
            } => pairs
                .into_iter()
                .fold(AgilityModel::table(secs(default_secs), symmetric), |model, pair| {
                    model.with_pair(pair.from, pair.to, secs(pair.secs))
                }),
        };
        Ok(platform.with_agility(agility))
    }
}

impl TaskFile {
    fn into_task(self) -> Result<Task, InstanceError> {
        let duration = match self.duration {
            DurationFile::Fixed(length) => TaskDuration::Fixed(secs(length)),
            DurationFile::FromWindow => TaskDuration::FromWindow,
        };
        let mut task = Task::new(self.id, self.priority, duration).with_orientation(Orientation::new(
            self.orientation.roll_deg,
            self.orientation.pitch_deg,
        ));
        if self.repeatable {
            task = task.repeatable();
        }
        for (name, cost) in self.costs {
            task = task.with_cost(name, ResourceCost::new(cost.per_execution, cost.per_second));
        }
        for window in self.windows {
            let interval = TimeInterval::from_secs(window.start, window.end)?;
            task = task.with_window(window.platform, interval, window.quality);
        }
        Ok(task)
    }
}

// ─── Report schema ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ReportFile<'a> {
    records: Vec<RecordFile<'a>>,
    summaries: Vec<SummaryFile>,
    instance_summaries: Vec<SummaryFile>,
}

#[derive(Debug, Serialize)]
struct RecordFile<'a> {
    instance: &'a str,
    scheduler: &'a str,
    seed: u64,
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    violation: Option<&'a Violation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    partial_assignments: Option<usize>,
    score: &'a Score,
    wall_time_secs: f64,
    iterations: u64,
    assignments: usize,
    distinct_tasks: usize,
    unscheduled: usize,
    unschedulable: &'a [Id],
    visible_fraction: f64,
    busy_fraction: f64,
}

impl<'a> From<&'a BenchmarkResult> for RecordFile<'a> {
    fn from(result: &'a BenchmarkResult) -> Self {
        let (violation, message, partial_assignments) = match result.outcome() {
            Outcome::Feasible => (None, None, None),
            Outcome::Infeasible(v) => (Some(v), None, None),
            Outcome::TimedOut { partial_assignments } => (None, None, Some(*partial_assignments)),
            Outcome::Faulted { message } => (None, Some(message.as_str()), None),
        };
        let diagnostics = result.diagnostics();
        Self {
            instance: result.instance(),
            scheduler: result.scheduler(),
            seed: result.seed(),
            outcome: result.outcome().label(),
            violation,
            message,
            partial_assignments,
            score: result.score(),
            wall_time_secs: result.wall_time().as_secs_f64(),
            iterations: result.iterations(),
            assignments: diagnostics.assignments,
            distinct_tasks: diagnostics.distinct_tasks,
            unscheduled: diagnostics.unscheduled,
            unschedulable: &diagnostics.unschedulable,
            visible_fraction: diagnostics.visible_fraction,
            busy_fraction: diagnostics.busy_fraction,
        }
    }
}

#[derive(Debug, Serialize)]
struct SummaryFile {
    scheduler: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    instance: Option<String>,
    runs: usize,
    mean_score: f64,
    median_score: f64,
    min_score: f64,
    max_score: f64,
    feasibility_rate: f64,
    timeouts: usize,
    faults: usize,
    mean_wall_time_secs: f64,
    mean_iterations: f64,
}

impl SummaryFile {
    fn new(scheduler: String, instance: Option<String>, stats: &RunStats) -> Self {
        Self {
            scheduler,
            instance,
            runs: stats.runs,
            mean_score: stats.mean_score,
            median_score: stats.median_score,
            min_score: stats.min_score,
            max_score: stats.max_score,
            feasibility_rate: stats.feasibility_rate,
            timeouts: stats.timeouts,
            faults: stats.faults,
            mean_wall_time_secs: stats.mean_wall_time.as_secs_f64(),
            mean_iterations: stats.mean_iterations,
        }
    }
}

impl<'a> From<&'a BenchmarkReport> for ReportFile<'a> {
    fn from(report: &'a BenchmarkReport) -> Self {
        Self {
            records: report.records().iter().map(RecordFile::from).collect(),
            summaries: report
                .summaries()
                .into_iter()
                .map(|s| SummaryFile::new(s.scheduler, None, &s.stats))
                .collect(),
            instance_summaries: report
                .instance_summaries()
                .into_iter()
                .map(|s| SummaryFile::new(s.scheduler, Some(s.instance), &s.stats))
                .collect(),
        }
    }
}

// ─── Files ──────────────────────────────────────────────────────────────────

/// Reads a file holding either one instance object or an array of them.
///
/// # Errors
///
/// Fails if the file cannot be read, is not valid JSON for the schema, or
/// describes an instance that does not build.
pub fn load_instances(path: impl AsRef<Path>) -> Result<Vec<ProblemInstance>, IoError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| io_error(path, source))?;
    let value: serde_json::Value =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| json_error(path, source))?;

    let files: Vec<InstanceFile> = if value.is_array() {
        serde_json::from_value::<Vec<InstanceFile>>(value)
    } else {
        serde_json::from_value::<InstanceFile>(value).map(|one| vec![one])
    }
    .map_err(|source| json_error(path, source))?;

    files
        .into_iter()
        .map(|file| {
            ProblemInstance::try_from(file).map_err(|source| IoError::Instance {
                path: path.to_path_buf(),
                source,
            })
        })
        .collect()
}

/// Writes one instance as a JSON object.
pub fn save_instance(instance: &ProblemInstance, path: impl AsRef<Path>) -> Result<(), IoError> {
    write_json(path.as_ref(), &InstanceFile::from(instance))
}

/// Writes instances as a JSON array.
pub fn save_instances<'a>(
    instances: impl IntoIterator<Item = &'a ProblemInstance>,
    path: impl AsRef<Path>,
) -> Result<(), IoError> {
    let files: Vec<InstanceFile> = instances.into_iter().map(InstanceFile::from).collect();
    write_json(path.as_ref(), &files)
}

/// Writes every record plus both summary tables. `-` writes to stdout.
pub fn write_report(report: &BenchmarkReport, path: impl AsRef<Path>) -> Result<(), IoError> {
    write_json(path.as_ref(), &ReportFile::from(report))
}

/// Create a writer for the target path, handling stdout (`-`) by convention.
fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    Ok(Box::new(BufWriter::new(file)))
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), IoError> {
    let mut writer = writer_for_path(path).map_err(|source| io_error(path, source))?;
    serde_json::to_writer_pretty(&mut writer, value).map_err(|source| json_error(path, source))?;
    writeln!(writer).map_err(|source| io_error(path, source))?;
    writer.flush().map_err(|source| io_error(path, source))
}

fn io_error(path: &Path, source: io::Error) -> IoError {
    IoError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn json_error(path: &Path, source: serde_json::Error) -> IoError {
    IoError::Json {
        path: path.to_path_buf(),
        source,
    }
}
