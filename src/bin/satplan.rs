use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use log::info;
use serde::Deserialize;

use satplan::algorithms::SchedulerRegistry;
use satplan::benchmark::{BenchmarkConfig, BenchmarkReport, BenchmarkRunner};
use satplan::generator::{definitions, generate, GeneratorConfig, Inclination};
use satplan::io::{load_instances, save_instance, write_report};
use satplan::model::{ObjectiveKind, ProblemInstance};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Satellite task planning benchmark harness"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run schedulers against problem instances
    Benchmark {
        #[command(subcommand)]
        action: BenchmarkCommand,
    },
    /// Generate synthetic problem instances
    Generate(GenerateArgs),
    /// List the registered schedulers
    Schedulers,
}

#[derive(Subcommand)]
enum BenchmarkCommand {
    /// Evaluate every scheduler on every instance with every seed
    Run(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Instance file (one object or an array) or a directory of them
    scenario: PathBuf,

    /// Comma-separated scheduler names (defaults to the config file, then all)
    #[arg(long, value_delimiter = ',')]
    schedulers: Vec<String>,

    /// Number of seeds, 0..N
    #[arg(long)]
    seeds: Option<u64>,

    /// Time budget per evaluation, in seconds
    #[arg(long)]
    budget_secs: Option<f64>,

    /// TOML file with benchmark settings; flags take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the full JSON report here (`-` for stdout)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Evaluate one run at a time
    #[arg(long, default_value_t = false)]
    sequential: bool,
}

#[derive(Args)]
struct GenerateArgs {
    /// Constellation size (must have a Walker configuration)
    #[arg(long, default_value_t = 1)]
    satellites: usize,

    /// Number of ground requests
    #[arg(long, default_value_t = 100)]
    requests: usize,

    /// Orbit family: mio or sso
    #[arg(long, default_value = "mio")]
    inclination: Inclination,

    /// Seed for the request generator
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Objective of the generated instance
    #[arg(long, default_value = "weighted-reward")]
    objective: ObjectiveKind,

    /// Output file (`-` for stdout)
    #[arg(long, default_value = "-")]
    output: PathBuf,

    /// Generate the whole definitions grid into this directory instead
    #[arg(long, conflicts_with_all = ["satellites", "requests", "inclination"])]
    all: Option<PathBuf>,
}

/// Benchmark settings read from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    time_budget_secs: Option<f64>,
    grace_secs: Option<f64>,
    seeds: Option<Vec<u64>>,
    parallel: Option<bool>,
    schedulers: Option<Vec<String>>,
}

fn init_logging() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_timestamp(Some(env_logger::fmt::TimestampPrecision::Millis))
        .init();
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Command::Benchmark {
            action: BenchmarkCommand::Run(args),
        } => run_benchmark(args),
        Command::Generate(args) => run_generate(args),
        Command::Schedulers => {
            for name in SchedulerRegistry::with_builtins().names() {
                println!("{name}");
            }
            Ok(())
        }
    }
}

fn run_benchmark(args: RunArgs) -> anyhow::Result<()> {
    let file_config = match &args.config {
        Some(path) => {
            let contents =
                fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
            toml::from_str::<FileConfig>(&contents).with_context(|| format!("parsing config {}", path.display()))?
        }
        None => FileConfig::default(),
    };

    let mut config = BenchmarkConfig::default();
    if let Some(secs) = args.budget_secs.or(file_config.time_budget_secs) {
        config.time_budget = seconds("time budget", secs)?;
    }
    if let Some(secs) = file_config.grace_secs {
        config.grace = seconds("grace", secs)?;
    }
    if let Some(seeds) = file_config.seeds {
        config.seeds = seeds;
    }
    if let Some(n) = args.seeds {
        config = config.with_seed_count(n);
    }
    if let Some(parallel) = file_config.parallel {
        config.parallel = parallel;
    }
    if args.sequential {
        config.parallel = false;
    }

    let registry = Arc::new(SchedulerRegistry::with_builtins());
    let schedulers: Vec<String> = if !args.schedulers.is_empty() {
        args.schedulers
    } else if let Some(names) = file_config.schedulers {
        names
    } else {
        registry.names().map(str::to_string).collect()
    };

    let instances: Vec<Arc<ProblemInstance>> = load_scenario(&args.scenario)?
        .into_iter()
        .map(Arc::new)
        .collect();
    info!(
        "loaded {} instance(s) from {}",
        instances.len(),
        args.scenario.display()
    );

    let report = BenchmarkRunner::new(registry, config)
        .run(&instances, &schedulers)
        .context("benchmark configuration rejected")?;

    print_summary(&report);
    if let Some(output) = &args.output {
        write_report(&report, output).with_context(|| format!("writing report {}", output.display()))?;
        info!("report written to {}", output.display());
    }
    Ok(())
}

fn run_generate(args: GenerateArgs) -> anyhow::Result<()> {
    if let Some(dir) = &args.all {
        info!("Generating datasets into {}", dir.display());
        for config in definitions() {
            let config = config.with_seed(args.seed).with_objective(args.objective);
            let instance = generate(&config).with_context(|| format!("generating {}", config.name()))?;
            let path = dir
                .join(config.inclination.name())
                .join(format!("{}.json", config.name()));
            save_instance(&instance, &path).with_context(|| format!("writing {}", path.display()))?;
            info!("saved {} to {}", config.name(), path.display());
        }
        return Ok(());
    }

    let config = GeneratorConfig::new(args.satellites, args.requests)?
        .with_inclination(args.inclination)
        .with_seed(args.seed)
        .with_objective(args.objective);
    info!("Generating dataset {}", config.name());
    let instance = generate(&config).with_context(|| format!("generating {}", config.name()))?;
    save_instance(&instance, &args.output).with_context(|| format!("writing {}", args.output.display()))?;
    Ok(())
}

/// Loads one file, or every `.json` file of a directory in name order.
fn load_scenario(path: &Path) -> anyhow::Result<Vec<ProblemInstance>> {
    if !path.is_dir() {
        return load_instances(path).with_context(|| format!("loading scenario {}", path.display()));
    }

    let mut files: Vec<PathBuf> = fs::read_dir(path)
        .with_context(|| format!("listing scenario directory {}", path.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    if files.is_empty() {
        bail!("no .json instance files in {}", path.display());
    }

    let mut instances = Vec::new();
    for file in files {
        instances.extend(load_instances(&file).with_context(|| format!("loading scenario {}", file.display()))?);
    }
    Ok(instances)
}

fn seconds(what: &str, secs: f64) -> anyhow::Result<Duration> {
    Duration::try_from_secs_f64(secs).with_context(|| format!("invalid {what}: {secs} s"))
}

fn print_summary(report: &BenchmarkReport) {
    println!(
        "{:<22} {:>5} {:>11} {:>11} {:>11} {:>11} {:>9} {:>8} {:>6} {:>9}",
        "scheduler", "runs", "mean", "median", "min", "max", "feasible", "timeout", "fault", "wall (s)"
    );
    for summary in report.summaries() {
        let s = &summary.stats;
        println!(
            "{:<22} {:>5} {:>11.4} {:>11.4} {:>11.4} {:>11.4} {:>8.1}% {:>8} {:>6} {:>9.3}",
            summary.scheduler,
            s.runs,
            s.mean_score,
            s.median_score,
            s.min_score,
            s.max_score,
            s.feasibility_rate * 100.0,
            s.timeouts,
            s.faults,
            s.mean_wall_time.as_secs_f64()
        );
    }
}
