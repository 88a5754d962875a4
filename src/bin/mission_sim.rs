//! 任务仿真
//!
//! 读取 mission.json，运行一次仿真或蒙特卡洛批量，输出结果摘要与失败记录。

use clap::Parser;
use conops_sim::mission::{MissionError, MissionSpec, run_batch};
use conops_sim::sim::{FailureRecord, RunOutcome, RunSummary, StdRandom};
use conops_sim::vehicle::{Resources, TraceEntry, lock};
use serde::Serialize;
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "mission-sim",
    about = "Run a ConOps mission description through the discrete-event simulator"
)]
struct Args {
    /// Path to mission.json
    #[arg(long)]
    mission: PathBuf,

    /// Random seed; overrides the seed in the mission file
    #[arg(long)]
    seed: Option<u64>,

    /// Number of independent Monte Carlo runs
    #[arg(long, default_value_t = NonZeroUsize::MIN)]
    runs: NonZeroUsize,

    /// Write the failure log as JSON
    #[arg(long)]
    failures_json: Option<PathBuf>,

    /// Write the run (or batch) summary as JSON
    #[arg(long)]
    summary_json: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct VehicleReport {
    name: String,
    completed: bool,
    failure_count: u32,
    activity: Option<String>,
    resources: Resources,
    trace: Vec<TraceEntry>,
}

#[derive(Debug, Serialize)]
struct RunReport<'a> {
    summary: &'a RunSummary,
    failures: &'a [FailureRecord],
    vehicles: Vec<VehicleReport>,
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), MissionError> {
    let raw = serde_json::to_string_pretty(value)?;
    fs::write(path, raw)?;
    Ok(())
}

fn outcome_label(outcome: &RunOutcome) -> &'static str {
    match outcome {
        RunOutcome::Completed => "completed",
        RunOutcome::Failed { .. } => "failed",
        RunOutcome::HorizonReached => "horizon_reached",
    }
}

fn run_single(args: &Args, spec: &MissionSpec, seed: Option<u64>) -> Result<(), MissionError> {
    let random = match seed {
        Some(seed) => StdRandom::seeded(seed),
        None => StdRandom::from_entropy(),
    };
    let mut sim = spec.simulator(Box::new(random))?;
    let summary = sim.run_blocking()?;

    println!(
        "run outcome={} clock={} events={} completions={} failures={} stranded={}",
        outcome_label(&summary.outcome),
        summary.clock.as_f64(),
        summary.events_fired,
        summary.completions,
        summary.failures,
        summary.stranded
    );
    for rec in sim.failures().iter() {
        println!(
            "failure time={} vehicle={} activity={}",
            rec.time.as_f64(),
            rec.vehicle,
            rec.activity
        );
    }

    if let Some(path) = &args.failures_json {
        write_json(path, sim.failures())?;
    }
    if let Some(path) = &args.summary_json {
        let vehicles = sim
            .entities()
            .values()
            .map(|v| {
                let v = lock(v);
                VehicleReport {
                    name: v.name().to_string(),
                    completed: v.is_completed(),
                    failure_count: v.failure_count(),
                    activity: v.current_activity_name().map(str::to_string),
                    resources: v.resources().clone(),
                    trace: v.trace().to_vec(),
                }
            })
            .collect();
        let report = RunReport {
            summary: &summary,
            failures: sim.failures().records(),
            vehicles,
        };
        write_json(path, &report)?;
    }
    Ok(())
}

fn run_many(args: &Args, spec: &MissionSpec, seed: Option<u64>) -> Result<(), MissionError> {
    let base_seed = seed.unwrap_or_else(rand::random::<u64>);
    let summary = run_batch(spec, args.runs.get(), base_seed)?;

    println!(
        "batch runs={} successes={} success_rate={:.4} base_seed={}",
        summary.runs,
        summary.successes,
        summary.success_rate(),
        base_seed
    );
    for (activity, count) in &summary.failures_by_activity {
        println!("failures activity={activity} count={count}");
    }

    if let Some(path) = &args.failures_json {
        write_json(path, &summary.failures)?;
    }
    if let Some(path) = &args.summary_json {
        write_json(path, &summary)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();

    let result = MissionSpec::load(&args.mission).and_then(|spec| {
        let seed = args.seed.or(spec.seed);
        if args.runs.get() > 1 {
            run_many(&args, &spec, seed)
        } else {
            run_single(&args, &spec, seed)
        }
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
