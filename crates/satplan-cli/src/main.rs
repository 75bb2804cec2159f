//! satplan - bounded SAT-based planner for grounded STRIPS problems.
//!
//! Reads a grounded domain (`-o`) and problem (`-f`), grows the plan horizon
//! until the solver finds a plan, and prints it as a numbered action listing
//! on stdout. Logs go to stderr.

mod input;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use satplan_core::{GroundProblem, Plan};
use satplan_encoding::StepSemantics;
use satplan_planner::{PlanOutcome, PlanReport, PlannerConfig, SatPlanner};
use satplan_solver::BackendKind;

#[derive(Parser)]
#[command(name = "satplan")]
#[command(about = "Bounded SAT-based planner for grounded STRIPS problems", version)]
struct Cli {
    /// Grounded domain file (facts and actions)
    #[arg(short = 'o', long = "domain", value_parser = existing_file)]
    domain: PathBuf,

    /// Grounded problem file (initial state and goal)
    #[arg(short = 'f', long = "problem", value_parser = existing_file)]
    problem: PathBuf,

    /// Solver timeout per horizon in seconds, 0 for none
    #[arg(short = 't', long)]
    timeout: Option<u64>,

    /// Maximum number of steps, at least 1
    #[arg(short = 'n', long = "max-steps", value_parser = clap::value_parser!(u32).range(1..))]
    max_steps: Option<u32>,

    /// Planner configuration (YAML)
    #[arg(long, value_parser = existing_file)]
    config: Option<PathBuf>,

    /// Allow several non-interfering actions per step
    #[arg(long)]
    parallel: bool,

    /// SAT backend (batsat, z3, reference)
    #[arg(long)]
    backend: Option<BackendKind>,

    /// Write a JSON report of the run
    #[arg(long)]
    report: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn existing_file(raw: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(raw);
    if path.is_file() {
        Ok(path)
    } else {
        Err(format!("no such file: {raw}"))
    }
}

impl Cli {
    fn planner_config(&self) -> Result<PlannerConfig> {
        let mut config = match &self.config {
            Some(path) => PlannerConfig::load(path)?,
            None => PlannerConfig::default(),
        };
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        if let Some(max_steps) = self.max_steps {
            config.max_steps = max_steps;
        }
        if self.parallel {
            config.semantics = StepSemantics::Parallel;
        }
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        Ok(config)
    }
}

/// Numbered listing, one action per line, prefixed by its time step.
fn render_plan(plan: &Plan, problem: &GroundProblem) -> String {
    let mut out = String::new();
    for step in &plan.steps {
        for &id in &step.actions {
            let name = problem.action(id).map_or("?", |a| a.name.as_str());
            out.push_str(&format!("{:02}: ({name})\n", step.time));
        }
    }
    out
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.planner_config()?;
    let problem = input::load(&cli.domain, &cli.problem)?;

    tracing::info!(
        backend = %config.backend,
        semantics = %config.semantics,
        max_steps = config.max_steps,
        timeout_secs = config.timeout_secs,
        "planning"
    );
    let run = SatPlanner::new(config.clone()).plan(&problem)?;

    if let Some(path) = &cli.report {
        PlanReport::new(&problem, &run, &config).write(path)?;
        tracing::info!(path = %path.display(), "wrote report");
    }

    match &run.outcome {
        PlanOutcome::Found { plan, horizon } => {
            print!("{}", render_plan(plan, &problem));
            tracing::info!(
                horizon,
                actions = plan.action_count(),
                total_ms = run.elapsed.as_millis() as u64,
                solve_ms = run.solve_time().as_millis() as u64,
                "plan found"
            );
            Ok(ExitCode::SUCCESS)
        }
        other => {
            eprintln!("no plan: {other}");
            Ok(ExitCode::from(1))
        }
    }
}
