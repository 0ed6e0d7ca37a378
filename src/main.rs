use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use energy_alloc::allocation::{AllocationMatrix, ExecutionReport, Issue};
use energy_alloc::config::{RaceConfig, ServerConfig, SolverConfig};
use energy_alloc::grpc::GrpcServer;
use energy_alloc::model::ProblemFile;
use energy_alloc::race::{ContenderResult, RaceCoordinator, RaceOutcome, RaceReport};
use energy_alloc::shutdown::install_shutdown_handler;
use energy_alloc::solver::{GeneticSolver, RemoteSolver};

#[derive(Parser, Debug)]
#[command(name = "energy-alloc")]
#[command(version)]
#[command(about = "Energy-aware task allocation with racing genetic solvers")]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Serve one genetic solver over gRPC
    Serve(ServeArgs),

    /// Race two solvers on a problem file and report the better allocation
    Race(RaceArgs),

    /// Check a problem file against its declared counts and limits
    Validate {
        /// Path to the problem file (JSON)
        #[arg(long)]
        problem: PathBuf,
    },

    /// Decode an allocation map against a problem file
    Decode {
        /// Path to the problem file (JSON)
        #[arg(long)]
        problem: PathBuf,

        /// Allocation map, e.g. "1,0,1;0,1,0"
        #[arg(long)]
        map: String,

        /// Output format
        #[arg(long, short = 'o', default_value = "table")]
        output: OutputFormat,
    },
}

// =============================================================================
// Arguments
// =============================================================================

#[derive(Parser, Debug)]
struct ServeArgs {
    /// Name reported in logs and race results
    #[arg(long, default_value = "solver")]
    name: String,

    /// Port to listen on for gRPC
    #[arg(long, default_value = "50061")]
    port: u16,

    /// Search tuning preset
    #[arg(long, default_value = "balanced")]
    profile: Profile,

    /// Fixed RNG seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Parser, Debug)]
struct RaceArgs {
    /// Path to the problem file (JSON)
    #[arg(long)]
    problem: PathBuf,

    /// Two remote solver addresses (comma-separated). Runs both solvers
    /// in-process when omitted.
    /// Example: "127.0.0.1:50061,127.0.0.1:50062"
    #[arg(long)]
    remote: Option<String>,

    /// Search budget handed to each solver, in minutes
    #[arg(long, default_value = "1.0")]
    timeout_minutes: f64,

    /// Extra seconds to wait for solvers beyond their budget
    #[arg(long, default_value = "5")]
    grace_secs: u64,

    /// Fixed RNG seed for the in-process solvers
    #[arg(long)]
    seed: Option<u64>,

    /// Write the allocations (primary first) to this file
    #[arg(long)]
    allocations_out: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', default_value = "table")]
    output: OutputFormat,
}

#[derive(Debug, Clone, ValueEnum)]
enum Profile {
    Balanced,
    Exploratory,
}

impl Profile {
    fn solver_config(&self) -> SolverConfig {
        match self {
            Profile::Balanced => SolverConfig::default(),
            Profile::Exploratory => SolverConfig::exploratory(),
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

// =============================================================================
// JSON Output Types
// =============================================================================

#[derive(Serialize)]
struct ReportOutput<'a> {
    allocation_id: usize,
    runtime: f64,
    energy: f64,
    report: &'a ExecutionReport,
}

#[derive(Serialize)]
struct TimeoutOutput<'a> {
    race_id: String,
    timed_out: bool,
    window_ms: u64,
    pending: &'a [String],
}

// =============================================================================
// Helper Functions
// =============================================================================

fn print_report(report: &ExecutionReport) {
    println!(
        "Allocation ID={} Runtime={:.2} Energy={}",
        report.allocation_id,
        report.runtime(),
        report.total_energy()
    );
    for summary in &report.processors {
        println!("{}", summary.summary_line());
    }
    print_issues(&report.issues);
}

fn print_issues(issues: &[Issue]) {
    for issue in issues {
        println!("  {}", issue);
    }
}

fn print_race(report: &RaceReport) {
    println!("Race {} decided at {}", report.race_id, report.decided_at);
    let order = match report.primary {
        Some(1) => [1, 0],
        _ => [0, 1],
    };
    for i in order {
        let contender = &report.contenders[i];
        let label = if report.primary == Some(i) {
            "primary"
        } else {
            "runner-up"
        };
        println!();
        match &contender.result {
            ContenderResult::Report {
                report: execution,
                improvements,
                ..
            } => {
                println!(
                    "[{}] {} ({} improvements)",
                    label, contender.solver, improvements
                );
                print_report(execution);
            }
            ContenderResult::NoFeasible => {
                println!("[{}] no feasible allocation found", contender.solver);
            }
            ContenderResult::Failed { reason } => {
                println!("[{}] failed: {}", contender.solver, reason);
            }
        }
    }
}

fn load_problem(path: &Path) -> Result<ProblemFile, Box<dyn std::error::Error>> {
    let file = ProblemFile::load(path)?;
    let issues = file.validate();
    if !issues.is_empty() {
        tracing::warn!(count = issues.len(), "Problem file has validation issues");
    }
    Ok(file)
}

// =============================================================================
// Command Handlers
// =============================================================================

async fn run_server(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let listen_addr: SocketAddr = format!("0.0.0.0:{}", args.port).parse()?;
    let mut solver = args.profile.solver_config();
    if let Some(seed) = args.seed {
        solver = solver.with_seed(seed);
    }
    solver.validate()?;

    let config = ServerConfig::new(args.name, listen_addr).with_solver(solver);
    let shutdown = install_shutdown_handler()?;

    GrpcServer::new(config)
        .run(async move { shutdown.cancelled().await })
        .await?;

    tracing::info!("Solver server stopped");
    Ok(())
}

async fn handle_race(args: RaceArgs) -> Result<(), Box<dyn std::error::Error>> {
    let file = load_problem(&args.problem)?;
    let problem = Arc::new(file.to_problem()?);

    let timeout = Duration::try_from_secs_f64(args.timeout_minutes * 60.0)
        .map_err(|_| format!("invalid --timeout-minutes {}", args.timeout_minutes))?;
    let config = RaceConfig::new(timeout, Duration::from_secs(args.grace_secs));

    let outcome = match args.remote {
        Some(ref remote) => {
            let addrs: Vec<&str> = remote.split(',').map(str::trim).collect();
            let [first, second] = addrs.as_slice() else {
                return Err("--remote expects exactly two addresses".into());
            };
            let coordinator = RaceCoordinator::new(
                RemoteSolver::new("remote-1", *first),
                RemoteSolver::new("remote-2", *second),
                config,
            );
            coordinator.race(problem.clone()).await
        }
        None => {
            let mut balanced = SolverConfig::default();
            let mut exploratory = SolverConfig::exploratory();
            if let Some(seed) = args.seed {
                balanced = balanced.with_seed(seed);
                exploratory = exploratory.with_seed(seed.wrapping_add(1));
            }
            let coordinator = RaceCoordinator::new(
                GeneticSolver::new("balanced", balanced),
                GeneticSolver::new("exploratory", exploratory),
                config,
            );
            coordinator.race(problem.clone()).await
        }
    };

    match outcome {
        RaceOutcome::Completed(report) => {
            if let Some(ref path) = args.allocations_out {
                let filename = args
                    .problem
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let set = report.allocation_set(&problem).with_configuration(filename);
                std::fs::write(path, set.render())?;
                tracing::info!(path = %path.display(), "Allocations written");
            }

            match args.output {
                OutputFormat::Table => print_race(&report),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            }

            if report.primary.is_none() {
                return Err("no feasible allocation found".into());
            }
        }
        RaceOutcome::TimedOut {
            race_id,
            window,
            pending,
        } => {
            match args.output {
                OutputFormat::Table => {
                    println!("Error: race {} timed out after {:?}", race_id, window);
                    println!("Still running: {}", pending.join(", "));
                }
                OutputFormat::Json => {
                    let output = TimeoutOutput {
                        race_id: race_id.to_string(),
                        timed_out: true,
                        window_ms: window.as_millis() as u64,
                        pending: &pending,
                    };
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
            }
            return Err("race timed out".into());
        }
    }

    Ok(())
}

fn handle_validate(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let file = load_problem(path)?;
    let issues = file.validate();
    if issues.is_empty() {
        println!("Configuration file is valid");
    } else {
        println!("Configuration file is invalid");
        print_issues(&issues);
    }

    // Eligibility and type resolution are fatal setup checks
    let problem = file.to_problem()?;
    for task in problem.tasks() {
        println!("Task {} eligible on {:?}", task.id, task.eligible);
    }
    Ok(())
}

fn handle_decode(
    path: &Path,
    map: &str,
    output: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = load_problem(path)?;
    let matrix = AllocationMatrix::parse_map(map)?;
    let report = file.decode_map(1, &matrix);

    match output {
        OutputFormat::Table => print_report(&report),
        OutputFormat::Json => {
            let out = ReportOutput {
                allocation_id: report.allocation_id,
                runtime: report.runtime(),
                energy: report.total_energy(),
                report: &report,
            };
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}

// =============================================================================
// Main Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Commands::Serve(serve_args) => {
            run_server(serve_args).await?;
        }
        Commands::Race(race_args) => {
            handle_race(race_args).await?;
        }
        Commands::Validate { problem } => {
            handle_validate(&problem)?;
        }
        Commands::Decode {
            problem,
            map,
            output,
        } => {
            handle_decode(&problem, &map, output)?;
        }
    }

    Ok(())
}
