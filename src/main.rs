use std::fs::{File, read_to_string};
use std::io::{Read, Write, stdin, stdout};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use rand::SeedableRng;
use rand::rngs::StdRng;

use seating::{GenerationMethod, PlannerConfig, Problem, SeatingPlan, generate, report};

#[derive(Parser)]
#[command(name = "seating")]
#[command(about = "Seat wedding guests to maximise total happiness", long_about = None)]
struct Cli {
    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a problem and print the seating plan as JSON
    Solve {
        /// Problem JSON file; reads stdin when omitted
        problem: Option<PathBuf>,
        /// YAML file with solver settings
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Print happiness statistics as a second JSON line
        #[arg(long)]
        stats: bool,
        /// Append a run record to this CSV file
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Score an existing plan against a problem
    Score {
        /// Problem JSON file
        problem: PathBuf,
        /// Plan JSON file, e.g. [[0,1],[2,3]]
        plan: PathBuf,
    },
    /// Generate a synthetic problem as JSON
    Generate {
        /// One of: random, complete-components, rings, tense
        method: GenerationMethod,
        n_tables: usize,
        table_size: usize,
        /// Output file; writes stdout when omitted
        output: Option<PathBuf>,
        /// Seed for reproducible problems
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Solve {
            problem,
            config,
            stats,
            report,
        } => solve(problem.as_deref(), config.as_deref(), stats, report.as_deref()),
        Commands::Score { problem, plan } => score(&problem, &plan),
        Commands::Generate {
            method,
            n_tables,
            table_size,
            output,
            seed,
        } => generate_problem(method, n_tables, table_size, output.as_deref(), seed),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn read_problem(path: Option<&Path>) -> Result<Problem> {
    let buf = match path {
        Some(path) => read_to_string(path)
            .with_context(|| format!("Could not read problem file: {}", path.display()))?,
        None => {
            let mut buf = String::new();
            stdin()
                .read_to_string(&mut buf)
                .context("Could not read problem from stdin")?;
            buf
        }
    };
    serde_json::from_str(&buf).context("Could not parse problem")
}

fn solve(
    problem: Option<&Path>,
    config: Option<&Path>,
    stats: bool,
    report_path: Option<&Path>,
) -> Result<()> {
    let problem = read_problem(problem)?;
    let config = match config {
        Some(path) => PlannerConfig::load(path)
            .with_context(|| format!("Could not load config: {}", path.display()))?,
        None => PlannerConfig::default(),
    };

    let seating = problem.solve_with(&config)?;

    println!("{}", serde_json::to_string(&seating.plan)?);
    if stats {
        println!("{}", serde_json::to_string(&seating.summary)?);
    }
    if let Some(path) = report_path {
        report::append_record(path, &seating.record(&problem))
            .with_context(|| format!("Could not write report: {}", path.display()))?;
    }
    Ok(())
}

fn score(problem: &Path, plan: &Path) -> Result<()> {
    let problem = read_problem(Some(problem))?;
    let buf = read_to_string(plan)
        .with_context(|| format!("Could not read plan file: {}", plan.display()))?;
    let plan: SeatingPlan = serde_json::from_str(&buf).context("Could not parse plan")?;

    let summary = problem.score(&plan)?;
    println!("{}", serde_json::to_string(&summary)?);
    Ok(())
}

fn generate_problem(
    method: GenerationMethod,
    n_tables: usize,
    table_size: usize,
    output: Option<&Path>,
    seed: Option<u64>,
) -> Result<()> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let problem = generate(method, n_tables, table_size, &mut rng)?;

    let mut out: Box<dyn Write> = match output {
        None => Box::new(stdout()),
        Some(path) => Box::new(
            File::create(path)
                .with_context(|| format!("Could not create output: {}", path.display()))?,
        ),
    };
    serde_json::to_writer(&mut out, &problem)?;
    writeln!(out)?;
    Ok(())
}
