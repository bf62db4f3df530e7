use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use es_app::{
    AppResult, load_experiment, run_aggregate, run_all, run_dispatch, run_generate, run_report,
};
use es_results::aggregate::AggregatedTable;

#[derive(Parser)]
#[command(name = "es-cli")]
#[command(about = "Episweep CLI - batch simulation sweep driver", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Materialize scenario input files and the metadata checkpoint
    Generate {
        /// Path to the experiment YAML file
        experiment_path: PathBuf,
    },
    /// Run every checkpointed scenario through the simulator
    Run {
        /// Path to the experiment YAML file
        experiment_path: PathBuf,
    },
    /// Collect raw outputs and build the aggregated table
    Aggregate {
        /// Path to the experiment YAML file
        experiment_path: PathBuf,
    },
    /// Export the derived indicator series as CSV files
    Report {
        /// Path to the experiment YAML file
        experiment_path: PathBuf,
        /// Ignore the aggregated-table cache and recompute it
        #[arg(long)]
        no_cache: bool,
    },
    /// Run all phases in order
    All {
        /// Path to the experiment YAML file
        experiment_path: PathBuf,
    },
}

fn main() -> AppResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { experiment_path } => cmd_generate(&experiment_path),
        Commands::Run { experiment_path } => cmd_run(&experiment_path),
        Commands::Aggregate { experiment_path } => cmd_aggregate(&experiment_path),
        Commands::Report {
            experiment_path,
            no_cache,
        } => cmd_report(&experiment_path, no_cache),
        Commands::All { experiment_path } => cmd_all(&experiment_path),
    }
}

fn cmd_generate(experiment_path: &Path) -> AppResult<()> {
    let experiment = load_experiment(experiment_path)?;
    let summary = run_generate(&experiment)?;
    println!(
        "✓ Generated {}/{} scenarios into {}",
        summary.succeeded,
        summary.attempted,
        experiment.input_dir().display()
    );
    Ok(())
}

fn cmd_run(experiment_path: &Path) -> AppResult<()> {
    let experiment = load_experiment(experiment_path)?;
    println!("Dispatching scenarios for experiment: {}", experiment.name);
    let summary = run_dispatch(&experiment)?;
    if summary.succeeded == summary.attempted {
        println!("✓ All {} scenarios completed", summary.attempted);
    } else {
        println!(
            "✓ {}/{} scenarios completed ({} failed)",
            summary.succeeded,
            summary.attempted,
            summary.attempted - summary.succeeded
        );
    }
    Ok(())
}

fn cmd_aggregate(experiment_path: &Path) -> AppResult<()> {
    let experiment = load_experiment(experiment_path)?;
    let table = run_aggregate(&experiment)?;
    println!(
        "✓ Aggregated {} rows into {}",
        table.len(),
        experiment.aggregate_cache_path().display()
    );
    Ok(())
}

fn cmd_report(experiment_path: &Path, no_cache: bool) -> AppResult<()> {
    let experiment = load_experiment(experiment_path)?;

    let cache_path = experiment.aggregate_cache_path();
    let table = if !no_cache && cache_path.exists() {
        println!("Using aggregated table cache: {}", cache_path.display());
        AggregatedTable::load_cache(&cache_path)?
    } else {
        run_aggregate(&experiment)?
    };

    let written = run_report(&experiment, &table)?;
    println!("✓ Wrote {} series files:", written.len());
    for path in written {
        println!("  {}", path.display());
    }
    Ok(())
}

fn cmd_all(experiment_path: &Path) -> AppResult<()> {
    let experiment = load_experiment(experiment_path)?;
    println!("Running experiment: {}", experiment.name);
    run_all(&experiment)?;
    println!("✓ Pipeline complete; series in {}", experiment.figures_dir().display());
    Ok(())
}
