//! Pipeline orchestration.
//!
//! The phases are strictly ordered (generate -> dispatch -> aggregate ->
//! report) with no overlap, and every phase re-reads the scenario
//! checkpoint so it can be re-run independently against the same metadata.
//! Each phase reports attempted vs. succeeded counts at its boundary; a
//! sweep with partial failures still produces a valid, smaller table.

use std::path::PathBuf;
use std::time::Duration;

use es_dispatch::batch::BatchOptions;
use es_dispatch::local::LocalPoolOptions;
use es_dispatch::summary::{DispatchSummary, SUMMARY_FILE};
use es_dispatch::{plan_invocations, run_batch, run_local, stage_support_files};
use es_results::aggregate::AggregatedTable;
use es_results::load::collect_raw;
use es_scenario::{
    SweepGrid, TemplateSource, generate_scenarios, read_checkpoint, write_checkpoint,
};
use tracing::info;

use crate::config::{Experiment, ExecutionConfig, INPUT_SUBDIR, OUTPUT_SUBDIR};
use crate::error::{AppError, AppResult};
use crate::report;

/// Attempted vs. succeeded accounting for one phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseSummary {
    pub attempted: usize,
    pub succeeded: usize,
}

fn prepare_run_dirs(experiment: &Experiment) -> AppResult<()> {
    for dir in [
        experiment.input_dir(),
        experiment.raw_output_dir(),
        experiment.figures_dir(),
    ] {
        std::fs::create_dir_all(&dir)?;
    }
    Ok(())
}

fn build_grid(experiment: &Experiment) -> AppResult<SweepGrid> {
    let templates = experiment
        .sweep
        .templates
        .iter()
        .map(|t| {
            let text = std::fs::read_to_string(&t.path).map_err(|source| {
                AppError::TemplateFileRead {
                    path: t.path.clone(),
                    source,
                }
            })?;
            Ok(TemplateSource {
                name: t.name.clone(),
                text,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(SweepGrid {
        templates,
        eirs: experiment.sweep.eirs.clone(),
        seeds: experiment.sweep.seeds,
        modes: experiment.sweep.modes.clone(),
    })
}

/// Materialize every scenario input file and write the metadata checkpoint.
pub fn run_generate(experiment: &Experiment) -> AppResult<PhaseSummary> {
    prepare_run_dirs(experiment)?;
    let grid = build_grid(experiment)?;
    let attempted = grid.scenario_count();

    let specs = generate_scenarios(&grid, &experiment.fixed_substitutions(), &experiment.input_dir())?;
    write_checkpoint(&experiment.checkpoint_path(), &specs)?;

    info!(attempted, succeeded = specs.len(), "generation phase complete");
    Ok(PhaseSummary {
        attempted,
        succeeded: specs.len(),
    })
}

/// Run every checkpointed scenario through the simulator.
pub fn run_dispatch(experiment: &Experiment) -> AppResult<PhaseSummary> {
    let specs = read_checkpoint(&experiment.checkpoint_path())?;
    stage_support_files(
        &experiment.simulator.home,
        experiment.simulator.version,
        &experiment.output_dir,
    )?;

    let invocations = plan_invocations(&specs, INPUT_SUBDIR, OUTPUT_SUBDIR);
    let (strategy, outcomes) = match &experiment.execution {
        ExecutionConfig::Local { workers, timeout_s } => {
            let options = LocalPoolOptions {
                workers: *workers,
                timeout: Duration::from_secs(*timeout_s),
            };
            let outcomes = run_local(
                &invocations,
                &experiment.simulator.program,
                &experiment.output_dir,
                &experiment.simulator.home,
                &options,
            )?;
            ("local", outcomes)
        }
        ExecutionConfig::Batch {
            job_template,
            cpus_per_task,
            batch_size,
            extra,
        } => {
            let options = BatchOptions {
                job_template: job_template.clone(),
                cpus_per_task: *cpus_per_task,
                batch_size: *batch_size,
                prepare: experiment.simulator.prepare.clone(),
                extra: extra.clone(),
            };
            let outcomes = run_batch(
                &invocations,
                &experiment.simulator.program,
                &experiment.output_dir,
                &experiment.simulator.home,
                &options,
            )?;
            ("batch", outcomes)
        }
    };

    let summary = DispatchSummary::new(strategy, outcomes);
    summary.save(&experiment.output_dir.join(SUMMARY_FILE))?;

    info!(
        strategy,
        attempted = summary.attempted,
        succeeded = summary.succeeded,
        failed = summary.failed,
        "dispatch phase complete"
    );
    Ok(PhaseSummary {
        attempted: summary.attempted,
        succeeded: summary.succeeded,
    })
}

/// Collect raw outputs and reduce them to the aggregated table.
pub fn run_aggregate(experiment: &Experiment) -> AppResult<AggregatedTable> {
    let specs = read_checkpoint(&experiment.checkpoint_path())?;
    let raw = collect_raw(&specs, &experiment.raw_output_dir());

    info!(
        attempted = specs.len(),
        succeeded = raw.summary.scenarios_loaded,
        skipped = raw.summary.scenarios_skipped,
        malformed_lines = raw.summary.malformed_lines,
        "aggregation inputs collected"
    );

    let bands = experiment.age_bands()?;
    let table = es_results::aggregate::aggregate(&specs, raw.rows, &bands);
    table.save_cache(&experiment.aggregate_cache_path())?;

    info!(rows = table.len(), "aggregation phase complete");
    Ok(table)
}

/// Export the derived indicator series for the plotting collaborator.
pub fn run_report(
    experiment: &Experiment,
    table: &AggregatedTable,
) -> AppResult<Vec<PathBuf>> {
    let written = report::write_reports(experiment, table)?;
    info!(files = written.len(), "report phase complete");
    Ok(written)
}

/// Run all phases in order.
pub fn run_all(experiment: &Experiment) -> AppResult<()> {
    run_generate(experiment)?;
    run_dispatch(experiment)?;
    let table = run_aggregate(experiment)?;
    run_report(experiment, &table)?;
    Ok(())
}
