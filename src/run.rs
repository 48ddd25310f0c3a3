//! Pipeline entry points: plan only, or plan, execute, assemble and write.

use crate::assemble::{assemble_records, Record};
use crate::config::StratagenConfig;
use crate::error::ApiError;
use crate::generation::{BatchExecutor, ExecutionSummary, Generator};
use crate::output::write_csv_file;
use crate::planning::{AssignmentPlanner, Plan};
use crate::taxonomy::{telecoms_complaints, Taxonomy};
use std::path::{Path, PathBuf};
use tracing::info;

/// Everything a finished generation run produced
#[derive(Debug, Clone)]
pub struct GenerateOutcome {
    pub plan: Plan,
    pub records: Vec<Record>,
    pub summary: ExecutionSummary,
    /// Where the CSV was written, when it was
    pub output_path: Option<PathBuf>,
}

/// Configured taxonomy file, or the built-in one
pub fn load_taxonomy(config: &StratagenConfig, workspace_root: &Path) -> Result<Taxonomy, ApiError> {
    match config.resolved_taxonomy_path(workspace_root) {
        Some(path) => {
            let taxonomy = Taxonomy::load_from_file(&path)?;
            info!(taxonomy = %taxonomy.name, path = %path.display(), "Loaded taxonomy");
            Ok(taxonomy)
        }
        None => Ok(telecoms_complaints()),
    }
}

pub fn run_plan(taxonomy: &Taxonomy, config: &StratagenConfig) -> Result<Plan, ApiError> {
    let planner = AssignmentPlanner::new(taxonomy, config.run.planner_settings());
    Ok(planner.plan(config.run.total, config.run.seed)?)
}

/// Full pipeline. The plan is built and validated before any generation call, the
/// planner's generator is dropped before execution starts, and the CSV is written only
/// when `output_path` is given.
pub async fn run_generate<G: Generator + ?Sized>(
    taxonomy: &Taxonomy,
    config: &StratagenConfig,
    generator: &G,
    output_path: Option<&Path>,
) -> Result<GenerateOutcome, ApiError> {
    let plan = run_plan(taxonomy, config)?;

    let executor = BatchExecutor::new(config.run.executor_settings(&config.output));
    let report = executor
        .execute(&plan, &taxonomy.instructions, generator)
        .await?;
    let records = assemble_records(&plan, &report)?;

    if let Some(path) = output_path {
        write_csv_file(path, &plan.axis_names(), &records, config.output.bom)?;
    }

    info!(
        records = records.len(),
        padded_items = report.summary.padded_items,
        "Generation run finished"
    );

    Ok(GenerateOutcome {
        plan,
        records,
        summary: report.summary,
        output_path: output_path.map(Path::to_path_buf),
    })
}
