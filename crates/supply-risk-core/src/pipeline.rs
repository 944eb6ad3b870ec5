use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, instrument};

use crate::{
    assess::{scorer::RiskScorer, ScoredSupplier},
    data::{
        file_repository::FileDataRepository, read_table, write_table, write_text,
        GeoRiskRecord, MergedSupplier, SupplierDataSource,
    },
    ingest::build_supplier_profile,
    report::{render_brief, OutputFormat},
    settings::RiskSettings,
};

pub const MERGED_FILE: &str = "merged_data.csv";
pub const RISK_SCORES_FILE: &str = "risk_scores.csv";
pub const BRIEF_FILE: &str = "brief.md";

/// Artifacts written by a full pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutputs {
    pub merged: PathBuf,
    pub risk_scores: PathBuf,
    pub brief: PathBuf,
}

impl PipelineOutputs {
    pub fn in_dir(output_dir: &Path) -> Self {
        Self {
            merged: output_dir.join(MERGED_FILE),
            risk_scores: output_dir.join(RISK_SCORES_FILE),
            brief: output_dir.join(BRIEF_FILE),
        }
    }
}

/// Ingest `data_dir` and write the merged supplier profile to `output`.
#[instrument(skip_all, fields(data_dir = %data_dir.display()))]
pub fn ingest_stage(data_dir: &Path, output: &Path) -> Result<Vec<MergedSupplier>> {
    let repo = FileDataRepository::new(data_dir);
    let merged = build_supplier_profile(&repo)
        .with_context(|| format!("failed to ingest data from {}", data_dir.display()))?;
    write_table(output, &merged)?;
    info!(rows = merged.len(), output = %output.display(), "wrote merged dataset");
    Ok(merged)
}

/// Score a merged dataset file against a geo risk file and write the scores.
#[instrument(skip_all, fields(merged = %merged_path.display()))]
pub fn assess_stage(
    merged_path: &Path,
    geo_path: &Path,
    output: &Path,
    settings: &RiskSettings,
) -> Result<Vec<ScoredSupplier>> {
    let merged: Vec<MergedSupplier> = read_table(merged_path)
        .with_context(|| format!("failed to load merged dataset {}", merged_path.display()))?;
    let geo: Vec<GeoRiskRecord> = read_table(geo_path)
        .with_context(|| format!("failed to load geo risk {}", geo_path.display()))?;
    let scored = RiskScorer::with_config(settings.risk_config()).score(merged, &geo);
    write_table(output, &scored)?;
    info!(rows = scored.len(), output = %output.display(), "wrote risk scores");
    Ok(scored)
}

/// Render the brief for a risk score file.
#[instrument(skip_all, fields(risk_scores = %scores_path.display()))]
pub fn report_stage(
    scores_path: &Path,
    output: &Path,
    settings: &RiskSettings,
    format: OutputFormat,
) -> Result<String> {
    let scores: Vec<ScoredSupplier> = read_table(scores_path)
        .with_context(|| format!("failed to load risk scores {}", scores_path.display()))?;
    let brief = render_brief(&scores, settings.top_n, format)?;
    write_text(output, &brief)?;
    info!(output = %output.display(), "wrote brief");
    Ok(brief)
}

/// Run ingest, assess and report in sequence, persisting each artifact before
/// the next stage starts. The first failure aborts the run.
#[instrument(skip_all, fields(data_dir = %data_dir.display(), output_dir = %output_dir.display()))]
pub fn run_pipeline(
    data_dir: &Path,
    output_dir: &Path,
    settings: &RiskSettings,
) -> Result<PipelineOutputs> {
    let outputs = PipelineOutputs::in_dir(output_dir);
    let repo = FileDataRepository::new(data_dir);

    let merged = build_supplier_profile(&repo)
        .with_context(|| format!("failed to ingest data from {}", data_dir.display()))?;
    write_table(&outputs.merged, &merged)?;

    let geo = repo.geo_risk()?;
    let scored = RiskScorer::with_config(settings.risk_config()).score(merged, &geo);
    write_table(&outputs.risk_scores, &scored)?;

    let brief = render_brief(&scored, settings.top_n, OutputFormat::Markdown)?;
    write_text(&outputs.brief, &brief)?;

    info!(suppliers = scored.len(), "pipeline complete");
    Ok(outputs)
}
