use thiserror::Error;

use crate::enrich::{EnrichError, EnrichmentRunner};
use crate::input::gmt::GeneSetError;
use crate::input::{LoadError, ResultLoader};
use crate::model::config::{ConfigError, PipelineConfig};
use crate::report::PersistError;
use crate::report::manifest::RunManifest;

pub mod stage1_load;
pub mod stage2_enrich;
pub mod stage3_summary;
pub mod stage4_report;

use stage1_load::run_stage1;
use stage2_enrich::{BatchDriver, ProgramOutcome};
use stage3_summary::summarize;
use stage4_report::{OutputPaths, Stage4Input, write_outputs};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("error loading factorization results: {0}")]
    Load(#[from] LoadError),
    #[error("error loading gene set library: {0}")]
    GeneSets(#[from] GeneSetError),
    #[error("error preparing enrichment back-end: {0}")]
    Backend(#[from] EnrichError),
    #[error("error writing outputs: {0}")]
    Persist(#[from] PersistError),
}

#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub summary_rows: usize,
    pub succeeded: Vec<usize>,
    pub empty: Vec<usize>,
    pub failed: Vec<usize>,
    pub paths: OutputPaths,
}

/// Load, enrich every program, summarize, persist. Only load and write
/// failures are returned; per-program failures end up in the manifest.
pub fn run_pipeline<L, E>(
    loader: &L,
    runner: &E,
    config: &PipelineConfig,
) -> Result<PipelineReport, PipelineError>
where
    L: ResultLoader + ?Sized,
    E: EnrichmentRunner,
{
    config.validate()?;

    let results = run_stage1(loader, config)?;

    let mut driver = BatchDriver::new(runner, config.program_count);
    let batch = driver.run(&results);
    tracing::debug!("batch driver finished in state {:?}", driver.state());

    let summary = summarize(&batch.collection, config.top_hit);
    tracing::info!("summary has {} programs", summary.len());

    let manifest = RunManifest::new(
        config,
        results.usage.n_rows(),
        results.gene_scores.n_cols(),
        &batch.outcomes,
    );
    let paths = write_outputs(&Stage4Input {
        config,
        summary: &summary,
        collection: &batch.collection,
        manifest: &manifest,
    })?;

    Ok(PipelineReport {
        summary_rows: summary.len(),
        succeeded: batch.ids_where(|o| matches!(o, ProgramOutcome::Enriched { .. })),
        empty: batch.ids_where(|o| matches!(o, ProgramOutcome::Empty)),
        failed: batch.ids_where(|o| matches!(o, ProgramOutcome::Failed { .. })),
        paths,
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/pipeline.rs"]
mod tests;
