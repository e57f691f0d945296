use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::model::config::PipelineConfig;
use crate::model::program::program_label;
use crate::pipeline::stage2_enrich::ProgramOutcome;
use crate::report::PersistError;
use crate::report::table::ensure_parent_dir;

#[derive(Debug, Clone, Serialize)]
pub struct ProgramEntry<'a> {
    pub program: String,
    pub id: usize,
    #[serde(flatten)]
    pub outcome: &'a ProgramOutcome,
}

/// Per-run accounting of which programs produced hits, came back empty, or failed.
#[derive(Debug, Clone, Serialize)]
pub struct RunManifest<'a> {
    pub tool: &'static str,
    pub version: &'static str,
    pub config: &'a PipelineConfig,
    pub n_cells: usize,
    pub n_genes: usize,
    pub succeeded: Vec<usize>,
    pub empty: Vec<usize>,
    pub failed: Vec<usize>,
    pub programs: Vec<ProgramEntry<'a>>,
}

impl<'a> RunManifest<'a> {
    pub fn new(
        config: &'a PipelineConfig,
        n_cells: usize,
        n_genes: usize,
        outcomes: &'a [(usize, ProgramOutcome)],
    ) -> Self {
        let mut succeeded = Vec::new();
        let mut empty = Vec::new();
        let mut failed = Vec::new();
        let mut programs = Vec::with_capacity(outcomes.len());
        for (id, outcome) in outcomes {
            match outcome {
                ProgramOutcome::Enriched { .. } => succeeded.push(*id),
                ProgramOutcome::Empty => empty.push(*id),
                ProgramOutcome::Failed { .. } => failed.push(*id),
            }
            programs.push(ProgramEntry {
                program: program_label(*id),
                id: *id,
                outcome,
            });
        }
        Self {
            tool: "kira-programenrich",
            version: env!("CARGO_PKG_VERSION"),
            config,
            n_cells,
            n_genes,
            succeeded,
            empty,
            failed,
            programs,
        }
    }
}

pub fn write_manifest(path: &Path, manifest: &RunManifest<'_>) -> Result<(), PersistError> {
    ensure_parent_dir(path)?;
    let io_err = |source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut w = BufWriter::new(File::create(path).map_err(io_err)?);
    serde_json::to_writer_pretty(&mut w, manifest).map_err(|source| PersistError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    w.write_all(b"\n").map_err(io_err)?;
    w.flush().map_err(io_err)?;
    Ok(())
}
