use std::path::PathBuf;

use crate::model::config::PipelineConfig;
use crate::model::program::program_label;
use crate::model::records::{EnrichmentRecord, ResultsCollection};
use crate::pipeline::stage3_summary::SummaryRow;
use crate::report::PersistError;
use crate::report::manifest::{RunManifest, write_manifest};
use crate::report::table::write_csv;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub summary: PathBuf,
    pub raw_results: Option<PathBuf>,
    pub manifest: PathBuf,
}

impl OutputPaths {
    pub fn for_config(config: &PipelineConfig) -> Self {
        let variant = config.variant;
        Self {
            summary: config.output_dir.join(variant.summary_file()),
            raw_results: config
                .write_raw_results
                .then(|| config.output_dir.join(variant.raw_results_file())),
            manifest: config.output_dir.join(variant.manifest_file()),
        }
    }
}

pub struct Stage4Input<'a, R> {
    pub config: &'a PipelineConfig,
    pub summary: &'a [SummaryRow<R>],
    pub collection: &'a ResultsCollection<R>,
    pub manifest: &'a RunManifest<'a>,
}

pub fn write_outputs<R: EnrichmentRecord>(
    input: &Stage4Input<'_, R>,
) -> Result<OutputPaths, PersistError> {
    let paths = OutputPaths::for_config(input.config);

    let rows: Vec<Vec<String>> = input.summary.iter().map(SummaryRow::fields).collect();
    write_csv(&paths.summary, &SummaryRow::<R>::header(), &rows)?;
    tracing::info!("summary saved to {}", paths.summary.display());

    if let Some(raw_path) = &paths.raw_results {
        write_raw_results(raw_path, input.collection)?;
        tracing::info!("raw results saved to {}", raw_path.display());
    }

    write_manifest(&paths.manifest, input.manifest)?;
    tracing::info!("run manifest saved to {}", paths.manifest.display());

    Ok(paths)
}

/// Every program's full table, one block per program in id order.
fn write_raw_results<R: EnrichmentRecord>(
    path: &std::path::Path,
    collection: &ResultsCollection<R>,
) -> Result<(), PersistError> {
    let mut header = vec!["Program"];
    header.extend_from_slice(R::raw_header());
    let mut rows = Vec::new();
    for (&id, table) in collection {
        for record in &table.rows {
            let mut fields = vec![program_label(id)];
            fields.extend(record.raw_fields());
            rows.push(fields);
        }
    }
    write_csv(path, &header, &rows)
}
